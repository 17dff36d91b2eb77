use metatensor::{Labels, TensorBlock, TensorMap};
use ndarray::{Array1, Array2, ArrayView3, Axis};

use crate::Error;
use crate::labels::{structure_samples, single_property};
use crate::labels::{positions_gradient_samples, positions_gradient_components};
use crate::labels::{cell_gradient_samples, cell_gradient_components};

/// Parameters specific to a single call to `properties_to_tensormap`
#[derive(Debug, Clone, Copy)]
pub struct ConversionOptions<'a> {
    /// Do the values correspond to a property of the whole structure (such
    /// as the energy), or to a property of each atomic environment? Only
    /// structure properties are supported for now.
    pub is_structure_property: bool,
    /// Name of the single property in the output
    pub property_name: &'a str,
}

impl<'a> Default for ConversionOptions<'a> {
    fn default() -> Self {
        ConversionOptions {
            is_structure_property: true,
            property_name: "property",
        }
    }
}

/// Check that the positions gradients match the number of structures and
/// contain 3 columns, and concatenate them to a single array of shape
/// `(n_atoms_total, 3)`.
fn check_positions_gradients(n_structures: usize, gradients: &[Array2<f64>]) -> Result<Array2<f64>, Error> {
    if gradients.len() != n_structures {
        return Err(Error::ShapeMismatch(format!(
            "given {} values but {} positions gradients values",
            n_structures, gradients.len()
        )));
    }

    for (structure_i, gradient) in gradients.iter().enumerate() {
        if gradient.ncols() != 3 {
            return Err(Error::ShapeMismatch(format!(
                "positions gradients must have 3 columns but the ones for structure {} have {}",
                structure_i, gradient.ncols()
            )));
        }
    }

    if gradients.is_empty() {
        return Ok(Array2::zeros((0, 3)));
    }

    let views = gradients.iter().map(|g| g.view()).collect::<Vec<_>>();
    return Ok(ndarray::concatenate(Axis(0), &views)?);
}

fn check_cell_gradients(n_structures: usize, gradients: &ArrayView3<'_, f64>) -> Result<(), Error> {
    let shape = gradients.shape();
    if shape[0] != n_structures {
        return Err(Error::ShapeMismatch(format!(
            "given {} values but {} cell gradients values",
            n_structures, shape[0]
        )));
    }

    if shape[1..] != [3, 3] {
        return Err(Error::ShapeMismatch(format!(
            "cell gradients must be 3 x 3 matrices but they are {} x {}",
            shape[1], shape[2]
        )));
    }

    return Ok(());
}

/// Create a `TensorMap` from per-structure `values` and their (optional)
/// gradients.
///
/// The output contains a single block, with one sample for each entry in
/// `values` and a single property named after `options.property_name`.
///
/// `positions_gradients` should contain one array per structure, with shape
/// `(n_atoms_i, 3)`, for example the negative of the forces acting on each
/// atom. `cell_gradients` should have a shape of `(n_structures, 3, 3)`, for
/// example the negative of the stress. When given, they are stored in the
/// `"positions"` and `"cell"` gradients of the block.
///
/// # Errors
///
/// This function returns [`Error::NotSupported`] if
/// `options.is_structure_property` is `false`, and [`Error::ShapeMismatch`]
/// if the number of gradients does not match the number of values, if the
/// positions gradients do not have 3 columns, or if the cell gradients are
/// not 3 x 3 matrices.
#[time_graph::instrument(name = "properties_to_tensormap")]
pub fn properties_to_tensormap(
    values: &[f64],
    positions_gradients: Option<&[Array2<f64>]>,
    cell_gradients: Option<ArrayView3<'_, f64>>,
    options: ConversionOptions<'_>,
) -> Result<TensorMap, Error> {
    if !options.is_structure_property {
        return Err(Error::NotSupported(
            "support for environment properties has not been implemented yet".into()
        ));
    }

    let n_structures = values.len();

    // validate everything before creating any block
    let positions_gradients = positions_gradients.map(|gradients| {
        let atoms_per_structure = gradients.iter().map(|g| g.nrows()).collect::<Vec<_>>();
        check_positions_gradients(n_structures, gradients).map(|g| (g, atoms_per_structure))
    }).transpose()?;

    if let Some(ref gradients) = cell_gradients {
        check_cell_gradients(n_structures, gradients)?;
    }

    let properties = single_property(options.property_name);
    let mut block = TensorBlock::new(
        Array1::from(values.to_vec()).insert_axis(Axis(1)).into_dyn(),
        &structure_samples(n_structures),
        &[],
        &properties,
    )?;

    if let Some((gradients, atoms_per_structure)) = positions_gradients {
        let gradient = TensorBlock::new(
            gradients.insert_axis(Axis(2)).into_dyn(),
            &positions_gradient_samples(&atoms_per_structure),
            &positions_gradient_components(),
            &properties,
        )?;
        block.add_gradient("positions", gradient)?;
    }

    if let Some(gradients) = cell_gradients {
        let gradient = TensorBlock::new(
            gradients.to_owned().insert_axis(Axis(3)).into_dyn(),
            &cell_gradient_samples(n_structures),
            &cell_gradient_components(),
            &properties,
        )?;
        block.add_gradient("cell", gradient)?;
    }

    return Ok(TensorMap::new(Labels::single(), vec![block])?);
}
