use log::debug;
use metatensor::TensorMap;
use ndarray::{Array2, Array3};

use crate::Error;
use crate::structures::{Structure, Property, Computed};

use super::{properties_to_tensormap, ConversionOptions};

/// Names of the fields from which to read reference data in
/// `structures_to_tensormap`.
///
/// For each entry, `None` means that the data should be computed by the
/// engine attached to the structures instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureKeys<'a> {
    /// per-structure info field containing the energy
    pub energy: Option<&'a str>,
    /// per-atom array containing the forces
    pub forces: Option<&'a str>,
    /// per-structure info field containing the 3x3 stress tensor
    pub stress: Option<&'a str>,
}

fn energies(structures: &[Box<dyn Structure>], key: Option<&str>) -> Result<Vec<f64>, Error> {
    let mut values = Vec::with_capacity(structures.len());
    for (structure_i, structure) in structures.iter().enumerate() {
        let value = match key {
            Some(key) => match structure.info(key) {
                Some(&Property::Scalar(value)) => value,
                Some(Property::Tensor(_)) => {
                    return Err(Error::InvalidParameter(format!(
                        "expected '{}' to be a scalar in structure {}, got a tensor",
                        key, structure_i
                    )));
                }
                None => {
                    return Err(Error::InvalidParameter(format!(
                        "missing '{}' in structure {}", key, structure_i
                    )));
                }
            },
            None => structure.potential_energy()?,
        };
        values.push(value);
    }
    return Ok(values);
}

/// Check if the forces should be taken from the engines attached to the
/// structures. This is decided by the first structure, and all other
/// structures must then be able to compute forces as well.
fn check_forces_capability(structures: &[Box<dyn Structure>]) -> Result<bool, Error> {
    let supports_forces = |structure: &dyn Structure| {
        structure.capabilities().map_or(false, |capabilities| capabilities.forces)
    };

    let Some(first) = structures.first() else {
        return Ok(false);
    };

    if !supports_forces(&**first) {
        return Ok(false);
    }

    for (structure_i, structure) in structures.iter().enumerate().skip(1) {
        if !supports_forces(&**structure) {
            return Err(Error::CapabilityMismatch(format!(
                "the first structure can compute forces, so all structures are \
                expected to do the same, but structure {} can not. Please add or \
                remove forces for all structures",
                structure_i
            )));
        }
    }

    return Ok(true);
}

fn positions_gradients(structures: &[Box<dyn Structure>], key: Option<&str>) -> Result<Option<Vec<Array2<f64>>>, Error> {
    let mut gradients = Vec::with_capacity(structures.len());
    if let Some(key) = key {
        for (structure_i, structure) in structures.iter().enumerate() {
            let forces = structure.array(key).ok_or_else(|| Error::InvalidParameter(format!(
                "missing per-atom '{}' in structure {}", key, structure_i
            )))?;
            gradients.push(-&forces);
        }
        return Ok(Some(gradients));
    }

    if !check_forces_capability(structures)? {
        debug!("the attached engine can not compute forces, positions gradients will not be included");
        return Ok(None);
    }

    for (structure_i, structure) in structures.iter().enumerate() {
        match structure.forces()? {
            Computed::Present(forces) => gradients.push(-forces),
            Computed::Absent | Computed::NotComputable => {
                return Err(Error::Internal(format!(
                    "structure {} advertises forces support but did not compute them",
                    structure_i
                )));
            }
        }
    }

    return Ok(Some(gradients));
}

fn cell_gradients(structures: &[Box<dyn Structure>], key: Option<&str>) -> Result<Option<Array3<f64>>, Error> {
    let mut gradients = Array3::zeros((structures.len(), 3, 3));
    if let Some(key) = key {
        for (structure_i, structure) in structures.iter().enumerate() {
            let stress = match structure.info(key) {
                Some(Property::Tensor(stress)) => stress,
                Some(Property::Scalar(_)) => {
                    return Err(Error::InvalidParameter(format!(
                        "expected '{}' to be a 3x3 tensor in structure {}, got a scalar",
                        key, structure_i
                    )));
                }
                None => {
                    return Err(Error::InvalidParameter(format!(
                        "missing '{}' in structure {}", key, structure_i
                    )));
                }
            };
            set_negated(&mut gradients, structure_i, stress);
        }
        return Ok(Some(gradients));
    }

    if structures.is_empty() {
        return Ok(None);
    }

    for (structure_i, structure) in structures.iter().enumerate() {
        match structure.capabilities() {
            Some(capabilities) if capabilities.stress => {}
            Some(_) => {
                debug!("the engine of structure {} can not compute stress, cell gradients will not be included", structure_i);
                return Ok(None);
            }
            None => {
                debug!("structure {} has no attached engine, cell gradients will not be included", structure_i);
                return Ok(None);
            }
        }
    }

    for (structure_i, structure) in structures.iter().enumerate() {
        match structure.stress()? {
            Computed::Present(stress) => set_negated(&mut gradients, structure_i, &stress),
            Computed::Absent | Computed::NotComputable => {
                return Err(Error::Internal(format!(
                    "structure {} advertises stress support but did not compute it",
                    structure_i
                )));
            }
        }
    }

    return Ok(Some(gradients));
}

fn set_negated(gradients: &mut Array3<f64>, structure_i: usize, tensor: &[[f64; 3]; 3]) {
    for i in 0..3 {
        for j in 0..3 {
            gradients[[structure_i, i, j]] = -tensor[i][j];
        }
    }
}

/// Store the energy, forces and stress of all `structures` in a
/// `TensorMap`.
///
/// The data is read from the fields named in `keys`, or computed by the
/// engines attached to the structures for missing keys. The positions
/// gradients contain the negative forces, and the cell gradients the
/// negative stress. The single property is named after the energy key, or
/// `"energy"` if the energy comes from the attached engines.
///
/// Forces are taken from the engines only if the engine of the first
/// structure can compute them, in which case all structures must be able to
/// compute them as well. The cell gradients are omitted if any of the
/// structures can not compute the stress.
#[time_graph::instrument(name = "structures_to_tensormap")]
pub fn structures_to_tensormap(structures: &[Box<dyn Structure>], keys: StructureKeys<'_>) -> Result<TensorMap, Error> {
    let values = energies(structures, keys.energy)?;
    let positions_gradients = positions_gradients(structures, keys.forces)?;
    let cell_gradients = cell_gradients(structures, keys.stress)?;

    let options = ConversionOptions {
        is_structure_property: true,
        property_name: keys.energy.unwrap_or("energy"),
    };

    return properties_to_tensormap(
        &values,
        positions_gradients.as_deref(),
        cell_gradients.as_ref().map(|gradients| gradients.view()),
        options,
    );
}
