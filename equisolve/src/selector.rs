use std::collections::BTreeMap;

use metatensor::{Labels, TensorBlock, TensorBlockRef, TensorMap};
use ndarray::{Array2, ArrayD, Axis};
use once_cell::sync::Lazy;

use crate::Error;
use crate::labels::select_entries;
use crate::selectors::SelectorBase;

/// Properties selected for all the blocks of a `TensorMap`
#[derive(Debug, Clone)]
struct Support {
    keys: Labels,
    properties: Vec<Labels>,
}

/// A `Selector` runs a property selection algorithm on all the blocks of a
/// `TensorMap`, and can then reduce other tensors with the same keys to the
/// selected properties.
pub struct Selector {
    implementation: Box<dyn SelectorBase>,
    support: Option<Support>,
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("name", &self.implementation.name())
            .field("parameters", &self.implementation.parameters())
            .field("fitted", &self.support.is_some())
            .finish()
    }
}

/// Get the values of `block` as a 2-dimensional array, merging the samples
/// and components dimensions together.
fn values_as_matrix(block: &TensorBlockRef<'_>) -> Result<Array2<f64>, Error> {
    let values = block.values().to_array();
    let n_properties = values.shape().last().copied().unwrap_or(0);
    let n_rows = if n_properties == 0 { 0 } else { values.len() / n_properties };

    return Ok(Array2::from_shape_vec((n_rows, n_properties), values.iter().copied().collect())?);
}

/// Keep only the properties at the given `indexes` in `array`
fn select_properties(block: &TensorBlockRef<'_>, indexes: &[usize]) -> ArrayD<f64> {
    let values = block.values().to_array();
    let last = Axis(values.ndim() - 1);
    return values.select(last, indexes);
}

impl Selector {
    /// Create a new selector with the given `name` and `parameters`.
    ///
    /// The `parameters` should be formatted as JSON. The available selectors
    /// are `"fps"` (see [`FarthestPointSampling`](crate::selectors::FarthestPointSampling))
    /// and `"cur"` (see [`Cur`](crate::selectors::Cur)).
    ///
    /// # Errors
    ///
    /// This function returns an error if there is no registered selector with
    /// the given `name`, or if the parameters are invalid for this selector.
    pub fn new(name: &str, parameters: String) -> Result<Selector, Error> {
        let creator = match REGISTERED_SELECTORS.get(name) {
            Some(creator) => creator,
            None => {
                return Err(Error::InvalidParameter(
                    format!("unknown selector with name '{}'", name)
                ));
            }
        };

        return Ok(Selector {
            implementation: creator(&parameters)?,
            support: None,
        });
    }

    /// Get the name of this selector
    pub fn name(&self) -> String {
        self.implementation.name()
    }

    /// Get the parameters of this selector in a string, formatted as JSON.
    /// Parameters that were not given when creating the selector are set to
    /// their default value.
    pub fn parameters(&self) -> String {
        self.implementation.parameters()
    }

    /// Run the selection on all blocks of `tensor`, and store the selected
    /// properties.
    ///
    /// If the blocks have components, all the components are treated as
    /// additional samples during the selection.
    #[time_graph::instrument(name = "Selector::fit")]
    pub fn fit(&mut self, tensor: &TensorMap) -> Result<&mut Selector, Error> {
        let mut properties = Vec::new();
        for block in tensor.blocks() {
            let values = values_as_matrix(&block)?;
            let mut selected = self.implementation.select(values.view())?;
            selected.sort_unstable();

            properties.push(select_entries(&block.properties(), &selected));
        }

        self.support = Some(Support {
            keys: tensor.keys().clone(),
            properties: properties,
        });

        return Ok(self);
    }

    /// Get the properties selected for each block during the last call to
    /// `fit`, in the same order as the keys of the fitted tensor. This
    /// returns `None` if `fit` was never called.
    pub fn support(&self) -> Option<&[Labels]> {
        self.support.as_ref().map(|support| &*support.properties)
    }

    /// Reduce `tensor` to the properties selected by the last call to `fit`,
    /// for the values and all gradients of all blocks.
    ///
    /// # Errors
    ///
    /// This function returns an error if `fit` was never called, if `tensor`
    /// does not have the same keys as the fitted tensor, or if some blocks
    /// do not contain the selected properties.
    #[time_graph::instrument(name = "Selector::transform")]
    pub fn transform(&self, tensor: &TensorMap) -> Result<TensorMap, Error> {
        let support = self.support.as_ref().ok_or_else(|| Error::InvalidParameter(
            "this selector is not fitted yet, call `fit` first".into()
        ))?;

        let keys = tensor.keys();
        if keys.names() != support.keys.names() || keys.count() != support.keys.count() {
            return Err(Error::KeyMismatch(
                "the keys of this tensor are different from the keys used during `fit`".into()
            ));
        }

        let mut blocks = Vec::new();
        for (block_i, key) in keys.iter().enumerate() {
            let support_i = support.keys.position(key).ok_or_else(|| Error::KeyMismatch(
                "the keys of this tensor are different from the keys used during `fit`".into()
            ))?;
            let selected_properties = &support.properties[support_i];

            let block = tensor.block_by_id(block_i);
            let properties = block.properties();
            let mut indexes = Vec::new();
            for entry in selected_properties {
                let index = properties.position(entry).ok_or_else(|| Error::InvalidParameter(format!(
                    "block {} does not contain all the selected properties", block_i
                )))?;
                indexes.push(index);
            }

            let mut new_block = TensorBlock::new(
                select_properties(&block, &indexes),
                &block.samples(),
                &block.components(),
                selected_properties,
            )?;

            for parameter in block.gradient_list() {
                let gradient = block.gradient(parameter).ok_or_else(|| Error::Internal(
                    format!("missing '{}' gradient", parameter)
                ))?;

                let new_gradient = TensorBlock::new(
                    select_properties(&gradient, &indexes),
                    &gradient.samples(),
                    &gradient.components(),
                    selected_properties,
                )?;
                new_block.add_gradient(parameter, new_gradient)?;
            }

            blocks.push(new_block);
        }

        return Ok(TensorMap::new(keys.clone(), blocks)?);
    }

    /// Fit this selector on `tensor`, and then reduce `tensor` to the selected
    /// properties.
    pub fn fit_transform(&mut self, tensor: &TensorMap) -> Result<TensorMap, Error> {
        self.fit(tensor)?;
        return self.transform(tensor);
    }
}

// Registration of selector implementations
use crate::selectors::{Cur, FarthestPointSampling};

type SelectorCreator = fn(&str) -> Result<Box<dyn SelectorBase>, Error>;

macro_rules! add_selector {
    ($map :expr, $name :literal, $type :ty) => (
        $map.insert($name, (|json| {
            let value = serde_json::from_str::<$type>(json)?;
            Ok(Box::new(value))
        }) as SelectorCreator);
    );
}

static REGISTERED_SELECTORS: Lazy<BTreeMap<&'static str, SelectorCreator>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    add_selector!(map, "fps", FarthestPointSampling);
    add_selector!(map, "cur", Cur);
    return map;
});
