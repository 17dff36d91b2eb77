//! Construction of the metadata (`Labels`) used in the `TensorMap` produced
//! by this crate.

mod samples;
pub use self::samples::{structure_samples, positions_gradient_samples, cell_gradient_samples};

mod components;
pub use self::components::{positions_gradient_components, cell_gradient_components};

use metatensor::{Labels, LabelsBuilder};

/// Labels for a single property named `name`, with the single entry `[0]`
pub fn single_property(name: &str) -> Labels {
    let mut builder = LabelsBuilder::new(vec![name]);
    builder.add(&[0]);
    return builder.finish();
}

/// Create new `Labels` containing the entries of `labels` at the given
/// positions, in the given order.
pub fn select_entries(labels: &Labels, entries: &[usize]) -> Labels {
    let mut builder = LabelsBuilder::new(labels.names());
    for &entry in entries {
        builder.add(&labels[entry]);
    }
    return builder.finish();
}
