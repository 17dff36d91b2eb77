use ndarray::ArrayView2;

use crate::Error;

/// The `SelectorBase` trait is the interface shared by all property
/// selection algorithms.
///
/// Selectors work on a single 2-dimensional array at the time, containing one
/// row per sample and one column per property, and decide which columns
/// (i.e. which properties) should be kept. The [`Selector`](crate::Selector)
/// type takes care of running the selection for all blocks in a `TensorMap`.
pub trait SelectorBase: Send + Sync {
    /// Get the name of this selector
    fn name(&self) -> String;

    /// Get the parameters used to create this selector as a JSON string
    fn parameters(&self) -> String;

    /// Select a subset of the columns of `values`, returning the indexes of
    /// the selected columns in the order they were selected.
    fn select(&self, values: ArrayView2<'_, f64>) -> Result<Vec<usize>, Error>;
}

fn check_n_to_select(n_to_select: usize, n_properties: usize) -> Result<(), Error> {
    if n_to_select > n_properties {
        return Err(Error::InvalidParameter(format!(
            "can not select {} properties out of {}", n_to_select, n_properties
        )));
    }
    return Ok(());
}

mod fps;
pub use self::fps::FarthestPointSampling;

mod cur;
pub use self::cur::Cur;
