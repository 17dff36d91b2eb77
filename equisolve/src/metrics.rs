use metatensor::{TensorBlockRef, TensorMap};
use ndarray::ArrayD;

use crate::Error;

/// Check that both tensors have the same set of keys
fn check_same_keys(y_true: &TensorMap, y_pred: &TensorMap) -> Result<(), Error> {
    let keys_true = y_true.keys();
    let keys_pred = y_pred.keys();

    if keys_true.names() != keys_pred.names() {
        return Err(Error::KeyMismatch(format!(
            "the key names are different: [{}] vs [{}]",
            keys_true.names().join(", "),
            keys_pred.names().join(", "),
        )));
    }

    if keys_true.count() != keys_pred.count() {
        return Err(Error::KeyMismatch(format!(
            "the number of keys is different: {} vs {}",
            keys_true.count(),
            keys_pred.count(),
        )));
    }

    for key in keys_true {
        if keys_pred.position(key).is_none() {
            let key_print = keys_true.names().iter()
                .zip(key)
                .map(|(n, v)| format!("{}={}", n, v))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::KeyMismatch(format!(
                "missing a block for ({}) in the predicted values", key_print
            )));
        }
    }

    return Ok(());
}

/// Get the array corresponding to `parameter` in this block: the values for
/// `"values"`, or the values of the gradient with this name.
fn selected_values(block: &TensorBlockRef<'_>, parameter: &str) -> Result<ArrayD<f64>, Error> {
    if parameter == "values" {
        let array = block.values().to_array();
        return Ok(array.to_owned());
    }

    let gradient = block.gradient(parameter).ok_or_else(|| Error::UnknownParameter(format!(
        "there are no '{}' gradients in this block", parameter
    )))?;
    let array = gradient.values().to_array();
    return Ok(array.to_owned());
}

/// Compute the root mean square error between `y_true` and `y_pred`, for
/// each block in the tensors.
///
/// The error is computed on the values if `parameter_key` is `"values"`, or
/// on the gradients with respect to `parameter_key` otherwise. The output
/// contains one entry for each key, in the same order as `y_true.keys()`.
///
/// # Errors
///
/// This function returns [`Error::KeyMismatch`] if the two tensors do not
/// have the same keys, [`Error::UnknownParameter`] if the requested gradient
/// is missing from some blocks, and [`Error::ShapeMismatch`] if the blocks
/// associated with the same key do not contain the same number of entries.
#[time_graph::instrument(name = "rmse")]
pub fn rmse(y_true: &TensorMap, y_pred: &TensorMap, parameter_key: &str) -> Result<Vec<f64>, Error> {
    check_same_keys(y_true, y_pred)?;

    let mut errors = Vec::with_capacity(y_true.keys().count());
    for (block_i, key) in y_true.keys().iter().enumerate() {
        let position = y_pred.keys().position(key).ok_or_else(|| Error::Internal(
            "key disappeared from y_pred".into()
        ))?;

        let values_true = selected_values(&y_true.block_by_id(block_i), parameter_key)?;
        let values_pred = selected_values(&y_pred.block_by_id(position), parameter_key)?;

        if values_true.len() != values_pred.len() {
            return Err(Error::ShapeMismatch(format!(
                "block {} contains {} '{}' entries in y_true but {} in y_pred",
                block_i, values_true.len(), parameter_key, values_pred.len()
            )));
        }

        if values_true.is_empty() {
            errors.push(0.0);
            continue;
        }

        let squared_error = values_true.iter()
            .zip(values_pred.iter())
            .map(|(t, p)| (t - p) * (t - p))
            .sum::<f64>();

        errors.push(f64::sqrt(squared_error / values_true.len() as f64));
    }

    return Ok(errors);
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use metatensor::{Labels, LabelsBuilder, TensorBlock, TensorMap};
    use ndarray::{array, Array2, ArrayD};

    use crate::Error;
    use super::rmse;

    /// Create a tensor with one block for each row of `data`, each block
    /// containing one sample and `data.ncols()` properties.
    fn tensor_from_rows(data: &Array2<f64>) -> TensorMap {
        let mut keys = LabelsBuilder::new(vec!["key"]);
        let mut blocks = Vec::new();
        for (key_i, row) in data.rows().into_iter().enumerate() {
            keys.add(&[key_i]);

            let mut properties = LabelsBuilder::new(vec!["property"]);
            for property_i in 0..row.len() {
                properties.add(&[property_i]);
            }

            let values = row.to_owned().insert_axis(ndarray::Axis(0)).into_dyn();
            blocks.push(TensorBlock::new(
                values,
                &Labels::new(["sample"], &[[0]]),
                &[],
                &properties.finish(),
            ).unwrap());
        }

        return TensorMap::new(keys.finish(), blocks).unwrap();
    }

    fn tensor_with_gradients(values: ArrayD<f64>, gradients: ArrayD<f64>) -> TensorMap {
        let n_samples = values.shape()[0];
        let n_properties = values.shape()[1];

        let mut samples = LabelsBuilder::new(vec!["sample"]);
        for sample_i in 0..n_samples {
            samples.add(&[sample_i]);
        }
        let mut properties = LabelsBuilder::new(vec!["property"]);
        for property_i in 0..n_properties {
            properties.add(&[property_i]);
        }
        let properties = properties.finish();

        let mut gradient_samples = LabelsBuilder::new(vec!["sample", "structure", "atom"]);
        for sample_i in 0..n_samples {
            gradient_samples.add(&[sample_i, 1, 1]);
        }

        let mut block = TensorBlock::new(values, &samples.finish(), &[], &properties).unwrap();
        let gradient = TensorBlock::new(
            gradients,
            &gradient_samples.finish(),
            &[Labels::new(["direction"], &[[0], [1], [2]])],
            &properties,
        ).unwrap();
        block.add_gradient("positions", gradient).unwrap();

        return TensorMap::new(Labels::single(), vec![block]).unwrap();
    }

    #[test]
    fn values() {
        let y_true = tensor_from_rows(&array![[0.5, 1.0], [-1.0, 1.0], [7.0, -6.0]]);
        let y_pred = tensor_from_rows(&array![[0.0, 2.0], [-1.0, 2.0], [8.0, -5.0]]);

        let errors = rmse(&y_true, &y_pred, "values").unwrap();
        assert_eq!(errors.len(), 3);
        assert_relative_eq!(errors[0], 0.790569, max_relative=1e-6);
        assert_relative_eq!(errors[1], 0.707107, max_relative=1e-6);
        assert_relative_eq!(errors[2], 1.0, max_relative=1e-6);
    }

    #[test]
    fn gradients() {
        let n_samples = 10;
        let n_properties = 5;
        let values = ArrayD::from_shape_fn(vec![n_samples, n_properties], |i| {
            3.3 + (i[0] * n_properties + i[1]) as f64 * 0.1
        });
        let gradients = ArrayD::from_shape_fn(vec![n_samples, 3, n_properties], |i| {
            f64::sin((i[0] + 2 * i[1] + 7 * i[2]) as f64)
        });
        let tensor = tensor_with_gradients(values.clone(), gradients.clone());

        assert_eq!(rmse(&tensor, &tensor, "positions").unwrap(), [0.0]);
        assert_eq!(rmse(&tensor, &tensor, "values").unwrap(), [0.0]);

        let shifted = tensor_with_gradients(values, gradients + 0.5);
        let errors = rmse(&tensor, &shifted, "positions").unwrap();
        assert_relative_eq!(errors[0], 0.5, max_relative=1e-12);
    }

    #[test]
    fn errors() {
        let y_true = tensor_from_rows(&array![[0.5, 1.0], [-1.0, 1.0]]);
        let y_pred = tensor_from_rows(&array![[0.5, 1.0]]);
        let error = rmse(&y_true, &y_pred, "values").unwrap_err();
        assert!(matches!(error, Error::KeyMismatch(_)));

        let y_pred = tensor_from_rows(&array![[0.5, 1.0, 2.0], [-1.0, 1.0, 2.0]]);
        let error = rmse(&y_true, &y_pred, "values").unwrap_err();
        assert!(matches!(error, Error::ShapeMismatch(_)));

        let error = rmse(&y_true, &y_true, "positions").unwrap_err();
        assert_eq!(
            error.to_string(),
            "unknown parameter: there are no 'positions' gradients in this block"
        );
    }

    #[test]
    fn different_key_order() {
        let y_true = tensor_from_rows(&array![[0.0, 0.0], [1.0, 1.0]]);

        // same keys, in reverse order
        let blocks = vec![
            TensorBlock::new(array![[1.0, 1.0]].into_dyn(), &Labels::new(["sample"], &[[0]]), &[], &Labels::new(["property"], &[[0], [1]])).unwrap(),
            TensorBlock::new(array![[0.0, 3.0]].into_dyn(), &Labels::new(["sample"], &[[0]]), &[], &Labels::new(["property"], &[[0], [1]])).unwrap(),
        ];
        let y_pred = TensorMap::new(Labels::new(["key"], &[[1], [0]]), blocks).unwrap();

        let errors = rmse(&y_true, &y_pred, "values").unwrap();
        assert_relative_eq!(errors[0], f64::sqrt(4.5));
        assert_relative_eq!(errors[1], 0.0);
    }
}
