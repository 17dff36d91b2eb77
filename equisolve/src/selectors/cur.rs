use log::warn;
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::Error;
use crate::math::SymmetricEigen;
use super::{SelectorBase, check_n_to_select};

fn default_k() -> usize { 1 }
fn default_tolerance() -> f64 { 1e-12 }

#[derive(Debug, Clone)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
/// CUR decomposition based selection of the properties.
///
/// At each step, the importance of each property is computed from the `k`
/// leading right singular vectors of the values, and the most important
/// property is selected. All the properties are then orthogonalized with
/// respect to the selected one before the next step.
pub struct Cur {
    /// Number of properties to select
    pub n_to_select: usize,
    /// Number of singular vectors used to compute the importance score
    #[serde(default = "default_k")]
    pub k: usize,
    /// Stop the selection when the importance score falls below this value
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Cur {
    /// Importance score of all properties in `values`. Singular vectors
    /// with a squared singular value below `threshold` do not contribute to
    /// the score.
    fn importance(&self, values: &Array2<f64>, threshold: f64) -> Array1<f64> {
        let covariance = values.t().dot(values);
        let eigen = SymmetricEigen::new(covariance.view());

        let n_eigenvalues = eigen.eigenvalues.len();
        let mut importance = Array1::zeros(values.ncols());
        for (i, vector) in eigen.leading_eigenvectors(self.k).columns().into_iter().enumerate() {
            if eigen.eigenvalues[n_eigenvalues - 1 - i] <= threshold {
                break;
            }
            importance += &vector.mapv(|v| v * v);
        }
        return importance;
    }
}

impl SelectorBase for Cur {
    fn name(&self) -> String {
        return "CUR decomposition".into();
    }

    fn parameters(&self) -> String {
        return serde_json::to_string(self).expect("failed to serialize to JSON");
    }

    #[time_graph::instrument(name = "Cur::select")]
    fn select(&self, values: ArrayView2<'_, f64>) -> Result<Vec<usize>, Error> {
        let n_properties = values.ncols();
        check_n_to_select(self.n_to_select, n_properties)?;
        if self.k == 0 {
            return Err(Error::InvalidParameter(
                "the number of singular vectors k must be at least 1".into()
            ));
        }

        let mut values = values.to_owned();
        let threshold = f64::EPSILON * values.iter().map(|v| v * v).sum::<f64>();

        let mut selected: Vec<usize> = Vec::with_capacity(self.n_to_select);
        while selected.len() < self.n_to_select {
            let importance = self.importance(&values, threshold);

            let mut best = None;
            for (property_i, &score) in importance.iter().enumerate() {
                if selected.contains(&property_i) {
                    continue;
                }
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((property_i, score));
                }
            }

            let Some((best, score)) = best else {
                break;
            };

            if score < self.tolerance {
                warn!(
                    "importance score is below the tolerance ({} < {}), only {} properties were selected instead of {}",
                    score, self.tolerance, selected.len(), self.n_to_select
                );
                break;
            }
            selected.push(best);

            // orthogonalize all properties with respect to the selected one
            let column = values.column(best).to_owned();
            let norm2 = column.dot(&column);
            if norm2 > 0.0 {
                let overlaps = column.dot(&values) / norm2;
                for (mut property, overlap) in values.axis_iter_mut(Axis(1)).zip(overlaps.iter()) {
                    property.scaled_add(-overlap, &column);
                }
            }
        }

        return Ok(selected);
    }
}
