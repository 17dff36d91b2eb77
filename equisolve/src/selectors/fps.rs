use ndarray::{ArrayView1, ArrayView2};

use crate::Error;
use super::{SelectorBase, check_n_to_select};

#[derive(Debug, Clone)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
/// Farthest point sampling of the properties.
///
/// Each property is seen as a point (the column of the values containing
/// this property), and the property farthest away from all the
/// already-selected properties is selected at each step.
pub struct FarthestPointSampling {
    /// Number of properties to select
    pub n_to_select: usize,
    /// Index of the property used to start the selection
    #[serde(default)]
    pub initialize: usize,
}

fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(a, b)| (a - b) * (a - b)).sum()
}

impl SelectorBase for FarthestPointSampling {
    fn name(&self) -> String {
        return "farthest point sampling".into();
    }

    fn parameters(&self) -> String {
        return serde_json::to_string(self).expect("failed to serialize to JSON");
    }

    #[time_graph::instrument(name = "FarthestPointSampling::select")]
    fn select(&self, values: ArrayView2<'_, f64>) -> Result<Vec<usize>, Error> {
        let n_properties = values.ncols();
        check_n_to_select(self.n_to_select, n_properties)?;
        if self.n_to_select == 0 {
            return Ok(Vec::new());
        }

        if self.initialize >= n_properties {
            return Err(Error::InvalidParameter(format!(
                "can not start farthest point sampling at property {}, there are only {} properties",
                self.initialize, n_properties
            )));
        }

        let mut selected = vec![self.initialize];

        // distance between each property and the closest selected property,
        // or -inf for already selected properties
        let first = values.column(self.initialize);
        let mut distances = values.columns().into_iter()
            .map(|column| squared_distance(column, first))
            .collect::<Vec<_>>();
        distances[self.initialize] = f64::NEG_INFINITY;

        while selected.len() < self.n_to_select {
            let mut farthest = 0;
            for (property_i, &distance) in distances.iter().enumerate() {
                if distance > distances[farthest] {
                    farthest = property_i;
                }
            }
            debug_assert!(distances[farthest].is_finite());

            selected.push(farthest);
            distances[farthest] = f64::NEG_INFINITY;

            let new = values.column(farthest);
            for (property_i, column) in values.columns().into_iter().enumerate() {
                let distance = squared_distance(column, new);
                if distance < distances[property_i] {
                    distances[property_i] = distance;
                }
            }
        }

        return Ok(selected);
    }
}
