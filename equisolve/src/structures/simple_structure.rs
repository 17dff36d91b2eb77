use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView2};

use crate::Error;
use super::{Capabilities, Computed, Property, Structure};

/// Results of a single point calculation stored alongside a structure. This
/// is the engine used when reading reference data from files.
#[derive(Clone, Debug, PartialEq)]
pub struct SinglePoint {
    energy: f64,
    forces: Option<Array2<f64>>,
    stress: Option<[[f64; 3]; 3]>,
}

impl SinglePoint {
    /// Create new results containing only the given potential `energy`
    pub fn new(energy: f64) -> SinglePoint {
        SinglePoint {
            energy: energy,
            forces: None,
            stress: None,
        }
    }

    /// Add the `forces` acting on the atoms, as an array of shape
    /// `(n_atoms, 3)`
    pub fn with_forces(mut self, forces: Array2<f64>) -> SinglePoint {
        self.forces = Some(forces);
        self
    }

    /// Add the 3x3 `stress` tensor
    pub fn with_stress(mut self, stress: [[f64; 3]; 3]) -> SinglePoint {
        self.stress = Some(stress);
        self
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            forces: self.forces.is_some(),
            stress: self.stress.is_some(),
        }
    }
}

/// A simple implementation of `Structure` to use when no other is available
#[derive(Clone, Debug)]
pub struct SimpleStructure {
    types: Vec<i32>,
    positions: Vec<[f64; 3]>,
    info: BTreeMap<String, Property>,
    arrays: BTreeMap<String, Array2<f64>>,
    engine: Option<SinglePoint>,
}

impl SimpleStructure {
    /// Create a new empty structure, with no engine attached
    pub fn new() -> SimpleStructure {
        SimpleStructure {
            types: Vec::new(),
            positions: Vec::new(),
            info: BTreeMap::new(),
            arrays: BTreeMap::new(),
            engine: None,
        }
    }

    /// Add an atom with the given atomic type and position to this structure
    pub fn add_atom(&mut self, atomic_type: i32, position: [f64; 3]) {
        self.types.push(atomic_type);
        self.positions.push(position);
    }

    /// Get the atomic types of all atoms in this structure
    pub fn types(&self) -> &[i32] {
        &self.types
    }

    /// Get the positions of all atoms in this structure
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    /// Store a per-structure `property` under the given `key`, replacing any
    /// previous value.
    pub fn set_info(&mut self, key: impl Into<String>, property: Property) {
        self.info.insert(key.into(), property);
    }

    /// Store a per-atom `array` under the given `key`, replacing any previous
    /// value. The array must contain one row per atom.
    pub fn set_array(&mut self, key: impl Into<String>, array: Array2<f64>) -> Result<(), Error> {
        let key = key.into();
        if array.nrows() != self.size() {
            return Err(Error::ShapeMismatch(format!(
                "per-atom array '{}' has {} rows, but this structure contains {} atoms",
                key, array.nrows(), self.size()
            )));
        }

        self.arrays.insert(key, array);
        return Ok(());
    }

    /// Attach the results of a single point calculation to this structure.
    pub fn attach(&mut self, results: SinglePoint) -> Result<(), Error> {
        if let Some(ref forces) = results.forces {
            if forces.shape() != [self.size(), 3] {
                return Err(Error::ShapeMismatch(format!(
                    "expected forces with shape ({}, 3) for this structure, got {:?}",
                    self.size(), forces.shape()
                )));
            }
        }

        self.engine = Some(results);
        return Ok(());
    }

    /// Remove the engine attached to this structure, if any
    pub fn detach(&mut self) -> Option<SinglePoint> {
        self.engine.take()
    }
}

impl Default for SimpleStructure {
    fn default() -> Self {
        SimpleStructure::new()
    }
}

impl Structure for SimpleStructure {
    fn size(&self) -> usize {
        self.types.len()
    }

    fn info(&self, key: &str) -> Option<&Property> {
        self.info.get(key)
    }

    fn array(&self, key: &str) -> Option<ArrayView2<'_, f64>> {
        self.arrays.get(key).map(|array| array.view())
    }

    fn capabilities(&self) -> Option<Capabilities> {
        self.engine.as_ref().map(SinglePoint::capabilities)
    }

    fn potential_energy(&self) -> Result<f64, Error> {
        match self.engine {
            Some(ref engine) => Ok(engine.energy),
            None => Err(Error::InvalidParameter(
                "can not get the potential energy: there is no engine attached to this structure".into()
            )),
        }
    }

    fn forces(&self) -> Result<Computed<Array2<f64>>, Error> {
        let computed = match self.engine {
            None => Computed::Absent,
            Some(SinglePoint { forces: None, .. }) => Computed::NotComputable,
            Some(SinglePoint { forces: Some(ref forces), .. }) => Computed::Present(forces.clone()),
        };
        return Ok(computed);
    }

    fn stress(&self) -> Result<Computed<[[f64; 3]; 3]>, Error> {
        let computed = match self.engine {
            None => Computed::Absent,
            Some(SinglePoint { stress: None, .. }) => Computed::NotComputable,
            Some(SinglePoint { stress: Some(stress), .. }) => Computed::Present(stress),
        };
        return Ok(computed);
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use super::*;

    #[test]
    fn add_atoms() {
        let mut structure = SimpleStructure::new();
        structure.add_atom(3, [2.0, 3.0, 4.0]);
        structure.add_atom(1, [1.0, 3.0, 4.0]);
        structure.add_atom(3, [5.0, 3.0, 4.0]);

        assert_eq!(structure.size(), 3);
        assert_eq!(structure.types(), &[3, 1, 3]);
        assert_eq!(structure.positions(), &[
            [2.0, 3.0, 4.0],
            [1.0, 3.0, 4.0],
            [5.0, 3.0, 4.0],
        ]);
    }

    #[test]
    fn stored_data() {
        let mut structure = SimpleStructure::new();
        structure.add_atom(1, [0.0, 0.0, 0.0]);
        structure.add_atom(1, [0.0, 0.0, 0.74]);

        structure.set_info("dft_energy", Property::Scalar(-31.2));
        assert_eq!(structure.info("dft_energy"), Some(&Property::Scalar(-31.2)));
        assert_eq!(structure.info("missing"), None);

        structure.set_array("dft_forces", array![[0.0, 0.0, 1.0], [0.0, 0.0, -1.0]]).unwrap();
        assert_eq!(structure.array("dft_forces").unwrap(), array![[0.0, 0.0, 1.0], [0.0, 0.0, -1.0]]);

        let error = structure.set_array("bad", array![[0.0, 0.0, 1.0]]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "shape mismatch: per-atom array 'bad' has 1 rows, but this structure contains 2 atoms"
        );
    }

    #[test]
    fn engine() {
        let mut structure = SimpleStructure::new();
        structure.add_atom(8, [0.0, 0.0, 0.0]);

        assert_eq!(structure.capabilities(), None);
        assert!(structure.potential_energy().is_err());
        assert_eq!(structure.forces().unwrap(), Computed::Absent);
        assert_eq!(structure.stress().unwrap(), Computed::Absent);

        structure.attach(SinglePoint::new(-2.5)).unwrap();
        assert_eq!(structure.capabilities(), Some(Capabilities {
            forces: false,
            stress: false,
        }));
        assert_eq!(structure.potential_energy().unwrap(), -2.5);
        assert_eq!(structure.forces().unwrap(), Computed::NotComputable);
        assert_eq!(structure.stress().unwrap(), Computed::NotComputable);

        let stress = [[1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 3.0]];
        let results = SinglePoint::new(-2.5)
            .with_forces(array![[0.1, 0.2, 0.3]])
            .with_stress(stress);
        structure.attach(results).unwrap();

        assert_eq!(structure.forces().unwrap(), Computed::Present(array![[0.1, 0.2, 0.3]]));
        assert_eq!(structure.stress().unwrap(), Computed::Present(stress));

        let bad_forces = SinglePoint::new(0.0).with_forces(array![[0.1, 0.2]]);
        assert!(structure.attach(bad_forces).is_err());

        assert!(structure.detach().is_some());
        assert_eq!(structure.capabilities(), None);
    }
}
