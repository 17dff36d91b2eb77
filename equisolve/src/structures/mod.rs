use ndarray::{Array2, ArrayView2};

use crate::Error;

mod simple_structure;
pub use self::simple_structure::{SimpleStructure, SinglePoint};

mod chemfiles;
pub use self::chemfiles::read_from_file;

#[cfg(test)]
pub(crate) mod test_utils;

/// Named per-structure data attached to a [`Structure`]
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// A single scalar value, for example an energy
    Scalar(f64),
    /// A 3x3 tensor, for example a stress or a virial
    Tensor([[f64; 3]; 3]),
}

/// Set of gradients that the engine attached to a structure is able to
/// compute. The potential energy is always available from an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// the engine can compute the forces acting on all atoms
    pub forces: bool,
    /// the engine can compute the stress tensor
    pub stress: bool,
}

/// Result of asking a structure to compute some property
#[derive(Debug, Clone, PartialEq)]
pub enum Computed<T> {
    /// The property was computed
    Present(T),
    /// There is no engine attached to the structure
    Absent,
    /// The engine attached to the structure does not implement this property
    NotComputable,
}

impl<T> Computed<T> {
    /// Get the computed value, if any
    pub fn present(self) -> Option<T> {
        match self {
            Computed::Present(value) => Some(value),
            Computed::Absent | Computed::NotComputable => None,
        }
    }
}

/// A `Structure` is a single atomic configuration together with the
/// reference data associated with it.
///
/// Reference data can either be stored explicitly under a name (with
/// [`Structure::info`] for per-structure data and [`Structure::array`] for
/// per-atom data), or be computed by an engine attached to the structure.
pub trait Structure: Send + Sync {
    /// Get the number of atoms in this structure
    fn size(&self) -> usize;

    /// Get the per-structure property stored under the given `key`
    fn info(&self, key: &str) -> Option<&Property>;

    /// Get the per-atom array stored under the given `key`. The returned
    /// array has one row for each atom.
    fn array(&self, key: &str) -> Option<ArrayView2<'_, f64>>;

    /// Get the set of properties the attached engine can compute, or `None`
    /// if there is no engine attached to this structure.
    fn capabilities(&self) -> Option<Capabilities>;

    /// Compute the potential energy of this structure with the attached
    /// engine
    fn potential_energy(&self) -> Result<f64, Error>;

    /// Compute the forces acting on all atoms with the attached engine, as
    /// an array of shape `(self.size(), 3)`
    fn forces(&self) -> Result<Computed<Array2<f64>>, Error>;

    /// Compute the full 3x3 stress tensor with the attached engine
    fn stress(&self) -> Result<Computed<[[f64; 3]; 3]>, Error>;
}

#[cfg(test)]
mod tests {
    use super::Computed;

    #[test]
    fn computed() {
        assert_eq!(Computed::Present(3).present(), Some(3));
        assert_eq!(Computed::<i32>::Absent.present(), None);
        assert_eq!(Computed::<i32>::NotComputable.present(), None);
    }
}
