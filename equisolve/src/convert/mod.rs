//! Conversion of reference data (energies, forces, stress, ...) computed for
//! a set of structures into metatensor's `TensorMap`.

mod properties;
pub use self::properties::{properties_to_tensormap, ConversionOptions};

mod structures;
pub use self::structures::{structures_to_tensormap, StructureKeys};
