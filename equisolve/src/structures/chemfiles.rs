use std::path::Path;

use super::SimpleStructure;
use crate::Error;

#[cfg(feature = "chemfiles")]
impl From<chemfiles::Error> for Error {
    fn from(error: chemfiles::Error) -> Error {
        Error::Chemfiles(error.message)
    }
}

/// Parse a 3x3 tensor stored as a string of 9 whitespace-separated numbers,
/// in row-major order.
#[cfg_attr(not(feature = "chemfiles"), allow(dead_code))]
fn parse_tensor(value: &str) -> Option<[[f64; 3]; 3]> {
    let numbers = value.split_whitespace()
        .map(|v| v.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    if numbers.len() != 9 {
        return None;
    }

    let mut tensor = [[0.0; 3]; 3];
    for (i, &number) in numbers.iter().enumerate() {
        tensor[i / 3][i % 3] = number;
    }
    return Some(tensor);
}

/// Read all structures in the file at the given `path` using
/// [chemfiles](https://chemfiles.org/), and convert them to
/// `SimpleStructure`s.
///
/// If a frame contains an `energy` property, the energy, the per-atom
/// `forces` and the frame `stress` (if present) are attached to the structure
/// as a [`SinglePoint`](super::SinglePoint) engine. All other scalar or 3x3
/// tensor frame properties are stored as info fields, and other per-atom
/// vector properties are stored as per-atom arrays.
///
/// This function can read all [formats supported by
/// chemfiles](https://chemfiles.org/chemfiles/latest/formats.html).
#[cfg(feature = "chemfiles")]
pub fn read_from_file(path: impl AsRef<Path>) -> Result<Vec<SimpleStructure>, Error> {
    use std::collections::BTreeMap;
    use ndarray::Array2;
    use chemfiles::Property as ChemfilesProperty;
    use super::{Property, SinglePoint};

    let mut structures = Vec::new();

    let mut trajectory = chemfiles::Trajectory::open(path, 'r')?;
    let mut frame = chemfiles::Frame::new();

    for _ in 0..trajectory.nsteps() {
        trajectory.read(&mut frame)?;

        let n_atoms = frame.size();
        let positions = frame.positions();

        let mut structure = SimpleStructure::new();
        let mut per_atom = BTreeMap::<String, Array2<f64>>::new();
        for i in 0..n_atoms {
            let atom = frame.atom(i);
            structure.add_atom(atom.atomic_number() as i32, positions[i]);

            for (name, property) in atom.properties() {
                if let ChemfilesProperty::Vector3D(vector) = property {
                    let array = per_atom.entry(name.to_string())
                        .or_insert_with(|| Array2::from_elem((n_atoms, 3), f64::NAN));
                    array.row_mut(i).assign(&ndarray::aview1(&vector));
                }
            }
        }

        let mut energy = None;
        let mut stress = None;
        for (name, property) in frame.properties() {
            let name = name.to_string();
            let property = match property {
                ChemfilesProperty::Double(value) => Property::Scalar(value),
                ChemfilesProperty::String(value) => match parse_tensor(&value) {
                    Some(tensor) => Property::Tensor(tensor),
                    None => continue,
                },
                _ => continue,
            };

            match (name.as_str(), property) {
                ("energy", Property::Scalar(value)) => energy = Some(value),
                ("stress", Property::Tensor(value)) => stress = Some(value),
                (_, property) => structure.set_info(name, property),
            }
        }

        let forces = per_atom.remove("forces");
        for (name, array) in per_atom {
            if array.iter().any(|v| v.is_nan()) {
                log::warn!("per-atom property '{}' is not defined for all atoms, ignoring it", name);
                continue;
            }
            structure.set_array(name, array)?;
        }

        if let Some(energy) = energy {
            let mut results = SinglePoint::new(energy);
            if let Some(forces) = forces {
                results = results.with_forces(forces);
            }
            if let Some(stress) = stress {
                results = results.with_stress(stress);
            }
            structure.attach(results)?;
        } else {
            if let Some(forces) = forces {
                structure.set_array("forces", forces)?;
            }
            if let Some(stress) = stress {
                structure.set_info("stress", Property::Tensor(stress));
            }
        }

        structures.push(structure);
    }

    return Ok(structures);
}

/// Read all structures in the file at the given `path` using
/// [chemfiles](https://chemfiles.org/), and convert them to
/// `SimpleStructure`s.
///
/// This function can read all [formats supported by
/// chemfiles](https://chemfiles.org/chemfiles/latest/formats.html).
#[cfg(not(feature = "chemfiles"))]
pub fn read_from_file(_: impl AsRef<Path>) -> Result<Vec<SimpleStructure>, Error> {
    Err(Error::Chemfiles(
        "read_from_file is only available with the chemfiles feature enabled".into()
    ))
}


#[cfg(all(test, feature = "chemfiles"))]
mod chemfiles_tests {
    use std::path::PathBuf;
    use approx::assert_relative_eq;
    use ndarray::array;

    use crate::structures::{Computed, Property, Structure};
    use super::*;

    #[test]
    fn read() -> Result<(), Box<dyn std::error::Error>> {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("tests");
        path.push("data");
        path.push("water.xyz");

        let structures = read_from_file(&path)?;

        assert_eq!(structures.len(), 2);
        assert_eq!(structures[0].size(), 3);
        assert_eq!(structures[0].types(), [8, 1, 1]);

        assert_relative_eq!(structures[0].potential_energy()?, -14.2);
        assert_relative_eq!(structures[1].potential_energy()?, -14.05);

        match structures[1].forces()? {
            Computed::Present(forces) => assert_relative_eq!(forces, array![
                [0.0, 0.1, 0.2],
                [0.0, -0.05, -0.1],
                [0.0, -0.05, -0.1],
            ]),
            other => panic!("expected forces, got {:?}", other),
        }

        assert_eq!(structures[0].info("temperature"), Some(&Property::Scalar(300.0)));

        Ok(())
    }
}
