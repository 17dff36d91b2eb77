use ndarray::Array2;

use super::{SimpleStructure, SinglePoint, Structure};

pub fn test_structures(names: &[&str]) -> Vec<Box<dyn Structure>> {
    return names.iter()
        .map(|&name| Box::new(test_structure(name)) as Box<dyn Structure>)
        .collect();
}

/// Get one of the pre-defined test structures, with an engine providing the
/// energy, forces and stress attached.
pub fn test_structure(name: &str) -> SimpleStructure {
    match name {
        "water" => get_water(),
        "CH" => get_ch(),
        "methane" => get_methane(),
        _ => panic!("unknown test structure {}", name)
    }
}

/// Deterministic forces for the atoms in `structure`, summing to zero
fn forces_for(structure: &SimpleStructure) -> Array2<f64> {
    let n_atoms = structure.size();
    let mut forces = Array2::zeros((n_atoms, 3));
    for (atom_i, mut force) in forces.rows_mut().into_iter().enumerate() {
        for direction in 0..3 {
            force[direction] = 0.1 * (atom_i + 1) as f64 * (direction as f64 - 1.0);
        }
    }
    let mean = forces.mean_axis(ndarray::Axis(0)).expect("empty structure");
    return forces - &mean;
}

fn get_water() -> SimpleStructure {
    let mut structure = SimpleStructure::new();
    structure.add_atom(8, [0.0, 0.0, 0.0]);
    structure.add_atom(1, [0.0, 0.75545, -0.58895]);
    structure.add_atom(1, [0.0, -0.75545, -0.58895]);

    let results = SinglePoint::new(-14.2)
        .with_forces(forces_for(&structure))
        .with_stress([[0.1, 0.0, 0.0], [0.0, 0.2, 0.0], [0.0, 0.0, 0.3]]);
    structure.attach(results).expect("invalid test structure");
    return structure;
}

fn get_ch() -> SimpleStructure {
    let mut structure = SimpleStructure::new();
    structure.add_atom(6, [0.0, 0.0, 0.0]);
    structure.add_atom(1, [0.0, 1.2, 0.0]);

    let results = SinglePoint::new(-6.5)
        .with_forces(forces_for(&structure))
        .with_stress([[0.4, 0.1, 0.0], [0.1, 0.5, 0.0], [0.0, 0.0, 0.6]]);
    structure.attach(results).expect("invalid test structure");
    return structure;
}

fn get_methane() -> SimpleStructure {
    let mut structure = SimpleStructure::new();
    structure.add_atom(6, [5.0000, 5.0000, 5.0000]);
    structure.add_atom(1, [5.5288, 5.1610, 5.9359]);
    structure.add_atom(1, [5.2051, 5.8240, 4.3214]);
    structure.add_atom(1, [5.3345, 4.0686, 4.5504]);
    structure.add_atom(1, [3.9315, 4.9463, 5.1921]);

    let results = SinglePoint::new(-24.0)
        .with_forces(forces_for(&structure))
        .with_stress([[-0.2, 0.0, 0.05], [0.0, -0.2, 0.0], [0.05, 0.0, -0.1]]);
    structure.attach(results).expect("invalid test structure");
    return structure;
}
