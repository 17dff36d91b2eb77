#![allow(dead_code)]

use serde_json::Value;
use ndarray::Array2;

use equisolve::{SimpleStructure, SinglePoint, Structure};
use equisolve::structures::Property;

/// How the reference data should be stored in the structures
#[derive(Clone, Copy)]
pub enum Storage {
    /// attach a single point engine to the structures
    Engine,
    /// store the data as info/array fields named `dft_energy`, `dft_forces`
    /// and `dft_stress`
    Fields,
}

pub fn load_structures(path: &str, storage: Storage) -> Vec<Box<dyn Structure>> {
    let json = std::fs::read_to_string(format!("tests/data/{}", path))
        .expect("failed to read input file");

    let data: Value = serde_json::from_str(&json).expect("failed to parse JSON");

    let mut structures = Vec::new();
    for entry in data["structures"].as_array().expect("structures must be an array") {
        let mut structure = SimpleStructure::new();

        let types = entry["types"].as_array().expect("types must be an array");
        let positions = read_matrix(&entry["positions"]);
        for (atomic_type, position) in types.iter().zip(positions.rows()) {
            let atomic_type = atomic_type.as_i64().expect("types must be integers") as i32;
            structure.add_atom(atomic_type, [position[0], position[1], position[2]]);
        }

        let energy = entry["energy"].as_f64().expect("energy must be a number");
        let forces = read_matrix(&entry["forces"]);
        let stress = read_tensor(&entry["stress"]);

        match storage {
            Storage::Engine => {
                let results = SinglePoint::new(energy).with_forces(forces).with_stress(stress);
                structure.attach(results).expect("invalid forces");
            }
            Storage::Fields => {
                structure.set_info("dft_energy", Property::Scalar(energy));
                structure.set_info("dft_stress", Property::Tensor(stress));
                structure.set_array("dft_forces", forces).expect("invalid forces");
            }
        }

        structures.push(Box::new(structure) as Box<dyn Structure>);
    }

    return structures;
}

fn read_matrix(value: &Value) -> Array2<f64> {
    let rows = value.as_array().expect("expected an array");
    let mut matrix = Array2::zeros((rows.len(), 3));
    for (i, row) in rows.iter().enumerate() {
        let row = row.as_array().expect("expected an array");
        assert_eq!(row.len(), 3);
        for (j, v) in row.iter().enumerate() {
            matrix[[i, j]] = v.as_f64().expect("expected a number");
        }
    }
    return matrix;
}

fn read_tensor(value: &Value) -> [[f64; 3]; 3] {
    let matrix = read_matrix(value);
    assert_eq!(matrix.nrows(), 3);

    let mut tensor = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            tensor[i][j] = matrix[[i, j]];
        }
    }
    return tensor;
}
