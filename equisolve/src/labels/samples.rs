use metatensor::{Labels, LabelsBuilder};

/// Samples for values defined once per structure: a single `structure`
/// dimension going from 0 to `n_structures - 1`.
pub fn structure_samples(n_structures: usize) -> Labels {
    let mut builder = LabelsBuilder::new(vec!["structure"]);
    for structure_i in 0..n_structures {
        builder.add(&[structure_i]);
    }
    return builder.finish();
}

/// Gradient samples with respect to atomic positions for per-structure
/// values, where the structure `i` contains `atoms_per_structure[i]` atoms.
///
/// Each entry contains `[sample, structure, atom]`, where `sample` is the
/// position of the corresponding value in [`structure_samples`].
pub fn positions_gradient_samples(atoms_per_structure: &[usize]) -> Labels {
    let mut builder = LabelsBuilder::new(vec!["sample", "structure", "atom"]);
    for (structure_i, &n_atoms) in atoms_per_structure.iter().enumerate() {
        // one value per structure, so the sample is the structure index
        let sample_i = structure_i;
        for atom_i in 0..n_atoms {
            builder.add(&[sample_i, structure_i, atom_i]);
        }
    }
    return builder.finish();
}

/// Gradient samples with respect to the cell for per-structure values. There
/// is a single gradient row for each structure.
pub fn cell_gradient_samples(n_structures: usize) -> Labels {
    let mut builder = LabelsBuilder::new(vec!["sample"]);
    for sample_i in 0..n_structures {
        builder.add(&[sample_i]);
    }
    return builder.finish();
}
