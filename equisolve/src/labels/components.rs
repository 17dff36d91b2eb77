use metatensor::Labels;

/// Components of gradients with respect to atomic positions: the cartesian
/// direction of the displacement.
pub fn positions_gradient_components() -> Vec<Labels> {
    vec![Labels::new(["direction"], &[[0], [1], [2]])]
}

/// Components of gradients with respect to the cell: the two directions of
/// the 3x3 cell matrix.
pub fn cell_gradient_components() -> Vec<Labels> {
    vec![
        Labels::new(["direction_1"], &[[0], [1], [2]]),
        Labels::new(["direction_2"], &[[0], [1], [2]]),
    ]
}
