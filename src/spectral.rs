//! Spectral measurements built on the graph Laplacian.

use nalgebra::{DMatrix, SymmetricEigen};

use crate::graph::GraphIndex;

/// Constructs the laplacian matrix (`D - A`) from indexed adjacency lists.
pub(crate) fn laplacian_matrix(indices: &[Vec<GraphIndex>]) -> DMatrix<f64> {
    let n = indices.len();
    let mut matrix = DMatrix::<f64>::zeros(n, n);

    for (i, neighbours) in indices.iter().enumerate() {
        matrix[(i, i)] = neighbours.len() as f64;

        // The adjacency lists are symmetric, so each row fills its own half.
        for &j in neighbours {
            matrix[(i, j)] = -1.0;
        }
    }

    matrix
}

/// Returns the eigenvalues of the symmetric matrix in ascending order.
fn sorted_eigenvalues(matrix: DMatrix<f64>) -> Vec<f64> {
    // Early return if the matrix is empty, the decomposition requires at least a 1x1 matrix.
    if matrix.is_empty() {
        return vec![];
    }

    let mut eigenvalues: Vec<f64> = SymmetricEigen::new(matrix).eigenvalues.iter().copied().collect();
    eigenvalues.sort_unstable_by(f64::total_cmp);

    eigenvalues
}

/// The algebraic connectivity (Fiedler value): the second-smallest eigenvalue of the Laplacian.
///
/// It is zero if and only if the graph is disconnected, and grows with how hard the graph is to cut
/// in two. Graphs with fewer than two vertices have no second eigenvalue and yield `0.0`.
pub(crate) fn algebraic_connectivity(indices: &[Vec<GraphIndex>]) -> f64 {
    let eigenvalues = sorted_eigenvalues(laplacian_matrix(indices));

    // The Laplacian is positive semi-definite, so clamp tiny negative round-off.
    eigenvalues.get(1).map_or(0.0, |value| value.max(0.0))
}
