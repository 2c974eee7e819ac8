use nalgebra::{DMatrix, DVector, SymmetricEigen};
use phynet_core::{state_dimension, FieldRecord};
use serde::{Deserialize, Serialize};

use crate::operators::spin_up;

/// Boundary condition of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Boundary {
    /// Bond `J_i` couples site `i` and `(i + 1) mod n`.
    #[default]
    Periodic,
    /// Bond `J_i` couples `i` and `i + 1`; the last coupling is unused.
    Open,
}

/// Ascending eigenvalues and matching eigenvectors (one per column).
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Eigenvalues sorted ascending.
    pub values: DVector<f64>,
    /// Eigenvectors; column `k` belongs to `values[k]`.
    pub vectors: DMatrix<f64>,
}

fn sz(num_qubits: usize, site: usize, basis: usize) -> f64 {
    if spin_up(num_qubits, site, basis) {
        1.0
    } else {
        -1.0
    }
}

/// Assembles `H = -Σ J_i σᶻ_i σᶻ_j - Σ Bx_i σˣ_i - Σ Bz_i σᶻ_i`.
pub fn ising_hamiltonian(fields: &FieldRecord, boundary: Boundary) -> DMatrix<f64> {
    let n = fields.num_qubits();
    let dim = state_dimension(n);
    let bonds: Vec<(usize, usize, f64)> = match boundary {
        Boundary::Periodic if n > 1 => (0..n).map(|i| (i, (i + 1) % n, fields.coupling[i])).collect(),
        Boundary::Periodic => Vec::new(),
        Boundary::Open => (0..n.saturating_sub(1))
            .map(|i| (i, i + 1, fields.coupling[i]))
            .collect(),
    };

    let mut hamiltonian = DMatrix::zeros(dim, dim);
    for basis in 0..dim {
        let mut diagonal = 0.0;
        for &(i, j, coupling) in &bonds {
            diagonal -= coupling * sz(n, i, basis) * sz(n, j, basis);
        }
        for site in 0..n {
            diagonal -= fields.longitudinal[site] * sz(n, site, basis);
            let flipped = basis ^ (1usize << (n - 1 - site));
            hamiltonian[(flipped, basis)] -= fields.transverse[site];
        }
        hamiltonian[(basis, basis)] += diagonal;
    }
    hamiltonian
}

/// Diagonalises a symmetric matrix, sorting eigenpairs ascending.
///
/// Each eigenvector is sign-fixed so its largest-magnitude component is
/// positive, which makes reference states reproducible across solvers.
pub fn diagonalize(matrix: &DMatrix<f64>) -> Spectrum {
    let dim = matrix.nrows();
    let eigen = SymmetricEigen::new(matrix.clone());
    let mut order: Vec<usize> = (0..dim).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[a]
            .partial_cmp(&eigen.eigenvalues[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let values = DVector::from_iterator(dim, order.iter().map(|&k| eigen.eigenvalues[k]));
    let mut vectors = DMatrix::zeros(dim, dim);
    for (target, &source) in order.iter().enumerate() {
        let column = eigen.eigenvectors.column(source);
        let pivot = column
            .iter()
            .copied()
            .fold(0.0f64, |best, c| if c.abs() > best.abs() { c } else { best });
        let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
        vectors.set_column(target, &(column * sign));
    }
    Spectrum { values, vectors }
}

/// Builds and diagonalises the chain Hamiltonian for `fields`.
pub fn solve(fields: &FieldRecord, boundary: Boundary) -> Spectrum {
    diagonalize(&ising_hamiltonian(fields, boundary))
}
