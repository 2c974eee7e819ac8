//! State-level numerics shared by the model metrics.

use nalgebra::{DMatrix, SymmetricEigen};
use phynet_core::checked_state_dimension;

/// Eigenvalues at or below this threshold contribute nothing to the entropy.
pub const ENTROPY_CUTOFF: f64 = 1e-12;

/// Euclidean norm of a state.
pub fn norm(psi: &[f64]) -> f64 {
    psi.iter().map(|c| c * c).sum::<f64>().sqrt()
}

/// Returns `psi / |psi|`, or `psi` unchanged when it is the null vector.
pub fn normalized(psi: &[f64]) -> Vec<f64> {
    let n = norm(psi);
    if n <= f64::EPSILON {
        return psi.to_vec();
    }
    psi.iter().map(|c| c / n).collect()
}

/// Real inner product.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Fidelity `|<a/|a|, b/|b|>|`, in `[0, 1]`; zero when either state is null.
pub fn fidelity(a: &[f64], b: &[f64]) -> f64 {
    let (na, nb) = (norm(a), norm(b));
    if na <= f64::EPSILON || nb <= f64::EPSILON {
        return 0.0;
    }
    (dot(a, b) / (na * nb)).abs().min(1.0)
}

/// Mean squared difference after flipping the sign of `predicted` to best
/// match `reference`; real eigenvectors are only defined up to sign.
pub fn aligned_mse(predicted: &[f64], reference: &[f64]) -> f64 {
    if predicted.is_empty() {
        return 0.0;
    }
    let sign = if dot(predicted, reference) < 0.0 { -1.0 } else { 1.0 };
    predicted
        .iter()
        .zip(reference)
        .map(|(p, r)| (sign * p - r).powi(2))
        .sum::<f64>()
        / predicted.len() as f64
}

/// Averages states after aligning each sign to the first one, then normalises.
pub fn aligned_mean(states: &[Vec<f64>]) -> Vec<f64> {
    let Some(anchor) = states.first() else {
        return Vec::new();
    };
    let mut mean = vec![0.0; anchor.len()];
    for state in states {
        let sign = if dot(state, anchor) < 0.0 { -1.0 } else { 1.0 };
        for (acc, c) in mean.iter_mut().zip(state) {
            *acc += sign * c;
        }
    }
    normalized(&mean)
}

/// Reduced density matrix of the leading `subsystem` qubits.
///
/// `psi` is normalised first and reshaped into the `2^k x 2^(n-k)` matrix
/// `M[a, b] = psi[a * 2^(n-k) + b]`; the result is `M Mᵀ`.
///
/// Returns `None` when `subsystem > num_qubits` or `psi` is not a
/// `2^num_qubits` state.
pub fn reduced_density_matrix(
    psi: &[f64],
    num_qubits: usize,
    subsystem: usize,
) -> Option<DMatrix<f64>> {
    let complement = num_qubits.checked_sub(subsystem)?;
    if checked_state_dimension(num_qubits)? != psi.len() {
        return None;
    }
    let rows = checked_state_dimension(subsystem)?;
    let cols = checked_state_dimension(complement)?;
    let state = normalized(psi);
    let reshaped = DMatrix::from_row_slice(rows, cols, &state);
    Some(&reshaped * reshaped.transpose())
}

/// Von Neumann entropy `-Σ λ ln λ` of a density matrix, using the natural
/// logarithm. Eigenvalues below [`ENTROPY_CUTOFF`] (including round-off
/// negatives) are dropped, so the result is never `NaN`.
pub fn von_neumann_entropy(rho: &DMatrix<f64>) -> f64 {
    let symmetric = 0.5 * (rho + rho.transpose());
    let eigen = SymmetricEigen::new(symmetric);
    let entropy: f64 = eigen
        .eigenvalues
        .iter()
        .filter(|&&lambda| lambda > ENTROPY_CUTOFF)
        .map(|&lambda| -lambda * lambda.ln())
        .sum();
    entropy.max(0.0)
}

/// Entanglement entropy between the leading `subsystem` qubits and the rest.
///
/// Zero for trivial cuts, null states and shapes that do not form a
/// bipartition of `psi`.
pub fn entanglement_entropy(psi: &[f64], num_qubits: usize, subsystem: usize) -> f64 {
    if subsystem == 0 || subsystem == num_qubits || norm(psi) <= f64::EPSILON {
        return 0.0;
    }
    reduced_density_matrix(psi, num_qubits, subsystem)
        .map(|rho| von_neumann_entropy(&rho))
        .unwrap_or(0.0)
}
