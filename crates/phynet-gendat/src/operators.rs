use nalgebra::{DMatrix, DVector};

/// Returns true when `site` is in the spin-up (`σᶻ = +1`) state in basis
/// state `basis`. Site 0 is the most significant bit of the basis index.
pub fn spin_up(num_qubits: usize, site: usize, basis: usize) -> bool {
    (basis >> (num_qubits - 1 - site)) & 1 == 0
}

/// A Hermitian observable on the `2^n` dimensional register.
#[derive(Debug, Clone, PartialEq)]
pub enum Observable {
    /// Operator diagonal in the computational basis.
    Diagonal(DVector<f64>),
    /// General dense symmetric operator.
    Dense(DMatrix<f64>),
}

impl Observable {
    /// Dimension of the space the observable acts on.
    pub fn dim(&self) -> usize {
        match self {
            Observable::Diagonal(diag) => diag.len(),
            Observable::Dense(matrix) => matrix.nrows(),
        }
    }

    /// Dense matrix representation.
    pub fn to_dense(&self) -> DMatrix<f64> {
        match self {
            Observable::Diagonal(diag) => DMatrix::from_diagonal(diag),
            Observable::Dense(matrix) => matrix.clone(),
        }
    }

    /// Expectation value `<psi|O|psi> / <psi|psi>`; zero for a null state.
    pub fn expectation(&self, psi: &[f64]) -> f64 {
        let norm_sq: f64 = psi.iter().map(|c| c * c).sum();
        if norm_sq <= f64::EPSILON {
            return 0.0;
        }
        let raw = match self {
            Observable::Diagonal(diag) => diag
                .iter()
                .zip(psi.iter())
                .map(|(d, c)| d * c * c)
                .sum::<f64>(),
            Observable::Dense(matrix) => {
                let state = DVector::from_column_slice(psi);
                state.dot(&(matrix * &state))
            }
        };
        raw / norm_sq
    }
}

/// `σᶻ` acting on `site`.
pub fn pauli_z(num_qubits: usize, site: usize) -> Observable {
    let dim = 1usize << num_qubits;
    Observable::Diagonal(DVector::from_fn(dim, |basis, _| {
        if spin_up(num_qubits, site, basis) {
            1.0
        } else {
            -1.0
        }
    }))
}

/// `σˣ` acting on `site`.
pub fn pauli_x(num_qubits: usize, site: usize) -> Observable {
    let dim = 1usize << num_qubits;
    let mask = 1usize << (num_qubits - 1 - site);
    let mut matrix = DMatrix::zeros(dim, dim);
    for basis in 0..dim {
        matrix[(basis ^ mask, basis)] = 1.0;
    }
    Observable::Dense(matrix)
}

/// Total magnetisation `Σ_i σᶻ_i`.
pub fn total_magnetization(num_qubits: usize) -> Observable {
    let dim = 1usize << num_qubits;
    Observable::Diagonal(DVector::from_fn(dim, |basis, _| {
        (0..num_qubits)
            .map(|site| if spin_up(num_qubits, site, basis) { 1.0 } else { -1.0 })
            .sum()
    }))
}

/// Per-site `σᶻ_i` observables in site order.
pub fn site_magnetizations(num_qubits: usize) -> Vec<Observable> {
    (0..num_qubits).map(|site| pauli_z(num_qubits, site)).collect()
}
