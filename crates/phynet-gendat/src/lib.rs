//! Hamiltonians, observables and reference data for finite Ising chains.

pub mod generate;
pub mod hamiltonian;
pub mod operators;

pub use generate::{generate_dataset, FieldRange, GenConfig, MAX_QUBITS};
pub use hamiltonian::{diagonalize, ising_hamiltonian, solve, Boundary, Spectrum};
pub use operators::{
    pauli_x, pauli_z, site_magnetizations, spin_up, total_magnetization, Observable,
};
