mod common;

use std::f64::consts::LN_2;

use common::free_model;
use phynet_core::PhyError;
use phynet_model::metrics::{entanglement_entropy, reduced_density_matrix, von_neumann_entropy};
use phynet_model::{Bipartition, ModelConfig};
use proptest::prelude::*;

fn basis(dim: usize, index: usize) -> Vec<f64> {
    let mut psi = vec![0.0; dim];
    psi[index] = 1.0;
    psi
}

#[test]
fn product_states_have_zero_entropy() {
    assert!(entanglement_entropy(&basis(8, 5), 3, 1).abs() < 1e-12);
    let plus = [0.5, 0.5, 0.5, 0.5];
    assert!(entanglement_entropy(&plus, 2, 1).abs() < 1e-12);
}

#[test]
fn bell_and_ghz_states_reach_ln2() {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    let bell = [s, 0.0, 0.0, s];
    assert!((entanglement_entropy(&bell, 2, 1) - LN_2).abs() < 1e-12);

    let mut ghz = vec![0.0; 8];
    ghz[0] = s;
    ghz[7] = -s;
    assert!((entanglement_entropy(&ghz, 3, 1) - LN_2).abs() < 1e-12);
    assert!((entanglement_entropy(&ghz, 3, 2) - LN_2).abs() < 1e-12);
}

#[test]
fn paired_bell_states_saturate_two_qubit_bound() {
    // |ab>|ab> summed over ab: maximally entangled across the middle cut.
    let psi: Vec<f64> = (0..16)
        .map(|i| if (i >> 2) == (i & 3) { 0.5 } else { 0.0 })
        .collect();
    assert!((entanglement_entropy(&psi, 4, 2) - 2.0 * LN_2).abs() < 1e-12);
}

#[test]
fn trivial_cuts_and_null_states_are_zero() {
    let psi = [0.3, -0.1, 0.9, 0.2];
    assert_eq!(entanglement_entropy(&psi, 2, 0), 0.0);
    assert_eq!(entanglement_entropy(&psi, 2, 2), 0.0);
    assert_eq!(entanglement_entropy(&[0.0; 4], 2, 1), 0.0);
}

#[test]
fn inconsistent_shapes_are_zero() {
    let psi = [0.5, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 0.5];
    assert_eq!(entanglement_entropy(&psi, 2, 5), 0.0);
    assert_eq!(entanglement_entropy(&psi, 2, 1), 0.0);
    assert_eq!(entanglement_entropy(&psi[..6], 3, 1), 0.0);
    assert_eq!(entanglement_entropy(&psi, 70, 3), 0.0);
}

#[test]
fn model_uses_configured_bipartition() {
    let psi: Vec<f64> = (0..16)
        .map(|i| if (i >> 2) == (i & 3) { 0.5 } else { 0.0 })
        .collect();
    let half = free_model(4, vec![psi.clone()], ModelConfig::default());
    assert_eq!(half.subsystem(), 2);
    assert!((half.entanglement_entropy(&psi).unwrap() - 2.0 * LN_2).abs() < 1e-12);

    let config = ModelConfig {
        bipartition: Bipartition { subsystem: Some(1) },
        ..ModelConfig::default()
    };
    let one = free_model(4, vec![psi.clone()], config);
    assert!((one.entanglement_entropy(&psi).unwrap() - LN_2).abs() < 1e-12);

    let err = one.entanglement_entropy(&psi[..8]).unwrap_err();
    assert!(matches!(err, PhyError::Shape(_)));
    assert_eq!(err.info().code, "state-dimension");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn entropy_is_bounded_by_subsystem_size(
        psi in prop::collection::vec(-1.0f64..1.0, 16),
        k in 0usize..=4,
    ) {
        prop_assume!(psi.iter().any(|c| c.abs() > 1e-3));
        let entropy = entanglement_entropy(&psi, 4, k);
        prop_assert!(entropy.is_finite());
        prop_assert!(entropy >= 0.0);
        prop_assert!(entropy <= k as f64 * LN_2 + 1e-9);
        prop_assert!(entropy <= (4 - k) as f64 * LN_2 + 1e-9);
    }

    #[test]
    fn reduced_density_matrix_is_a_density_matrix(
        psi in prop::collection::vec(-1.0f64..1.0, 8),
        k in 1usize..=2,
    ) {
        prop_assume!(psi.iter().any(|c| c.abs() > 1e-3));
        let rho = reduced_density_matrix(&psi, 3, k).unwrap();
        prop_assert!((rho.trace() - 1.0).abs() < 1e-9);
        prop_assert!((&rho - rho.transpose()).amax() < 1e-12);
        prop_assert!(von_neumann_entropy(&rho) >= 0.0);
    }
}
