mod common;

use common::{dataset, free_model, mlp_model, FreeState};
use phynet_core::{Network, PhyError};
use phynet_model::{Bipartition, LyapunovConfig, Model, ModelConfig};
use phynet_nn::{Adam, Infidelity, Mlp};

fn params<N: Network>(networks: &[N]) -> Vec<Vec<f64>> {
    networks.iter().map(|n| n.parameters().to_vec()).collect()
}

#[test]
fn training_reduces_loss() {
    let data = dataset(2, 16);
    let mut model = mlp_model(2, 2, ModelConfig::default());
    let before = model.mse(&data).unwrap();
    let first = model.train(&data).unwrap();
    let mut last = first.clone();
    for _ in 0..300 {
        last = model.train(&data).unwrap();
    }
    assert_eq!(first.learner_loss.len(), 2);
    assert!(last.mean() < first.mean(), "{} !< {}", last.mean(), first.mean());
    assert!(model.overlap(&data).unwrap() > 0.0);
    assert!(model.mse(&data).unwrap().is_finite());
    assert!(before.is_finite());
}

#[test]
fn reset_is_idempotent_and_forgets_training() {
    let data = dataset(2, 8);
    let mut model = mlp_model(2, 3, ModelConfig::default());
    model.reset();
    let once = model.mse(&data).unwrap();
    let snapshot = params(model.networks());
    model.reset();
    assert_eq!(model.mse(&data).unwrap(), once);
    assert_eq!(params(model.networks()), snapshot);

    for _ in 0..5 {
        model.train(&data).unwrap();
    }
    assert_ne!(params(model.networks()), snapshot);
    model.reset();
    assert_eq!(params(model.networks()), snapshot);
    assert_eq!(model.mse(&data).unwrap(), once);
}

#[test]
fn fresh_models_train_identically() {
    let data = dataset(2, 8);
    let run = || {
        let mut model = mlp_model(2, 2, ModelConfig::default());
        model.reset();
        for _ in 0..5 {
            model.train(&data).unwrap();
        }
        (params(model.networks()), model.metric_bundle(&data).unwrap())
    };
    assert_eq!(run(), run());
}

#[test]
fn parallel_and_sequential_passes_agree() {
    let data = dataset(2, 10);
    let mut parallel = mlp_model(2, 2, ModelConfig::default());
    let mut sequential = mlp_model(
        2,
        2,
        ModelConfig {
            parallel: false,
            ..ModelConfig::default()
        },
    );
    for _ in 0..4 {
        let a = parallel.train(&data).unwrap();
        let b = sequential.train(&data).unwrap();
        assert_eq!(a, b);
    }
    assert_eq!(params(parallel.networks()), params(sequential.networks()));
}

#[test]
fn learners_update_independently() {
    let data = dataset(2, 6);
    let mut solo = mlp_model(2, 1, ModelConfig::default());
    let mut trio = mlp_model(2, 3, ModelConfig::default());
    for _ in 0..3 {
        solo.train(&data).unwrap();
        trio.train(&data).unwrap();
    }
    assert_eq!(solo.networks()[0].parameters(), trio.networks()[0].parameters());
}

#[test]
fn learn_from_matches_train_updates() {
    let data = dataset(2, 6);
    let mut trained = mlp_model(2, 2, ModelConfig::default());
    let mut learned = mlp_model(2, 2, ModelConfig::default());
    for _ in 0..3 {
        trained.train(&data).unwrap();
        learned.learn_from(&data).unwrap();
    }
    assert_eq!(params(trained.networks()), params(learned.networks()));
}

#[test]
fn mismatched_dataset_is_rejected() {
    let mut model = mlp_model(2, 1, ModelConfig::default());
    let wrong = dataset(3, 2);
    let err = model.train(&wrong).unwrap_err();
    assert!(matches!(err, PhyError::Shape(_)));
    assert_eq!(err.info().code, "dataset-register");
    assert!(model.learn_from(&wrong).is_err());
    assert!(model.overlap(&wrong).is_err());
}

#[test]
fn construction_validates_ensemble() {
    let err = Model::<Mlp, Infidelity, Adam>::new(
        Vec::new(),
        Infidelity,
        Adam::new(1e-2),
        ModelConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.info().code, "empty-ensemble");

    let odd = FreeState::new(2, vec![0.0; 3]);
    let err = Model::new(vec![odd], Infidelity, Adam::new(1e-2), ModelConfig::default())
        .unwrap_err();
    assert_eq!(err.info().code, "output-dimension");

    let mixed = vec![FreeState::new(2, vec![0.0; 4]), FreeState::new(3, vec![0.0; 8])];
    let err = Model::new(mixed, Infidelity, Adam::new(1e-2), ModelConfig::default())
        .unwrap_err();
    assert_eq!(err.info().code, "ensemble-shape");

    let config = ModelConfig {
        target_level: 4,
        ..ModelConfig::default()
    };
    let err = Model::new(
        vec![FreeState::new(2, vec![0.0; 4])],
        Infidelity,
        Adam::new(1e-2),
        config,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "target-level");

    let config = ModelConfig {
        bipartition: Bipartition { subsystem: Some(3) },
        ..ModelConfig::default()
    };
    let err = Model::new(
        vec![FreeState::new(2, vec![0.0; 4])],
        Infidelity,
        Adam::new(1e-2),
        config,
    )
    .unwrap_err();
    assert!(matches!(err, PhyError::Config(_)));
}

#[test]
fn config_yaml_fills_defaults_and_validates() {
    let config = ModelConfig::from_yaml("seed: 11\naggregation: mean-of-predictions\n").unwrap();
    assert_eq!(config.seed, 11);
    assert_eq!(config.lyapunov, LyapunovConfig::default());
    assert!(config.parallel);

    let err = ModelConfig::from_yaml("lyapunov:\n  epsilon: 0.0\n").unwrap_err();
    assert_eq!(err.info().code, "lyapunov-epsilon");
}

#[test]
fn lyapunov_estimate_is_finite_and_input_blind_learners_score_zero() {
    let data = dataset(2, 5);
    let config = ModelConfig {
        lyapunov: LyapunovConfig {
            directions: 3,
            ..LyapunovConfig::default()
        },
        ..ModelConfig::default()
    };
    let model = mlp_model(2, 2, config.clone());
    let estimate = model.lyapunov_estimate(&data).unwrap();
    assert!(estimate.is_finite());
    assert_eq!(estimate, model.lyapunov_estimate(&data).unwrap());
    assert_eq!(model.instance_lyapunov(&data).unwrap().len(), 5);

    let constant = free_model(2, vec![vec![0.5; 4]], config);
    assert_eq!(constant.lyapunov_estimate(&data).unwrap(), 0.0);
    assert!(constant.instance_lyapunov(&data).unwrap().is_empty());
}
