mod common;

use common::{dataset, free_model, single};
use phynet_model::{Aggregation, ModelConfig};
use proptest::prelude::*;

#[test]
fn exact_reference_gives_unit_overlap() {
    let data = dataset(2, 4);
    let one = single(&data, 2);
    let reference = one.instance(0).unwrap().ground_state();
    let flipped: Vec<f64> = reference.iter().map(|c| -2.0 * c).collect();
    let model = free_model(2, vec![reference, flipped], ModelConfig::default());

    assert!((model.overlap(&one).unwrap() - 1.0).abs() < 1e-12);
    assert!(model.mse(&one).unwrap() < 1e-24);
    assert!(model.average_sz_error(&one).unwrap() < 1e-12);
}

#[test]
fn orthogonal_prediction_gives_zero_overlap() {
    let data = dataset(2, 1);
    let instance = data.instance(0).unwrap();
    let model = free_model(2, vec![instance.eigenstate(1)], ModelConfig::default());
    assert!(model.overlap(&data).unwrap() < 1e-12);
}

#[test]
fn empty_dataset_reports_zero() {
    let data = phynet_core::Dataset::new(2);
    let model = free_model(2, vec![vec![1.0, 0.0, 0.0, 0.0]], ModelConfig::default());
    assert_eq!(model.overlap(&data).unwrap(), 0.0);
    assert_eq!(model.mse(&data).unwrap(), 0.0);
    assert_eq!(model.lyapunov_estimate(&data).unwrap(), 0.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn overlap_stays_in_unit_interval(
        a in prop::collection::vec(-1.0f64..1.0, 8),
        b in prop::collection::vec(-1.0f64..1.0, 8),
        mean_of_predictions in any::<bool>(),
    ) {
        let data = dataset(3, 5);
        let config = ModelConfig {
            aggregation: if mean_of_predictions {
                Aggregation::MeanOfPredictions
            } else {
                Aggregation::MeanOfMetrics
            },
            ..ModelConfig::default()
        };
        let model = free_model(3, vec![a, b], config);
        let overlap = model.overlap(&data).unwrap();
        prop_assert!((0.0..=1.0).contains(&overlap));
        for score in model.instance_overlaps(&data).unwrap() {
            prop_assert!((0.0..=1.0).contains(&score.value));
        }
    }
}
