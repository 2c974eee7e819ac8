use nalgebra::{DMatrix, DVector};
use phynet_core::{state_dimension, Dataset, FieldRecord, PhyError};

fn record(n: usize, base: f64) -> FieldRecord {
    FieldRecord::new(
        (0..n).map(|i| base + i as f64).collect(),
        (0..n).map(|i| base + 10.0 + i as f64).collect(),
        (0..n).map(|i| base + 20.0 + i as f64).collect(),
    )
    .unwrap()
}

#[test]
fn dimension_is_power_of_two() {
    assert_eq!(state_dimension(0), 1);
    assert_eq!(state_dimension(2), 4);
    assert_eq!(state_dimension(5), 32);
}

#[test]
fn push_accepts_consistent_instances() {
    let mut dataset = Dataset::new(2);
    dataset
        .push(record(2, 0.0), DVector::zeros(4), DMatrix::identity(4, 4))
        .unwrap();
    dataset
        .push(record(2, 1.0), DVector::zeros(4), DMatrix::identity(4, 4))
        .unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.dim(), 4);
    let second = dataset.instance(1).unwrap();
    assert_eq!(second.fields.coupling, vec![1.0, 2.0]);
    assert_eq!(second.ground_state(), vec![1.0, 0.0, 0.0, 0.0]);
    assert!(dataset.instance(2).is_none());
    let indices: Vec<usize> = dataset.iter().map(|inst| inst.index).collect();
    assert_eq!(indices, vec![0, 1]);
}

#[test]
fn push_rejects_mismatched_shapes() {
    let mut dataset = Dataset::new(2);
    let err = dataset
        .push(record(3, 0.0), DVector::zeros(4), DMatrix::identity(4, 4))
        .unwrap_err();
    assert!(matches!(err, PhyError::Shape(_)));

    let err = dataset
        .push(record(2, 0.0), DVector::zeros(3), DMatrix::identity(4, 4))
        .unwrap_err();
    assert_eq!(err.info().code, "instance-values");

    let err = dataset
        .push(record(2, 0.0), DVector::zeros(4), DMatrix::identity(4, 3))
        .unwrap_err();
    assert_eq!(err.info().code, "instance-wavefx");
    assert!(dataset.is_empty());
}

#[test]
fn field_record_input_layout_round_trips() {
    let rec = record(3, 0.5);
    let input = rec.to_input();
    assert_eq!(input.len(), 9);
    assert_eq!(&input[..3], rec.coupling.as_slice());
    assert_eq!(&input[6..], rec.longitudinal.as_slice());
    assert_eq!(FieldRecord::from_input(&input).unwrap(), rec);
    assert!(FieldRecord::from_input(&input[..8]).is_err());
}

#[test]
fn field_record_rejects_ragged_sequences() {
    assert!(FieldRecord::new(vec![1.0, 2.0], vec![1.0], vec![1.0, 2.0]).is_err());
    assert!(FieldRecord::new(vec![1.0], vec![1.0], vec![]).is_err());
}
