use std::fs;

use nalgebra::{DMatrix, DVector};
use phynet_core::{Dataset, FieldRecord};
use phynet_dump::{write_csv, DatasetWriter, Precision, Reader, INPUT_HEADER, OUTPUT_HEADER};
use proptest::prelude::*;
use tempfile::tempdir;

fn synthetic(num_qubits: usize, values: &[f64]) -> Dataset {
    let dim = 1 << num_qubits;
    let mut dataset = Dataset::new(num_qubits);
    for (idx, chunk) in values.chunks(3 * num_qubits).enumerate() {
        if chunk.len() < 3 * num_qubits {
            break;
        }
        let fields = FieldRecord::new(
            chunk[..num_qubits].to_vec(),
            chunk[num_qubits..2 * num_qubits].to_vec(),
            chunk[2 * num_qubits..].to_vec(),
        )
        .unwrap();
        let eigen = DVector::from_fn(dim, |i, _| idx as f64 + i as f64 * 0.5);
        let wavefx = DMatrix::from_fn(dim, dim, |r, c| chunk[(r + c) % chunk.len()] * 0.1);
        dataset.push(fields, eigen, wavefx).unwrap();
    }
    dataset
}

fn parse_rows(text: &str) -> Vec<Vec<f64>> {
    text.lines()
        .skip(1)
        .map(|line| line.split(',').map(|cell| cell.trim().parse::<f64>().unwrap()).collect())
        .collect()
}

#[test]
fn csv_headers_are_literal() {
    let dir = tempdir().unwrap();
    let dataset = synthetic(1, &[1.0, 2.0, 3.0]);
    let input = dir.path().join("input.csv");
    let output = dir.path().join("output.csv");
    write_csv(&dataset, &input, &output).unwrap();

    let inputs = fs::read_to_string(&input).unwrap();
    let outputs = fs::read_to_string(&output).unwrap();
    assert_eq!(inputs.lines().next(), Some(INPUT_HEADER));
    assert_eq!(outputs.lines().next(), Some(OUTPUT_HEADER));
    assert_eq!(inputs.lines().nth(1), Some("1,1,2,3"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn binary_then_csv_preserves_every_value(
        num_qubits in 1usize..4,
        raw in proptest::collection::vec(-5.0f64..5.0, 36),
        single in any::<bool>(),
    ) {
        let precision = if single { Precision::Single } else { Precision::Double };
        let dataset = synthetic(num_qubits, &raw);
        let dir = tempdir().unwrap();
        let bin = dir.path().join("data.bin");
        DatasetWriter::new(precision).write(&dataset, &bin).unwrap();

        let restored = Reader::new(num_qubits, &bin).with_precision(precision).read().unwrap();
        prop_assert_eq!(restored.len(), dataset.len());

        let input = dir.path().join("input.csv");
        let output = dir.path().join("output.csv");
        write_csv(&restored, &input, &output).unwrap();

        let tol = if single { 1e-6 } else { 0.0 };
        let input_rows = parse_rows(&fs::read_to_string(&input).unwrap());
        let output_rows = parse_rows(&fs::read_to_string(&output).unwrap());
        prop_assert_eq!(input_rows.len(), dataset.len());
        for (instance, (in_row, out_row)) in dataset.iter().zip(input_rows.iter().zip(output_rows.iter())) {
            prop_assert_eq!(in_row[0] as usize, instance.index + 1);
            for j in 0..num_qubits {
                prop_assert!((in_row[1 + 3 * j] - instance.fields.coupling[j]).abs() <= tol * 5.0);
                prop_assert!((in_row[2 + 3 * j] - instance.fields.transverse[j]).abs() <= tol * 5.0);
                prop_assert!((in_row[3 + 3 * j] - instance.fields.longitudinal[j]).abs() <= tol * 5.0);
            }
            prop_assert_eq!(out_row.len(), 1 + instance.wavefx.len());
            for (cell, expected) in out_row[1..].iter().zip(instance.wavefx.as_slice()) {
                prop_assert!((cell - expected).abs() <= tol);
            }
        }
    }
}
