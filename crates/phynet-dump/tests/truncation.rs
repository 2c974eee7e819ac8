use std::fs;
use std::io::Write;

use phynet_dump::{record_stride, Precision, Reader};
use tempfile::tempdir;

fn record_bytes(seed: f64) -> Vec<u8> {
    // n = 2, dim = 4: 6 field values, 4 eigenvalues, 16 eigenvector entries.
    (0..26)
        .flat_map(|idx| (seed + idx as f64).to_le_bytes())
        .collect()
}

#[test]
fn two_qubit_stride_is_208_bytes() {
    assert_eq!(record_stride(2, Precision::Double), Some(208));
    assert_eq!(record_bytes(0.0).len(), 208);
}

#[test]
fn exact_multiple_loads_every_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exact.bin");
    let mut bytes = record_bytes(0.0);
    bytes.extend(record_bytes(100.0));
    assert_eq!(bytes.len(), 416);
    fs::write(&path, &bytes).unwrap();

    let dataset = Reader::new(2, &path).read().unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.fields()[1].coupling, vec![100.0, 101.0]);
    assert_eq!(dataset.fields()[1].transverse, vec![102.0, 103.0]);
    assert_eq!(dataset.fields()[1].longitudinal, vec![104.0, 105.0]);
    assert_eq!(dataset.values()[1].as_slice(), &[106.0, 107.0, 108.0, 109.0]);
}

#[test]
fn trailing_partial_record_is_dropped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ragged.bin");
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(&record_bytes(0.0)).unwrap();
    file.write_all(&record_bytes(1.0)).unwrap();
    file.write_all(&[0xAB; 50]).unwrap();
    drop(file);
    assert_eq!(fs::metadata(&path).unwrap().len(), 466);

    let dataset = Reader::new(2, &path).read().unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.fields()[1].coupling, vec![1.0, 2.0]);
}

#[test]
fn file_shorter_than_one_record_yields_empty_dataset() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.bin");
    fs::write(&path, vec![0u8; 100]).unwrap();
    let dataset = Reader::new(2, &path).read().unwrap();
    assert!(dataset.is_empty());
}

#[test]
fn eigenvector_block_is_column_major() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("layout.bin");
    fs::write(&path, record_bytes(0.0)).unwrap();
    let dataset = Reader::new(2, &path).read().unwrap();
    let wavefx = &dataset.wavefx()[0];
    // The first four matrix elements on disk (10..13) form column 0.
    assert_eq!(wavefx[(0, 0)], 10.0);
    assert_eq!(wavefx[(3, 0)], 13.0);
    assert_eq!(wavefx[(0, 1)], 14.0);
    assert_eq!(dataset.instance(0).unwrap().ground_state(), vec![10.0, 11.0, 12.0, 13.0]);
}
