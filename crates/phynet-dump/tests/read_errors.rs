use std::fs;

use phynet_core::PhyError;
use phynet_dump::Reader;
use tempfile::tempdir;

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.bin");
    let err = Reader::new(2, &path).read().unwrap_err();
    match err {
        PhyError::Io(info) => {
            assert_eq!(info.code, "dataset-open");
            assert_eq!(info.context["path"], path.display().to_string());
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn empty_file_is_a_format_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.bin");
    fs::write(&path, b"").unwrap();
    let err = Reader::new(3, &path).read().unwrap_err();
    assert!(matches!(err, PhyError::Format(_)));
    assert_eq!(err.info().code, "dataset-empty");
}

#[test]
fn oversized_register_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.bin");
    fs::write(&path, [0u8; 64]).unwrap();
    for num_qubits in [33, 64, 200] {
        let err = Reader::new(num_qubits, &path).read().unwrap_err();
        assert!(matches!(err, PhyError::Config(_)));
        assert_eq!(err.info().code, "dataset-num-qubits");
    }
}

#[test]
fn register_larger_than_file_yields_no_instances() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("small.bin");
    fs::write(&path, [0u8; 64]).unwrap();
    let dataset = Reader::new(20, &path).read().unwrap();
    assert!(dataset.is_empty());
    assert_eq!(dataset.num_qubits(), 20);
}
