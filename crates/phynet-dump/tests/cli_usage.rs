use std::fs;
use std::process::Command;

use tempfile::tempdir;

fn dump() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dump"))
}

#[test]
fn wrong_argument_count_prints_usage() {
    let output = dump().arg("2").output().expect("run dump");
    assert_eq!(output.status.code(), Some(255));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("<num_qubits>  <fpath> [-csv]"));
}

#[test]
fn unreadable_file_exits_with_failure() {
    let dir = tempdir().unwrap();
    let output = dump()
        .args(["2", dir.path().join("absent.bin").to_str().unwrap()])
        .output()
        .expect("run dump");
    assert_eq!(output.status.code(), Some(255));
}

#[test]
fn oversized_register_exits_with_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.bin");
    fs::write(&path, [0u8; 16]).unwrap();
    let output = dump()
        .args(["64", path.to_str().unwrap()])
        .output()
        .expect("run dump");
    assert_eq!(output.status.code(), Some(255));
    assert!(String::from_utf8(output.stderr).unwrap().contains("dataset-num-qubits"));
}

#[test]
fn csv_flag_writes_both_exports() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.bin");
    let bytes: Vec<u8> = (0..26).flat_map(|i| (i as f64).to_le_bytes()).collect();
    fs::write(&path, &bytes).unwrap();

    let output = dump()
        .args([
            "2",
            path.to_str().unwrap(),
            "-csv",
            "--out-dir",
            dir.path().to_str().unwrap(),
        ])
        .output()
        .expect("run dump");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("INSTANCE"));

    let input = fs::read_to_string(dir.path().join("input.csv")).unwrap();
    assert_eq!(input.lines().count(), 2);
    assert!(input.lines().nth(1).unwrap().starts_with("1,0,2,4,"));
    let output = fs::read_to_string(dir.path().join("output.csv")).unwrap();
    assert_eq!(output.lines().count(), 2);
}
