//! End-to-end tests for the `skarv` binary.
//!
//! These run the compiled binary against small QASM files and check the
//! printed summaries, so they cover the full load -> transpile -> print
//! pipeline.

use std::path::PathBuf;
use std::process::{Command, Output};

fn skarv(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skarv"))
        .args(args)
        .output()
        .expect("failed to run skarv binary")
}

fn write_qasm(dir: &tempfile::TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).expect("failed to write test circuit");
    path
}

const BELL: &str = "OPENQASM 2.0;
include \"qelib1.inc\";
qreg q[2];
creg c[2];
h q[0];
cx q[0], q[1];
measure q -> c;
";

#[test]
fn test_prints_three_summaries_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_qasm(&dir, "bell.qasm", BELL);

    let output = skarv(&[path.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let original = stdout.find("Original:").expect("missing Original label");
    let optimized = stdout.find("Optimized:").expect("missing Optimized label");
    let mapped = stdout.find("Mapped:").expect("missing Mapped label");
    assert!(original < optimized);
    assert!(optimized < mapped);
}

#[test]
fn test_original_counts_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_qasm(
        &dir,
        "hm.qasm",
        "OPENQASM 2.0;\nqreg q[1];\ncreg c[1];\nh q[0];\nmeasure q[0] -> c[0];\n",
    );

    let output = skarv(&[path.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("Original:"));
    assert_eq!(lines.next(), Some("  {h: 1, measure: 1}"));
}

#[test]
fn test_optimized_keeps_basis_gates_and_measure() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_qasm(
        &dir,
        "hm.qasm",
        "OPENQASM 2.0;\nqreg q[1];\ncreg c[1];\nh q[0];\nmeasure q[0] -> c[0];\n",
    );

    let output = skarv(&[path.to_str().unwrap()]);
    let stdout = String::from_utf8(output.stdout).unwrap();

    // h is in the demo basis, so the optimized summary matches the original.
    let optimized_line = stdout
        .lines()
        .skip_while(|l| *l != "Optimized:")
        .nth(1)
        .expect("missing Optimized summary");
    assert_eq!(optimized_line, "  {h: 1, measure: 1}");
}

#[test]
fn test_mapped_rewrites_into_device_basis() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_qasm(&dir, "bell.qasm", BELL);

    let output = skarv(&[path.to_str().unwrap()]);
    let stdout = String::from_utf8(output.stdout).unwrap();

    // The device basis has no h; it becomes u2. cx and measure survive.
    let mapped_line = stdout
        .lines()
        .skip_while(|l| *l != "Mapped:")
        .nth(1)
        .expect("missing Mapped summary");
    assert_eq!(mapped_line, "  {measure: 2, cx: 1, u2: 1}");
}

#[test]
fn test_repeated_runs_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_qasm(&dir, "ghz.qasm", "OPENQASM 2.0;
include \"qelib1.inc\";
qreg q[5];
creg c[5];
h q[0];
cx q[0], q[1];
cx q[1], q[2];
cx q[2], q[3];
cx q[3], q[4];
barrier q;
measure q -> c;
");

    let first = skarv(&[path.to_str().unwrap()]);
    let second = skarv(&[path.to_str().unwrap()]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_missing_argument_fails_before_any_output() {
    let output = skarv(&[]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_nonexistent_file_fails() {
    let output = skarv(&["/no/such/circuit.qasm"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to load circuit"));
}

#[test]
fn test_parse_error_fails_with_nonzero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_qasm(&dir, "bad.qasm", "OPENQASM 2.0;\nqreg q[1];\nnope q[0];\n");

    let output = skarv(&[path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr).unwrap().contains("nope"));
}

#[test]
fn test_circuit_larger_than_device_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = String::from("OPENQASM 2.0;\nqreg q[25];\n");
    source.push_str("h q;\n");
    let path = write_qasm(&dir, "big.qasm", &source);

    let output = skarv(&[path.to_str().unwrap()]);
    assert!(!output.status.success());

    // The basis-only pass succeeds, so the first two summaries still print.
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Optimized:"));
    assert!(!stdout.contains("Mapped:"));
}
