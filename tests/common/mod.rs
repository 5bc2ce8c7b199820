//! Shared utilities for integration tests.
//!
//! Helpers for running the `c2v` binary and reading POSCAR output back.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Path to the compiled `c2v` binary.
pub fn c2v_binary() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_BIN_EXE_c2v"));
    if !path.exists() {
        path = PathBuf::from("target/debug/c2v");
    }
    path
}

/// Fixture file under `tests/files`.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/files")
        .join(name)
}

/// Run c2v with the given arguments, feeding `stdin` to the process.
pub fn run_c2v<I, S>(args: I, stdin: &str) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut child = Command::new(c2v_binary())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to execute c2v binary");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write to c2v stdin");
    child.wait_with_output().expect("failed to wait for c2v")
}

/// Parsed view of a POSCAR as written by c2v (labels on the first line).
#[derive(Debug)]
pub struct PoscarView {
    pub labels: Vec<String>,
    pub lattice: Vec<[f64; 3]>,
    pub counts: Vec<usize>,
    pub positions: Vec<[f64; 3]>,
}

fn triple(line: &str) -> [f64; 3] {
    let values: Vec<f64> = line
        .split_whitespace()
        .map(|s| s.parse().expect("number"))
        .collect();
    assert_eq!(values.len(), 3, "expected 3 numbers in '{line}'");
    [values[0], values[1], values[2]]
}

pub fn read_poscar(path: &Path) -> PoscarView {
    let text = std::fs::read_to_string(path).expect("failed to read POSCAR");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[1], "1.0");
    assert_eq!(lines[6], "Direct");
    PoscarView {
        labels: lines[0].split_whitespace().map(String::from).collect(),
        lattice: lines[2..5].iter().map(|l| triple(l)).collect(),
        counts: lines[5]
            .split_whitespace()
            .map(|s| s.parse().expect("count"))
            .collect(),
        positions: lines[7..].iter().map(|l| triple(l)).collect(),
    }
}
