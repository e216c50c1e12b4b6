use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command { Command::cargo_bin("bf").unwrap() }

fn hello_bf() -> &'static str {
    "// prints Hi\n++++++++ [ > +++++++++ < - ] > .\n/* 72 + 33 = 105 */\n+++++++++++++++++++++++++++++++++ ."
}

fn source_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::Builder::new().suffix(suffix).tempfile().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn test_run_positional_code_success() {
    cargo_bin()
        .arg("run").arg(hello_bf())
        .assert()
        .success()
        .stdout("Hi\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_positional_parts_are_concatenated() {
    cargo_bin()
        .args(["run", &"+".repeat(40), &"+".repeat(25), "."])
        .assert()
        .success()
        .stdout("A\n");
}

#[test]
fn test_run_file_success() {
    let tf = source_file(".bf", hello_bf());
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout("Hi\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_file_wrong_extension() {
    let tf = source_file(".txt", hello_bf());
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("FilePathError").and(predicate::str::contains(".bf")));
}

#[test]
fn test_run_file_without_code() {
    let tf = source_file(".bf", "// nothing to see\n");
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not contain any code to execute"));
}

#[test]
fn test_run_dump_shows_tape() {
    cargo_bin()
        .args(["run", "--dump=3", "+++>+"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[3]").and(predicate::str::contains("[1]")).and(predicate::str::contains("(2)")));
}

#[test]
fn test_run_small_capacity_faults() {
    cargo_bin()
        .args(["run", "--capacity", "2", ">>"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OutOfBoundsError: at position 2"));
}

#[test]
fn test_run_small_limit_overflows() {
    cargo_bin()
        .args(["run", "--limit", "3", "+++"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OverflowError").and(predicate::str::contains("integer limit of 3")));
}

#[test]
fn test_run_invalid_limit_is_usage_error() {
    cargo_bin()
        .args(["run", "--limit", "1", "+"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("integer limit must be greater than 1"));
}

#[test]
fn test_run_without_code_prints_usage() {
    cargo_bin()
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}
