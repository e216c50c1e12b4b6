use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command { Command::cargo_bin("bf").unwrap() }

fn infinite_bf() -> &'static str { "+[]" }

#[test]
fn test_stdout_only_for_program_output() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", &format!("{}.", "+".repeat(72))])
        .assert()
        .success()
        .stdout("H\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_stderr_only_for_abort_messages() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .env("BF_TIMEOUT_MS", "100")
        .args(["run", infinite_bf()])
        .assert()
        .stderr(predicate::str::contains("Execution aborted"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_no_output_note_goes_to_stderr() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "+++[-]"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No output provided."));
}
