use predicates::prelude::*;
use assert_cmd::Command;

#[test]
fn auto_detect_non_tty_runs_bare_once_and_exits_0() {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.write_stdin(format!("{}.", "+".repeat(65)))
        .assert()
        .success()
        .stdout(predicate::str::contains("A"));
}

#[test]
fn editor_on_non_tty_is_error_exit_1() {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.arg("repl")
        .arg("--editor")
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("stdin is not a TTY"));
}

#[test]
fn invalid_env_mode_is_error() {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env("BF_REPL_MODE", "sideways")
        .arg("repl")
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid BF_REPL_MODE"));
}

#[test]
fn env_mode_respected_flags_override() {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env("BF_REPL_MODE", "editor")
        .arg("repl")
        .arg("--bare")
        .write_stdin(format!("{}.", "+".repeat(66)))
        .assert()
        .success()
        .stdout(predicate::str::contains("B"));
}
