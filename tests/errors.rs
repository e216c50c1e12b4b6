use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command { Command::cargo_bin("bf").unwrap() }

#[test]
fn test_invalid_character_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("+a+")
    .assert()
    .failure()
    .stderr(predicate::str::contains("SyntaxError: at position 2")
        .and(predicate::str::contains("char 'a' could not be interpreted"))
        .and(predicate::str::contains("two forward slashes")))
    .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_unterminated_loop_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("[")
    .assert()
    .failure()
    .stderr(predicate::str::contains("unterminated while loops"));
}

#[test]
fn test_unended_comment_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("+ /* open")
    .assert()
    .failure()
    .stderr(predicate::str::contains("SyntaxError: at position 2").and(predicate::str::contains("unended comments")));
}

#[test]
fn test_unprintable_output_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("+++.")
    .assert()
    .failure()
    .stderr(predicate::str::contains("InputError: at position 4"));
}

#[test]
fn test_out_of_bounds_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("<")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("OutOfBoundsError").and(predicate::str::contains("leftward")));
}

#[test]
fn test_guard_rails_absorb_sub_zero() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).args(["run", "-g", "--", "-<"])
    .assert()
    .success()
    .stderr(predicate::str::contains("No output provided."));
}

#[test]
fn test_guard_rails_do_not_soften_output_checks() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).args(["run", "--guard-rails", "+."])
    .assert()
    .failure()
    .stderr(predicate::str::contains("InputError"));
}
