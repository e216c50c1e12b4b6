// Exercises the ',' (input) instruction by providing a line on stdin
// to `bf run ",."` (read one character, then echo it).
use predicates::prelude::*;

#[test]
fn reads_from_stdin_and_echoes_char() {
    let mut cmd = assert_cmd::Command::cargo_bin("bf")
        .expect("failed to locate bf binary");

    cmd.args(["run", ",."])
        .write_stdin("Z\n")
        .assert()
        .success()
        .stdout("Z\n");
}

#[test]
fn multi_char_input_is_rejected() {
    let mut cmd = assert_cmd::Command::cargo_bin("bf")
        .expect("failed to locate bf binary");

    cmd.args(["run", ",."])
        .write_stdin("ZZ\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("InputError").and(predicate::str::contains("not 1 in length")));
}

#[test]
fn empty_stdin_is_rejected() {
    let mut cmd = assert_cmd::Command::cargo_bin("bf")
        .expect("failed to locate bf binary");

    cmd.args(["run", ","])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("InputError"));
}
