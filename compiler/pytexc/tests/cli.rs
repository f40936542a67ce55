#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn converts_file_to_sibling_tex() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("paper.pytex");
    fs::write(&input, "$x = 🐍print(2 ** 10, end=\"\")🐍$\n").unwrap();

    cargo_bin_cmd!("pytex").arg(&input).assert().success();

    let output = fs::read_to_string(dir.path().join("paper.tex")).unwrap();
    assert_eq!(output, "$x = 1024$\n");
}

#[test]
fn explicit_output_path() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.pytex");
    let output = dir.path().join("out").join("result.tex");
    fs::create_dir(dir.path().join("out")).unwrap();
    fs::write(&input, "🐍print(\"hi\")🐍").unwrap();

    cargo_bin_cmd!("pytex")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(output).unwrap(), "hi\n");
}

#[test]
fn stdin_to_stdout() {
    cargo_bin_cmd!("pytex")
        .arg("-")
        .write_stdin("A🐍print(\"B\", end=\"\")🐍C")
        .assert()
        .success()
        .stdout("ABC");
}

#[test]
fn file_to_stdout() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("doc.pytex");
    fs::write(&input, "🐍print(\"a\")🐍🐍print(\"b\")🐍").unwrap();

    cargo_bin_cmd!("pytex")
        .arg(&input)
        .args(["-o", "-"])
        .assert()
        .success()
        .stdout("a\nb\n");
    assert!(!dir.path().join("doc.tex").exists());
}

#[test]
fn failing_block_exits_with_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("doc.pytex");
    fs::write(&input, "🐍print(\"first\")🐍 🐍1 / 0🐍").unwrap();

    cargo_bin_cmd!("pytex")
        .arg(&input)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "error: ZeroDivisionError: division by zero",
        ));
    assert!(!dir.path().join("doc.tex").exists());
}

#[test]
fn segments_listing() {
    cargo_bin_cmd!("pytex")
        .args(["-", "--segments"])
        .write_stdin("a🐍1/0🐍")
        .assert()
        .success()
        .stdout("0\tliteral\t0..1\t\"a\"\n1\texecutable\t5..8\t\"1/0\"\n");
}

#[test]
fn missing_input_file() {
    let dir = tempdir().unwrap();
    cargo_bin_cmd!("pytex")
        .arg(dir.path().join("nope.pytex"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: cannot read"));
}

#[test]
fn invalid_utf8_input() {
    cargo_bin_cmd!("pytex")
        .arg("-")
        .write_stdin(vec![0xc3, 0x28])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not valid UTF-8"));
}

#[test]
fn usage_error() {
    cargo_bin_cmd!("pytex")
        .arg("--no-such-flag")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn verbose_conflicts_with_quiet() {
    cargo_bin_cmd!("pytex")
        .args(["-", "-v", "-q"])
        .write_stdin("")
        .assert()
        .failure()
        .code(2);
}
