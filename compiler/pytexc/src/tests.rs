#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use std::fs;

use pretty_assertions::assert_eq;
use pytex_eval::{ExceptionKind, Executor};

use super::*;
use crate::driver::describe_segments;

fn converted(document: &str) -> String {
    match convert(document) {
        Ok(out) => out,
        Err(err) => panic!("converting {document:?} failed: {err}"),
    }
}

#[test]
fn empty_block_vanishes() {
    assert_eq!(converted("🐍🐍"), "");
}

#[test]
fn block_is_replaced_by_its_output() {
    assert_eq!(converted("🐍print(\"test\")🐍"), "test\n");
}

#[test]
fn literal_text_is_kept() {
    assert_eq!(converted("🐍🐍 and some LaTeX"), " and some LaTeX");
    assert_eq!(converted("Some LaTeX 🐍🐍"), "Some LaTeX ");
}

#[test]
fn adjacent_blocks() {
    assert_eq!(converted("🐍print(\"a\")🐍🐍print(\"b\")🐍"), "a\nb\n");
}

#[test]
fn interleaved_document() {
    let document = "\\section{Result}\n🐍x = 6 * 7🐍The answer is 🐍print(x, end=\"\")🐍.\n";
    assert_eq!(converted(document), "\\section{Result}\nThe answer is 42.\n");
}

#[test]
fn writes_through_sys_stdout_are_captured() {
    assert_eq!(converted("🐍import sys🐍🐍sys.stdout.write(\"X\")🐍"), "X");
}

#[test]
fn document_without_blocks_is_unchanged() {
    let document = "\\documentclass{article}\n\\begin{document}\nHi \u{1F600}\n\\end{document}\n";
    assert_eq!(converted(document), document);
}

#[test]
fn multiline_block() {
    let document = "🐍\nfor i in range(3):\n    print(i)\n🐍done";
    assert_eq!(converted(document), "0\n1\n2\ndone");
}

#[test]
fn definitions_persist_across_blocks() {
    let document = "🐍def square(n):\n    return n * n\n🐍🐍print(square(12))🐍";
    assert_eq!(converted(document), "144\n");
}

#[test]
fn each_conversion_starts_fresh() {
    let mut converter = Converter::new();
    assert_eq!(converter.convert("🐍x = 1🐍").unwrap(), "");
    let err = converter.convert("🐍print(x)🐍").unwrap_err();
    assert_eq!(err.kind, ExceptionKind::NameError);
    assert_eq!(err.message, "name 'x' is not defined");
}

#[test]
fn failing_block_propagates_its_exception() {
    let err = convert("before 🐍print(\"a\")🐍 🐍1 / 0🐍 after").unwrap_err();
    assert_eq!(err.kind, ExceptionKind::ZeroDivisionError);
    assert_eq!(err.to_string(), "ZeroDivisionError: division by zero");
}

#[test]
fn raised_exception_keeps_its_kind() {
    let err = convert("🐍raise KeyError(\"k\")🐍").unwrap_err();
    assert_eq!(err.kind, ExceptionKind::KeyError);
}

#[test]
fn syntax_error_in_block() {
    let err = convert("🐍print(🐍").unwrap_err();
    assert_eq!(err.kind, ExceptionKind::SyntaxError);
}

#[test]
fn unterminated_block_still_runs() {
    assert_eq!(converted("x 🐍print(1)"), "x 1\n");
}

#[test]
fn converter_reuses_its_executor() {
    let mut converter = Converter::with_executor(Executor::default());
    assert_eq!(converter.convert("🐍print(1)🐍").unwrap(), "1\n");
    assert_eq!(converter.convert("🐍print(2)🐍").unwrap(), "2\n");
}

#[test]
fn segment_listing() {
    let listing = describe_segments("ab🐍x = 1🐍cd🐍y");
    assert_eq!(
        listing,
        "0\tliteral\t0..2\t\"ab\"\n\
         1\texecutable\t6..11\t\"x = 1\"\n\
         2\tliteral\t15..17\t\"cd\"\n\
         3\texecutable\t21..22\t\"y\"\t(unterminated)\n"
    );
}

#[test]
fn default_output_replaces_extension() {
    let options = Options::new(Input::File("notes/report.pytex".into()));
    assert_eq!(options.output, Output::File("notes/report.tex".into()));
    assert_eq!(options.mode, Mode::Convert);

    let options = Options::new(Input::from_arg("-".as_ref()));
    assert_eq!(options.input, Input::Stdin);
    assert_eq!(options.output, Output::Stdout);
}

#[test]
fn driver_writes_converted_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.pytex");
    fs::write(&input, "Total: 🐍print(sum(range(5)), end=\"\")🐍\n").unwrap();

    driver::run(&Options::new(Input::File(input))).unwrap();

    let written = fs::read_to_string(dir.path().join("doc.tex")).unwrap();
    assert_eq!(written, "Total: 10\n");
}

#[test]
fn driver_leaves_output_untouched_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.pytex");
    let output = dir.path().join("doc.tex");
    fs::write(&input, "🐍print(\"partial\")🐍🐍undefined_name🐍").unwrap();
    fs::write(&output, "previous").unwrap();

    let err = driver::run(&Options::new(Input::File(input))).unwrap_err();
    assert!(matches!(err, CliError::Eval(ref e) if e.kind == ExceptionKind::NameError));
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
}

#[test]
fn driver_refuses_to_overwrite_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.tex");
    fs::write(&input, "🐍🐍").unwrap();

    let err = driver::run(&Options::new(Input::File(input.clone()))).unwrap_err();
    assert!(matches!(err, CliError::OutputIsInput { .. }));
    assert_eq!(fs::read_to_string(&input).unwrap(), "🐍🐍");
}

#[test]
fn driver_reports_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.pytex");
    let err = driver::run(&Options::new(Input::File(input))).unwrap_err();
    assert!(matches!(err, CliError::Io { action: "read", .. }));
}

#[test]
fn driver_rejects_invalid_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.pytex");
    fs::write(&input, [0x66, 0x6f, 0xff, 0x6f]).unwrap();
    let err = driver::run(&Options::new(Input::File(input))).unwrap_err();
    assert!(matches!(err, CliError::Utf8 { .. }));
}
