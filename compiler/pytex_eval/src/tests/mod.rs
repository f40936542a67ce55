//! Whole-block tests: source text in, captured stdout or error out.

mod language_tests;

use crate::{capture_stdout, EvalError};

fn run(source: &str) -> String {
    match capture_stdout(source, None) {
        Ok(output) => output,
        Err(err) => panic!("block failed with {err}:\n{source}"),
    }
}

fn fail(source: &str) -> EvalError {
    match capture_stdout(source, None) {
        Ok(output) => panic!("block succeeded with output {output:?}:\n{source}"),
        Err(err) => err,
    }
}
