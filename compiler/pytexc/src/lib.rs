//! Pytexc - the pytex document converter.
//!
//! [`convert`] turns a hybrid document into plain LaTeX: literal segments
//! are copied through and every code block is replaced by what it printed.
//! All blocks of one document share a single [`Scopes`], so later blocks see
//! the names earlier ones bound.
//!
//! The `pytex` binary wraps this with file handling; see [`driver`].

pub mod driver;
mod error;
pub mod options;

use pytex_eval::{EvalError, Executor, Scopes};
use pytex_segment::{segments, SegmentKind};

pub use error::CliError;
pub use options::{Input, Mode, Options, Output};

/// Runs the code blocks of documents, one fresh environment per document.
#[derive(Default)]
pub struct Converter {
    executor: Executor,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converter whose executor is configured by the caller.
    pub fn with_executor(executor: Executor) -> Self {
        Converter { executor }
    }

    /// Convert `document`, failing with the first code block's error.
    #[tracing::instrument(level = "debug", skip_all, fields(document_len = document.len()))]
    pub fn convert(&mut self, document: &str) -> Result<String, EvalError> {
        let scopes = Scopes::new();
        let mut out = String::with_capacity(document.len());
        let mut blocks = 0usize;
        for segment in segments(document) {
            match segment.kind() {
                SegmentKind::Literal => out.push_str(segment.text()),
                SegmentKind::Executable => {
                    blocks += 1;
                    let output = self
                        .executor
                        .run(segment.text(), &scopes)
                        .inspect_err(|err| {
                            let block_line = segment.span().line_in(document);
                            let line = err
                                .line_in(segment.text())
                                .map_or(block_line, |line| block_line + line - 1);
                            tracing::debug!(block = blocks, line, %err, "code block failed");
                        })?;
                    out.push_str(&output);
                }
            }
        }
        tracing::debug!(blocks, output_len = out.len(), "converted document");
        Ok(out)
    }
}

/// Convert `document` with a fresh [`Converter`].
pub fn convert(document: &str) -> Result<String, EvalError> {
    Converter::new().convert(document)
}

#[cfg(test)]
mod tests;
