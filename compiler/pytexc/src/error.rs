//! Failures of a `pytex` invocation.

use std::io;
use std::path::PathBuf;

use pytex_eval::EvalError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not valid UTF-8: {source}", path.display())]
    Utf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("refusing to overwrite the input {}; pass --output", path.display())]
    OutputIsInput { path: PathBuf },
    /// A code block failed; displays as `Kind: message`.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl CliError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        CliError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
