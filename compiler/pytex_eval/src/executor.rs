//! Running code blocks with their standard output captured.
//!
//! [`Executor::run`] swaps the executor's print handler for an in-memory
//! buffer through a [`Redirect`] guard. The guard restores the previous
//! handler when dropped, so the channel is back in place on every exit path,
//! including `?` returns.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::environment::Scopes;
use crate::errors::EvalError;
use crate::interpreter;
use crate::print_handler::{capture_handler, stdout_handler, SharedPrintHandler};

/// Executes pytex source against caller-owned [`Scopes`].
pub struct Executor {
    stdout: SharedPrintHandler,
}

impl Executor {
    /// Executor whose uncaptured output goes to the process stdout.
    pub fn new() -> Self {
        Executor::with_stdout(stdout_handler())
    }

    pub fn with_stdout(stdout: SharedPrintHandler) -> Self {
        Executor { stdout }
    }

    /// The currently active stdout channel.
    pub fn stdout(&self) -> &SharedPrintHandler {
        &self.stdout
    }

    /// Redirect stdout into a fresh buffer until the guard is dropped.
    pub fn redirect(&mut self) -> Redirect<'_> {
        let previous = std::mem::replace(&mut self.stdout, capture_handler());
        Redirect {
            executor: self,
            previous: Some(previous),
        }
    }

    /// Run `source` in `scopes` and return everything it wrote to stdout.
    ///
    /// Bindings persist in `scopes`. On failure the error is returned as
    /// raised and the partial output is discarded.
    #[tracing::instrument(level = "debug", skip_all, fields(source_len = source.len()))]
    pub fn run(&mut self, source: &str, scopes: &Scopes) -> Result<String, EvalError> {
        let redirect = self.redirect();
        redirect.execute(source, scopes)?;
        let output = redirect.take_output();
        tracing::debug!(captured_len = output.len(), "block finished");
        Ok(output)
    }

    /// Run `source` in a fresh mapping used as both local and global scope.
    pub fn run_fresh(&mut self, source: &str) -> Result<String, EvalError> {
        self.run(source, &Scopes::new())
    }

    /// Run `source` writing to the current channel, without capture.
    pub fn execute(&self, source: &str, scopes: &Scopes) -> Result<(), EvalError> {
        let module =
            pytex_parse::parse_module(source).map_err(|err| EvalError::from_parse(&err, source))?;
        interpreter::execute(Arc::clone(&self.stdout), &module, scopes)
    }
}

impl Default for Executor {
    fn default() -> Self {
        Executor::new()
    }
}

/// Guard returned by [`Executor::redirect`].
///
/// Derefs to the executor so code can run while the capture is active.
pub struct Redirect<'a> {
    executor: &'a mut Executor,
    previous: Option<SharedPrintHandler>,
}

impl Redirect<'_> {
    /// Output captured so far, draining the buffer.
    pub fn take_output(&self) -> String {
        self.executor.stdout.take_captured()
    }
}

impl Deref for Redirect<'_> {
    type Target = Executor;

    fn deref(&self) -> &Executor {
        self.executor
    }
}

impl DerefMut for Redirect<'_> {
    fn deref_mut(&mut self) -> &mut Executor {
        self.executor
    }
}

impl Drop for Redirect<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.executor.stdout = previous;
        }
    }
}

/// Run `source` and return its captured stdout.
///
/// With `None` a fresh mapping serves as both local and global scope for
/// this call only.
pub fn capture_stdout(source: &str, scopes: Option<&Scopes>) -> Result<String, EvalError> {
    let mut executor = Executor::new();
    match scopes {
        Some(scopes) => executor.run(source, scopes),
        None => executor.run_fresh(source),
    }
}
