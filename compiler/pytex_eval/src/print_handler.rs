//! Destinations for text written to standard output by evaluated code.
//!
//! `print(...)` and `sys.stdout.write(...)` both end up in
//! [`PrintHandlerImpl::write`] on the interpreter's active handler. The
//! executor installs a capturing handler while a block runs and drains it
//! afterwards; outside of that, text goes to the real stdout.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

/// In-memory sink for one redirected block.
#[derive(Default)]
pub struct CaptureBuffer {
    text: Mutex<String>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, text: &str) {
        self.text.lock().push_str(text);
    }

    /// Copy of everything written so far.
    pub fn captured(&self) -> String {
        self.text.lock().clone()
    }

    /// Move the text out, leaving the buffer empty.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.text.lock())
    }
}

/// Where stdout text goes, dispatched by enum.
pub enum PrintHandlerImpl {
    /// The process's standard output.
    Stdout,
    /// Captured in memory.
    Capture(CaptureBuffer),
    /// Dropped.
    Silent,
}

impl PrintHandlerImpl {
    pub fn write(&self, text: &str) {
        match self {
            Self::Stdout => {
                // A closed stdout is not the evaluated code's problem.
                let _ = std::io::stdout().lock().write_all(text.as_bytes());
            }
            Self::Capture(buffer) => buffer.write(text),
            Self::Silent => {}
        }
    }

    /// Captured text; empty for handlers that don't capture.
    pub fn captured(&self) -> String {
        match self {
            Self::Capture(buffer) => buffer.captured(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    /// Captured text, draining the buffer.
    pub fn take_captured(&self) -> String {
        match self {
            Self::Capture(buffer) => buffer.take(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capture(_))
    }
}

/// Handle shared between the executor and the interpreter it runs.
pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stdout)
}

pub fn capture_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Capture(CaptureBuffer::new()))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}

#[cfg(test)]
mod tests;
