//! Pytex Eval - evaluator for the code blocks embedded in pytex documents.
//!
//! # Architecture
//!
//! - `Executor`: parses a block, runs it and captures its stdout through an
//!   RAII [`Redirect`] guard
//! - `Scopes`: the persistent local/global mappings blocks run in
//! - `interpreter`: tree-walking statement and expression evaluation
//! - `builtins`, `modules`, `methods`: the runtime library
//! - `PrintHandlerImpl`: where `print` output goes (stdout, memory, nowhere)
//!
//! Every failure, from a syntax error to an uncaught `raise`, surfaces as an
//! [`EvalError`] carrying its exception kind and message.

mod builtins;
mod environment;
pub mod errors;
mod executor;
mod format;
mod interpreter;
mod iter;
mod methods;
mod modules;
mod operators;
mod print_handler;
mod subscript;
mod value;

pub use environment::{Namespace, Scopes};
pub use errors::{EvalError, EvalResult, ExceptionKind};
pub use executor::{capture_stdout, Executor, Redirect};
pub use format::format_value;
pub use print_handler::{
    capture_handler, silent_handler, stdout_handler, CaptureBuffer, PrintHandlerImpl,
    SharedPrintHandler,
};
pub use value::{
    float_repr, str_repr, BoundMethod, BuiltinFunction, Dict, ExceptionObject, Function,
    HashKey, ModuleObject, Range, Stream, Value,
};

#[cfg(test)]
mod tests;
