//! Tree-walking interpreter for parsed code blocks.
//!
//! One `Interpreter` lives for the duration of one block. Everything that must
//! outlive it (bindings, functions, imported modules) lives in the
//! [`Scopes`] it was given or in values reachable from them.

mod call;
mod expr;
mod frame_guard;
mod stmt;
mod target;

use std::rc::Rc;

use pytex_ir::{FunctionDef, Module};

use crate::builtins;
use crate::environment::{Namespace, Scopes};
use crate::errors::{type_error, undefined_name, unbound_local, unexpected_keyword, EvalError};
use crate::print_handler::SharedPrintHandler;
use crate::value::Stream;
use crate::{EvalResult, Value};

/// Maximum nesting of function calls and comprehensions.
pub(crate) const MAX_CALL_DEPTH: usize = 1000;

/// Run a parsed block at top level in `scopes`.
pub(crate) fn execute(stdout: SharedPrintHandler, module: &Module, scopes: &Scopes) -> EvalResult<()> {
    let mut interpreter = Interpreter::new(stdout, Frame::module(scopes));
    interpreter.exec_block(&module.body)?;
    Ok(())
}

pub(crate) struct Interpreter {
    frame: Frame,
    depth: usize,
    stdout: SharedPrintHandler,
    /// Exceptions whose `except` clause is running, innermost last.
    handling: Vec<EvalError>,
}

/// How a statement finished.
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

pub(crate) struct Frame {
    kind: FrameKind,
    locals: Namespace,
    globals: Namespace,
    /// Enclosing function scopes, outermost first.
    enclosing: Rc<[Namespace]>,
}

enum FrameKind {
    Module,
    Function(Rc<FunctionDef>),
    Lambda,
    Comprehension,
}

impl Frame {
    fn module(scopes: &Scopes) -> Self {
        Frame {
            kind: FrameKind::Module,
            locals: scopes.local().clone(),
            globals: scopes.global().clone(),
            enclosing: Rc::from([]),
        }
    }

    fn comprehension(parent: &Frame) -> Self {
        Frame {
            kind: FrameKind::Comprehension,
            locals: Namespace::new(),
            globals: parent.globals.clone(),
            enclosing: parent.child_enclosing(true),
        }
    }

    /// Scopes visible to a function or comprehension created in this frame.
    ///
    /// Functions defined at top level see only the global mapping;
    /// comprehensions there also see the local one.
    fn child_enclosing(&self, comprehension: bool) -> Rc<[Namespace]> {
        let include_locals = match self.kind {
            FrameKind::Module => comprehension && !self.locals.ptr_eq(&self.globals),
            FrameKind::Function(_) | FrameKind::Lambda | FrameKind::Comprehension => true,
        };
        if include_locals {
            self.enclosing
                .iter()
                .cloned()
                .chain(std::iter::once(self.locals.clone()))
                .collect()
        } else {
            Rc::clone(&self.enclosing)
        }
    }

    fn lookup(&self, name: &str) -> EvalResult {
        match &self.kind {
            FrameKind::Function(def) if def.is_local(name) => {
                return self.locals.get(name).ok_or_else(|| unbound_local(name));
            }
            FrameKind::Function(def) if def.is_global(name) => return self.lookup_global(name),
            FrameKind::Function(_) => {}
            FrameKind::Module | FrameKind::Lambda | FrameKind::Comprehension => {
                if let Some(value) = self.locals.get(name) {
                    return Ok(value);
                }
            }
        }
        for scope in self.enclosing.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Ok(value);
            }
        }
        self.lookup_global(name)
    }

    fn lookup_global(&self, name: &str) -> EvalResult {
        self.globals
            .get(name)
            .or_else(|| builtins::lookup(name))
            .ok_or_else(|| undefined_name(name))
    }

    fn store(&self, name: &str, value: Value) {
        self.namespace_for(name).set(name, value);
    }

    fn delete(&self, name: &str) {
        self.namespace_for(name).remove(name);
    }

    fn namespace_for(&self, name: &str) -> &Namespace {
        match &self.kind {
            FrameKind::Function(def) if def.is_global(name) => &self.globals,
            _ => &self.locals,
        }
    }
}

impl Interpreter {
    fn new(stdout: SharedPrintHandler, frame: Frame) -> Self {
        Interpreter {
            frame,
            depth: 0,
            stdout,
            handling: Vec::new(),
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> EvalResult {
        self.frame.lookup(name)
    }

    pub(crate) fn store(&self, name: &str, value: Value) {
        self.frame.store(name, value);
    }

    /// Write text to a stream object: the active print handler for stdout,
    /// the real process stderr for stderr.
    pub(crate) fn write_stream(&self, stream: Stream, text: &str) {
        match stream {
            Stream::Stdout => self.stdout.write(text),
            Stream::Stderr => eprint!("{text}"),
        }
    }
}

/// Evaluated call arguments.
pub(crate) struct Args {
    pub(crate) positional: Vec<Value>,
    pub(crate) keywords: Vec<(String, Value)>,
}

impl Args {
    pub(crate) fn new(positional: Vec<Value>) -> Self {
        Args {
            positional,
            keywords: Vec::new(),
        }
    }

    /// Remove and return keyword argument `name`.
    pub(crate) fn take_keyword(&mut self, name: &str) -> Option<Value> {
        let index = self.keywords.iter().position(|(key, _)| key == name)?;
        Some(self.keywords.remove(index).1)
    }

    /// Fail on any keyword argument not already taken.
    pub(crate) fn no_keywords(&self, func: &str) -> EvalResult<()> {
        match self.keywords.first() {
            Some((key, _)) => Err(unexpected_keyword(func, key)),
            None => Ok(()),
        }
    }

    /// Check the positional count is within `min..=max` and that no keyword
    /// arguments remain.
    pub(crate) fn expect(&self, func: &str, min: usize, max: usize) -> EvalResult<()> {
        self.no_keywords(func)?;
        let given = self.positional.len();
        if given < min || given > max {
            return Err(crate::errors::wrong_arg_count(func, min, max, given));
        }
        Ok(())
    }

    /// Exactly `N` positional arguments, no keywords.
    pub(crate) fn exact<const N: usize>(self, func: &str) -> EvalResult<[Value; N]> {
        self.expect(func, N, N)?;
        self.positional
            .try_into()
            .map_err(|_| type_error(format!("{func}() argument count mismatch")))
    }
}
