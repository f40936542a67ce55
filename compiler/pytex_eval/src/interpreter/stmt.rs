//! Statement execution.

use std::rc::Rc;

use pytex_ir::{ExceptHandler, Expr, ImportName, ImportNames, Stmt, StmtKind, Target};
use pytex_stack::ensure_sufficient_stack;

use super::{Flow, Interpreter};
use crate::errors::{type_error, EvalError, ExceptionKind};
use crate::iter::iterate;
use crate::modules;
use crate::value::{ExceptionObject, Function, FunctionCode};
use crate::{EvalResult, Value};

impl Interpreter {
    pub(crate) fn exec_block(&mut self, body: &[Stmt]) -> EvalResult<Flow> {
        for stmt in body {
            let flow = self.exec_stmt(stmt)?;
            if !matches!(flow, Flow::Normal) {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt)).map_err(|err| err.with_span(stmt.span))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval(expr)?;
            }
            StmtKind::Assign { targets, value } => {
                let value = self.eval(value)?;
                for target in targets {
                    self.assign(target, value.clone())?;
                }
            }
            StmtKind::AugAssign { target, op, value } => self.aug_assign(target, *op, value)?,
            StmtKind::Pass | StmtKind::Global(_) => {}
            StmtKind::Break => return Ok(Flow::Break),
            StmtKind::Continue => return Ok(Flow::Continue),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::Raise(exc) => return Err(self.raised(exc.as_ref())?),
            StmtKind::Assert { test, msg } => {
                if !self.eval(test)?.is_truthy() {
                    let message = match msg {
                        Some(msg) => self.eval(msg)?.to_str(),
                        None => String::new(),
                    };
                    return Err(EvalError::new(ExceptionKind::AssertionError, message));
                }
            }
            StmtKind::Import(names) => {
                for name in names {
                    self.import(name)?;
                }
            }
            StmtKind::ImportFrom { module, names } => self.import_from(module, names)?,
            StmtKind::If { test, body, orelse } => {
                return if self.eval(test)?.is_truthy() {
                    self.exec_block(body)
                } else {
                    self.exec_block(orelse)
                };
            }
            StmtKind::While { test, body, orelse } => return self.exec_while(test, body, orelse),
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            } => return self.exec_for(target, iter, body, orelse),
            StmtKind::FunctionDef(def) => {
                let name: Rc<str> = Rc::from(def.name.as_str());
                let function = self.make_function(name, FunctionCode::Def(Rc::clone(def)))?;
                self.store(&def.name, function);
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => return self.exec_try(body, handlers, orelse, finalbody),
        }
        Ok(Flow::Normal)
    }

    /// Build a function value, evaluating parameter defaults now.
    pub(crate) fn make_function(&mut self, name: Rc<str>, code: FunctionCode) -> EvalResult {
        let params = match &code {
            FunctionCode::Def(def) => &def.params,
            FunctionCode::Lambda(lambda) => &lambda.params,
        };
        let mut defaults = Vec::new();
        for param in params {
            if let Some(default) = &param.default {
                defaults.push(self.eval(default)?);
            }
        }
        Ok(Value::Function(Rc::new(Function {
            name,
            code,
            defaults,
            globals: self.frame.globals.clone(),
            enclosing: self.frame.child_enclosing(false),
        })))
    }

    /// The exception a `raise` statement throws.
    fn raised(&mut self, exc: Option<&Expr>) -> EvalResult<EvalError> {
        let Some(exc) = exc else {
            return Ok(self.handling.last().cloned().unwrap_or_else(|| {
                EvalError::new(ExceptionKind::RuntimeError, "No active exception to reraise")
            }));
        };
        let err = match self.eval(exc)? {
            Value::ExceptionType(kind) => EvalError::new(kind, ""),
            Value::Exception(obj) => obj.to_error(),
            _ => type_error("exceptions must derive from BaseException"),
        };
        Ok(err.with_span(exc.span))
    }

    fn exec_while(&mut self, test: &Expr, body: &[Stmt], orelse: &[Stmt]) -> EvalResult<Flow> {
        while self.eval(test)?.is_truthy() {
            match self.exec_block(body)? {
                Flow::Break => return Ok(Flow::Normal),
                flow @ Flow::Return(_) => return Ok(flow),
                Flow::Normal | Flow::Continue => {}
            }
        }
        self.exec_block(orelse)
    }

    fn exec_for(
        &mut self,
        target: &Target,
        iter: &Expr,
        body: &[Stmt],
        orelse: &[Stmt],
    ) -> EvalResult<Flow> {
        let iterable = self.eval(iter)?;
        for item in iterate(&iterable)? {
            self.assign(target, item)?;
            match self.exec_block(body)? {
                Flow::Break => return Ok(Flow::Normal),
                flow @ Flow::Return(_) => return Ok(flow),
                Flow::Normal | Flow::Continue => {}
            }
        }
        self.exec_block(orelse)
    }

    fn exec_try(
        &mut self,
        body: &[Stmt],
        handlers: &[ExceptHandler],
        orelse: &[Stmt],
        finalbody: &[Stmt],
    ) -> EvalResult<Flow> {
        let result = match self.exec_block(body) {
            Ok(Flow::Normal) => self.exec_block(orelse),
            Ok(flow) => Ok(flow),
            Err(err) => self.handle(err, handlers),
        };
        if finalbody.is_empty() {
            return result;
        }
        // A `return`, `break` or new exception in `finally` replaces the
        // pending outcome.
        match self.exec_block(finalbody)? {
            Flow::Normal => result,
            flow => Ok(flow),
        }
    }

    /// Run the first handler matching `err`, or re-raise it.
    fn handle(&mut self, err: EvalError, handlers: &[ExceptHandler]) -> EvalResult<Flow> {
        for handler in handlers {
            if !self.handler_matches(handler, &err)? {
                continue;
            }
            if let Some(name) = &handler.name {
                let exc = Value::Exception(Rc::new(ExceptionObject::from_error(&err)));
                self.store(name, exc);
            }
            self.handling.push(err);
            let result = self.exec_block(&handler.body);
            self.handling.pop();
            if let Some(name) = &handler.name {
                self.frame.delete(name);
            }
            return result;
        }
        Err(err)
    }

    fn handler_matches(&mut self, handler: &ExceptHandler, err: &EvalError) -> EvalResult<bool> {
        let Some(filter) = &handler.kind else {
            return Ok(true);
        };
        let filter = self.eval(filter)?;
        exception_matches(&filter, err.kind)
    }

    fn import(&mut self, name: &ImportName) -> EvalResult<()> {
        let module = modules::import(&name.path).map_err(|err| err.with_span(name.span))?;
        self.store(name.bound_name(), Value::Module(module));
        Ok(())
    }

    fn import_from(&mut self, path: &str, names: &ImportNames) -> EvalResult<()> {
        let module = modules::import(path)?;
        match names {
            ImportNames::Star => {
                for (name, value) in module.public_attrs() {
                    self.store(&name, value);
                }
            }
            ImportNames::List(names) => {
                for name in names {
                    let value = module.get(&name.path).ok_or_else(|| {
                        EvalError::new(
                            ExceptionKind::ImportError,
                            format!("cannot import name '{}' from '{path}'", name.path),
                        )
                        .with_span(name.span)
                    })?;
                    self.store(name.bound_name(), value);
                }
            }
        }
        Ok(())
    }
}

/// Whether an `except` filter (a type or a tuple of types) catches `kind`.
fn exception_matches(filter: &Value, kind: ExceptionKind) -> EvalResult<bool> {
    match filter {
        Value::ExceptionType(base) => Ok(kind.is_subclass_of(*base)),
        Value::Tuple(items) => {
            for item in items.iter() {
                if exception_matches(item, kind)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(type_error(
            "catching classes that do not inherit from BaseException is not allowed",
        )),
    }
}
