//! Calling functions, builtins, bound methods and exception types.

use std::rc::Rc;

use super::{Args, Flow, Frame, FrameKind, Interpreter};
use crate::environment::Namespace;
use crate::errors::{
    missing_arguments, not_callable, type_error, unexpected_keyword, wrong_arg_count, EvalResult,
};
use crate::methods;
use crate::value::{ExceptionObject, Function, FunctionCode};
use crate::Value;

impl Interpreter {
    pub(crate) fn call(&mut self, callee: &Value, args: Args) -> EvalResult {
        match callee {
            Value::Function(function) => self.call_function(function, args),
            Value::Builtin(builtin) => (builtin.func)(self, args),
            Value::Method(method) => methods::call(self, &method.receiver, method.name, args),
            Value::ExceptionType(kind) => {
                args.no_keywords(kind.name())?;
                Ok(Value::Exception(Rc::new(ExceptionObject::new(
                    *kind,
                    args.positional,
                ))))
            }
            _ => Err(not_callable(callee)),
        }
    }

    fn call_function(&mut self, function: &Rc<Function>, args: Args) -> EvalResult {
        let locals = bind_params(function, args)?;
        let kind = match &function.code {
            FunctionCode::Def(def) => FrameKind::Function(Rc::clone(def)),
            FunctionCode::Lambda(_) => FrameKind::Lambda,
        };
        let frame = Frame {
            kind,
            locals,
            globals: function.globals.clone(),
            enclosing: Rc::clone(&function.enclosing),
        };
        let mut guard = self.enter(frame)?;
        match &function.code {
            FunctionCode::Def(def) => match guard.exec_block(&def.body)? {
                Flow::Return(value) => Ok(value),
                Flow::Normal | Flow::Break | Flow::Continue => Ok(Value::None),
            },
            FunctionCode::Lambda(lambda) => guard.eval(&lambda.body),
        }
    }
}

/// Match arguments to parameters, filling in defaults.
fn bind_params(function: &Function, args: Args) -> EvalResult<Namespace> {
    let name = function.name();
    let params = function.params();
    let first_default = params.len() - function.defaults.len();

    if args.positional.len() > params.len() {
        return Err(wrong_arg_count(
            name,
            first_default,
            params.len(),
            args.positional.len(),
        ));
    }

    let mut slots: Vec<Option<Value>> = vec![None; params.len()];
    for (slot, value) in slots.iter_mut().zip(args.positional) {
        *slot = Some(value);
    }
    for (keyword, value) in args.keywords {
        let Some(index) = params.iter().position(|param| param.name == keyword) else {
            return Err(unexpected_keyword(name, &keyword));
        };
        if slots[index].is_some() {
            return Err(type_error(format!(
                "{name}() got multiple values for argument '{keyword}'"
            )));
        }
        slots[index] = Some(value);
    }

    let locals = Namespace::new();
    let mut missing = Vec::new();
    for (index, (param, slot)) in params.iter().zip(slots).enumerate() {
        let value = match slot {
            Some(value) => value,
            None if index >= first_default => function.defaults[index - first_default].clone(),
            None => {
                missing.push(param.name.as_str());
                continue;
            }
        };
        locals.set(param.name.clone(), value);
    }
    if !missing.is_empty() {
        return Err(missing_arguments(name, &missing));
    }
    Ok(locals)
}
