//! Attribute access and built-in method dispatch.
//!
//! The set of receiver types is fixed, so dispatch is a match on the
//! receiver followed by a match on the method name.
//!
//! - [`string`]: methods on `str`
//! - [`list`]: methods on `list`, plus the sort shared with `sorted()`
//! - [`dict`]: methods on `dict`, plus pair-sequence loading shared with `dict()`

mod dict;
mod list;
mod string;

use std::rc::Rc;

use crate::errors::{no_attribute, type_error, EvalResult};
use crate::interpreter::{Args, Interpreter};
use crate::value::{BoundMethod, Stream};
use crate::Value;

pub(crate) use dict::update_from;
pub(crate) use list::sort_values;

const STR_METHODS: &[&str] = &[
    "upper",
    "lower",
    "strip",
    "lstrip",
    "rstrip",
    "split",
    "join",
    "replace",
    "startswith",
    "endswith",
    "find",
    "count",
    "format",
    "capitalize",
    "title",
    "center",
    "ljust",
    "rjust",
    "zfill",
    "splitlines",
    "isdigit",
    "isalpha",
];

const LIST_METHODS: &[&str] = &[
    "append", "extend", "insert", "pop", "remove", "index", "count", "reverse", "sort", "copy",
    "clear",
];

const DICT_METHODS: &[&str] = &[
    "keys",
    "values",
    "items",
    "get",
    "pop",
    "update",
    "setdefault",
    "copy",
    "clear",
];

const STREAM_METHODS: &[&str] = &["write", "flush"];

/// `value.name`.
pub(crate) fn get_attribute(value: &Value, name: &str) -> EvalResult {
    let methods = match value {
        Value::Str(_) => STR_METHODS,
        Value::List(_) => LIST_METHODS,
        Value::Dict(_) => DICT_METHODS,
        Value::Stream(_) => STREAM_METHODS,
        Value::Module(module) => {
            return module.get(name).ok_or_else(|| no_attribute(value, name));
        }
        Value::Exception(exc) if name == "args" => return Ok(Value::tuple(exc.args.clone())),
        Value::Function(function) if name == "__name__" => return Ok(Value::str(function.name())),
        Value::Builtin(builtin) if name == "__name__" => return Ok(Value::str(builtin.name())),
        Value::ExceptionType(kind) if name == "__name__" => return Ok(Value::str(kind.name())),
        _ => &[],
    };
    methods
        .iter()
        .copied()
        .find(|method| *method == name)
        .map(|method| {
            Value::Method(Rc::new(BoundMethod {
                receiver: value.clone(),
                name: method,
            }))
        })
        .ok_or_else(|| no_attribute(value, name))
}

/// `value.name = new`; only module attributes are assignable.
pub(crate) fn set_attribute(value: &Value, name: &str, new: Value) -> EvalResult<()> {
    match value {
        Value::Module(module) => {
            module.set(name, new);
            Ok(())
        }
        _ => Err(no_attribute(value, name)),
    }
}

/// Call the built-in method `name` on `receiver`.
pub(crate) fn call(
    interpreter: &mut Interpreter,
    receiver: &Value,
    name: &'static str,
    args: Args,
) -> EvalResult {
    match receiver {
        Value::Str(s) => string::call(s, name, args),
        Value::List(items) => list::call(interpreter, items, name, args),
        Value::Dict(dict) => dict::call(dict, name, args),
        Value::Stream(stream) => call_stream(interpreter, *stream, name, args),
        _ => Err(no_attribute(receiver, name)),
    }
}

fn call_stream(
    interpreter: &mut Interpreter,
    stream: Stream,
    name: &str,
    args: Args,
) -> EvalResult {
    match name {
        "write" => {
            let [text] = args.exact::<1>("write")?;
            let Value::Str(text) = text else {
                return Err(type_error(format!(
                    "write() argument must be str, not {}",
                    text.type_name()
                )));
            };
            interpreter.write_stream(stream, &text);
            Ok(Value::Int(text.chars().count() as i64))
        }
        "flush" => {
            args.expect("flush", 0, 0)?;
            Ok(Value::None)
        }
        _ => Err(no_attribute(&Value::Stream(stream), name)),
    }
}

#[cfg(test)]
mod tests;
