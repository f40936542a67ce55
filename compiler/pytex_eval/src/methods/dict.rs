//! `dict` methods.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::{key_error, no_attribute, type_error, value_error, EvalResult};
use crate::interpreter::Args;
use crate::iter::{collect, iterate};
use crate::value::Dict;
use crate::Value;

pub(super) fn call(dict: &Rc<RefCell<Dict>>, name: &str, mut args: Args) -> EvalResult {
    match name {
        "keys" => {
            args.expect(name, 0, 0)?;
            Ok(Value::list(dict.borrow().keys()))
        }
        "values" => {
            args.expect(name, 0, 0)?;
            Ok(Value::list(dict.borrow().values()))
        }
        "items" => {
            args.expect(name, 0, 0)?;
            Ok(Value::list(dict.borrow().items()))
        }
        "get" => {
            args.expect(name, 1, 2)?;
            let mut positional = args.positional.into_iter();
            let key = positional.next().unwrap_or(Value::None);
            let default = positional.next().unwrap_or(Value::None);
            Ok(dict.borrow().get(&key)?.unwrap_or(default))
        }
        "pop" => {
            args.expect(name, 1, 2)?;
            let mut positional = args.positional.into_iter();
            let key = positional.next().unwrap_or(Value::None);
            let default = positional.next();
            match (dict.borrow_mut().remove(&key)?, default) {
                (Some(value), _) | (None, Some(value)) => Ok(value),
                (None, None) => Err(key_error(&key)),
            }
        }
        "update" => {
            let keywords = std::mem::take(&mut args.keywords);
            args.expect(name, 0, 1)?;
            if let Some(other) = args.positional.first() {
                update_from(dict, other)?;
            }
            let mut dict = dict.borrow_mut();
            for (key, value) in keywords {
                dict.insert(Value::from(key), value)?;
            }
            Ok(Value::None)
        }
        "setdefault" => {
            args.expect(name, 1, 2)?;
            let mut positional = args.positional.into_iter();
            let key = positional.next().unwrap_or(Value::None);
            let default = positional.next().unwrap_or(Value::None);
            let mut dict = dict.borrow_mut();
            if let Some(existing) = dict.get(&key)? {
                return Ok(existing);
            }
            dict.insert(key, default.clone())?;
            Ok(default)
        }
        "copy" => {
            args.expect(name, 0, 0)?;
            Ok(Value::dict(dict.borrow().clone()))
        }
        "clear" => {
            args.expect(name, 0, 0)?;
            dict.borrow_mut().clear();
            Ok(Value::None)
        }
        _ => Err(no_attribute(&Value::Dict(Rc::clone(dict)), name)),
    }
}

/// Merge a mapping, or an iterable of key/value pairs, into `dict`.
pub(crate) fn update_from(dict: &Rc<RefCell<Dict>>, source: &Value) -> EvalResult<()> {
    let entries: Vec<(Value, Value)> = match source {
        Value::Dict(other) => other
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        _ => {
            let mut entries = Vec::new();
            for (i, pair) in iterate(source)?.enumerate() {
                let items = collect(&pair).map_err(|_| {
                    type_error(format!(
                        "cannot convert dictionary update sequence element #{i} to a sequence"
                    ))
                })?;
                let [key, value]: [Value; 2] = items.try_into().map_err(|items: Vec<Value>| {
                    value_error(format!(
                        "dictionary update sequence element #{i} has length {}; 2 is required",
                        items.len()
                    ))
                })?;
                entries.push((key, value));
            }
            entries
        }
    };
    let mut dict = dict.borrow_mut();
    for (key, value) in entries {
        dict.insert(key, value)?;
    }
    Ok(())
}
