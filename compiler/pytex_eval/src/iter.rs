//! Iteration over values for `for` loops, unpacking and builtins.

use crate::errors::{not_iterable, EvalResult};
use crate::value::Range;
use crate::Value;

/// Items of an iterable. Ranges are produced lazily; other containers are
/// snapshotted when iteration starts.
pub(crate) enum ValueIter {
    Range { range: Range, index: usize, len: usize },
    Items(std::vec::IntoIter<Value>),
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            ValueIter::Range { range, index, len } => {
                if *index >= *len {
                    return None;
                }
                let value = range.get(*index);
                *index += 1;
                Some(Value::Int(value))
            }
            ValueIter::Items(items) => items.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self {
            ValueIter::Range { index, len, .. } => len - index,
            ValueIter::Items(items) => items.len(),
        };
        (remaining, Some(remaining))
    }
}

pub(crate) fn iterate(value: &Value) -> EvalResult<ValueIter> {
    let items = match value {
        Value::Range(range) => {
            return Ok(ValueIter::Range {
                range: *range,
                index: 0,
                len: range.len(),
            })
        }
        Value::Str(s) => s.chars().map(|c| Value::from(c.to_string())).collect(),
        Value::List(items) => items.borrow().clone(),
        Value::Tuple(items) => items.to_vec(),
        Value::Dict(dict) => dict.borrow().keys(),
        _ => return Err(not_iterable(value)),
    };
    Ok(ValueIter::Items(items.into_iter()))
}

/// All items of an iterable.
pub(crate) fn collect(value: &Value) -> EvalResult<Vec<Value>> {
    Ok(iterate(value)?.collect())
}
