//! Indexing and slicing of sequences and mappings.

use std::rc::Rc;

use crate::errors::{
    index_out_of_range, int_overflow, key_error, type_error, value_error, EvalResult,
};
use crate::iter::collect;
use crate::value::Range;
use crate::Value;

/// Evaluated `lower:upper:step`; any part may be absent.
pub(crate) struct SliceBounds {
    pub(crate) lower: Option<Value>,
    pub(crate) upper: Option<Value>,
    pub(crate) step: Option<Value>,
}

/// Bounds clamped to a sequence length: positions `start + k * step`
/// strictly before `stop`.
struct Clamped {
    start: i64,
    stop: i64,
    step: i64,
}

impl Clamped {
    fn indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut i = self.start;
        while (self.step > 0 && i < self.stop) || (self.step < 0 && i > self.stop) {
            out.push(i as usize);
            match i.checked_add(self.step) {
                Some(next) => i = next,
                None => break,
            }
        }
        out
    }
}

impl SliceBounds {
    fn clamp(&self, len: usize) -> EvalResult<Clamped> {
        let step = match bound(self.step.as_ref())? {
            Some(0) => return Err(value_error("slice step cannot be zero")),
            Some(step) => step,
            None => 1,
        };
        let len = len as i64;
        let (default_start, default_stop) = if step > 0 { (0, len) } else { (len - 1, -1) };
        let adjust = |value: Option<i64>, default: i64| match value {
            None => default,
            Some(i) if i < 0 => {
                let i = i.saturating_add(len);
                if i < 0 {
                    if step < 0 {
                        -1
                    } else {
                        0
                    }
                } else {
                    i
                }
            }
            Some(i) if i >= len => {
                if step < 0 {
                    len - 1
                } else {
                    len
                }
            }
            Some(i) => i,
        };
        Ok(Clamped {
            start: adjust(bound(self.lower.as_ref())?, default_start),
            stop: adjust(bound(self.upper.as_ref())?, default_stop),
            step,
        })
    }
}

fn bound(value: Option<&Value>) -> EvalResult<Option<i64>> {
    match value {
        None | Some(Value::None) => Ok(None),
        Some(value) => value.as_index().map(Some).ok_or_else(|| {
            type_error("slice indices must be integers or None or have an __index__ method")
        }),
    }
}

/// Map a possibly negative index onto `0..len`.
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index + len } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

fn sequence_index(index: &Value, len: usize, type_name: &str) -> EvalResult<usize> {
    let Some(i) = index.as_index() else {
        return Err(type_error(format!(
            "{type_name} indices must be integers or slices, not {}",
            index.type_name()
        )));
    };
    normalize_index(i, len).ok_or_else(|| index_out_of_range(type_name))
}

/// `object[index]`.
pub(crate) fn get_item(object: &Value, index: &Value) -> EvalResult {
    match object {
        Value::List(items) => {
            let items = items.borrow();
            let i = sequence_index(index, items.len(), "list")?;
            Ok(items[i].clone())
        }
        Value::Tuple(items) => {
            let i = sequence_index(index, items.len(), "tuple")?;
            Ok(items[i].clone())
        }
        Value::Str(s) => {
            let len = s.chars().count();
            let i = sequence_index(index, len, "string")?;
            Ok(s.chars().nth(i).map_or(Value::None, |c| Value::from(c.to_string())))
        }
        Value::Range(range) => {
            let i = sequence_index(index, range.len(), "range object")?;
            Ok(Value::Int(range.get(i)))
        }
        Value::Dict(dict) => dict.borrow().get(index)?.ok_or_else(|| key_error(index)),
        _ => Err(type_error(format!(
            "'{}' object is not subscriptable",
            object.type_name()
        ))),
    }
}

/// `object[lower:upper:step]`.
pub(crate) fn get_slice(object: &Value, bounds: &SliceBounds) -> EvalResult {
    match object {
        Value::List(items) => {
            let items = items.borrow();
            let picked = bounds.clamp(items.len())?.indices();
            Ok(Value::list(picked.into_iter().map(|i| items[i].clone()).collect()))
        }
        Value::Tuple(items) => {
            let picked = bounds.clamp(items.len())?.indices();
            Ok(Value::Tuple(picked.into_iter().map(|i| items[i].clone()).collect::<Rc<[Value]>>()))
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let picked = bounds.clamp(chars.len())?.indices();
            Ok(Value::from(picked.into_iter().map(|i| chars[i]).collect::<String>()))
        }
        Value::Range(range) => {
            let clamped = bounds.clamp(range.len())?;
            let count = clamped.indices().len() as i64;
            let step = range.step.checked_mul(clamped.step).ok_or_else(int_overflow)?;
            let start = if count == 0 {
                range.start
            } else {
                range.get(clamped.start as usize)
            };
            let stop = step
                .checked_mul(count)
                .and_then(|span| start.checked_add(span))
                .ok_or_else(int_overflow)?;
            Ok(Value::Range(Range { start, stop, step }))
        }
        _ => Err(type_error(format!(
            "'{}' object is not subscriptable",
            object.type_name()
        ))),
    }
}

/// `object[index] = value`.
pub(crate) fn set_item(object: &Value, index: Value, value: Value) -> EvalResult<()> {
    match object {
        Value::List(items) => {
            let mut items = items.borrow_mut();
            let len = items.len();
            let i = sequence_index(&index, len, "list").map_err(|err| {
                if err.kind == crate::ExceptionKind::IndexError {
                    index_out_of_range("list assignment")
                } else {
                    err
                }
            })?;
            items[i] = value;
            Ok(())
        }
        Value::Dict(dict) => dict.borrow_mut().insert(index, value),
        _ => Err(type_error(format!(
            "'{}' object does not support item assignment",
            object.type_name()
        ))),
    }
}

/// `list[lower:upper:step] = iterable`.
pub(crate) fn set_slice(object: &Value, bounds: &SliceBounds, value: &Value) -> EvalResult<()> {
    let Value::List(items) = object else {
        return Err(type_error(format!(
            "'{}' object does not support item assignment",
            object.type_name()
        )));
    };
    let replacement = collect(value)?;
    let mut items = items.borrow_mut();
    let clamped = bounds.clamp(items.len())?;
    if clamped.step == 1 {
        let start = clamped.start.clamp(0, items.len() as i64) as usize;
        let stop = (clamped.stop.max(clamped.start)).clamp(0, items.len() as i64) as usize;
        items.splice(start..stop, replacement);
        return Ok(());
    }
    let picked = clamped.indices();
    if picked.len() != replacement.len() {
        return Err(value_error(format!(
            "attempt to assign sequence of size {} to extended slice of size {}",
            replacement.len(),
            picked.len()
        )));
    }
    for (i, item) in picked.into_iter().zip(replacement) {
        items[i] = item;
    }
    Ok(())
}
