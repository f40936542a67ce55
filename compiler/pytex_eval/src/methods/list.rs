//! `list` methods and the stable sort shared with `sorted()`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::{
    index_out_of_range, no_attribute, type_error, value_error, EvalError, EvalResult, ExceptionKind,
};
use crate::interpreter::{Args, Interpreter};
use crate::iter::collect;
use crate::operators::less_than;
use crate::subscript::normalize_index;
use crate::Value;

pub(super) fn call(
    interpreter: &mut Interpreter,
    list: &Rc<RefCell<Vec<Value>>>,
    name: &str,
    mut args: Args,
) -> EvalResult {
    match name {
        "append" => {
            let [item] = args.exact::<1>(name)?;
            list.borrow_mut().push(item);
            Ok(Value::None)
        }
        "extend" => {
            let [iterable] = args.exact::<1>(name)?;
            let items = collect(&iterable)?;
            list.borrow_mut().extend(items);
            Ok(Value::None)
        }
        "insert" => {
            let [index, item] = args.exact::<2>(name)?;
            let index = index
                .as_index()
                .ok_or_else(|| type_error("'index' must be an integer"))?;
            let mut items = list.borrow_mut();
            let len = items.len() as i64;
            let position = if index < 0 {
                (index + len).max(0)
            } else {
                index.min(len)
            };
            items.insert(position as usize, item);
            Ok(Value::None)
        }
        "pop" => {
            args.expect(name, 0, 1)?;
            let mut items = list.borrow_mut();
            if items.is_empty() {
                return Err(EvalError::new(
                    ExceptionKind::IndexError,
                    "pop from empty list",
                ));
            }
            let index = match args.positional.first() {
                Some(index) => index
                    .as_index()
                    .ok_or_else(|| type_error("'index' must be an integer"))?,
                None => -1,
            };
            let index = normalize_index(index, items.len()).ok_or_else(|| index_out_of_range("pop"))?;
            Ok(items.remove(index))
        }
        "remove" => {
            let [item] = args.exact::<1>(name)?;
            let mut items = list.borrow_mut();
            let index = position(&items, &item)
                .ok_or_else(|| value_error("list.remove(x): x not in list"))?;
            items.remove(index);
            Ok(Value::None)
        }
        "index" => {
            let [item] = args.exact::<1>(name)?;
            let index = position(&list.borrow(), &item)
                .ok_or_else(|| value_error(format!("{} is not in list", item.repr())))?;
            Ok(Value::Int(index as i64))
        }
        "count" => {
            let [item] = args.exact::<1>(name)?;
            let count = list.borrow().iter().filter(|x| x.py_eq(&item)).count();
            Ok(Value::Int(count as i64))
        }
        "reverse" => {
            args.expect(name, 0, 0)?;
            list.borrow_mut().reverse();
            Ok(Value::None)
        }
        "sort" => {
            let key = args.take_keyword("key");
            let reverse = args.take_keyword("reverse");
            args.expect(name, 0, 0)?;
            let reverse = reverse.is_some_and(|value| value.is_truthy());
            // The list reads as empty while key functions run.
            let items = std::mem::take(&mut *list.borrow_mut());
            match sort_values(interpreter, items.clone(), key.as_ref(), reverse) {
                Ok(sorted) => {
                    *list.borrow_mut() = sorted;
                    Ok(Value::None)
                }
                Err(err) => {
                    *list.borrow_mut() = items;
                    Err(err)
                }
            }
        }
        "copy" => {
            args.expect(name, 0, 0)?;
            Ok(Value::list(list.borrow().clone()))
        }
        "clear" => {
            args.expect(name, 0, 0)?;
            list.borrow_mut().clear();
            Ok(Value::None)
        }
        _ => Err(no_attribute(&Value::List(Rc::clone(list)), name)),
    }
}

fn position(items: &[Value], item: &Value) -> Option<usize> {
    items.iter().position(|x| x.is_same(item) || x.py_eq(item))
}

/// Stable sort by `key(item)` (or the item itself) using only `<`.
pub(crate) fn sort_values(
    interpreter: &mut Interpreter,
    items: Vec<Value>,
    key: Option<&Value>,
    reverse: bool,
) -> EvalResult<Vec<Value>> {
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        let sort_key = match key {
            Some(Value::None) | None => item.clone(),
            Some(key) => interpreter.call(key, Args::new(vec![item.clone()]))?,
        };
        keyed.push((sort_key, item));
    }
    let mut less = |a: &(Value, Value), b: &(Value, Value)| {
        if reverse {
            less_than(&b.0, &a.0)
        } else {
            less_than(&a.0, &b.0)
        }
    };
    let sorted = merge_sort(keyed, &mut less)?;
    Ok(sorted.into_iter().map(|(_, item)| item).collect())
}

fn merge_sort<T>(
    mut items: Vec<T>,
    less: &mut impl FnMut(&T, &T) -> EvalResult<bool>,
) -> EvalResult<Vec<T>> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, less)?;
    let right = merge_sort(right, less)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        // Take from the right only when strictly smaller, keeping ties stable.
        let next = if less(r, l)? { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}
