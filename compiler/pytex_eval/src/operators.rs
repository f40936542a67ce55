//! Arithmetic, comparison and membership on values.
//!
//! Integers are 64-bit and checked: results that do not fit raise
//! `OverflowError`. Floor division and modulo round toward negative
//! infinity, so the remainder takes the divisor's sign.

use std::cmp::Ordering;
use std::rc::Rc;

use pytex_ir::{BinaryOp, CmpOp, UnaryOp};

use crate::errors::{
    bad_operand, int_overflow, not_comparable, type_error, unsupported_operands, value_error,
    zero_division, EvalError, EvalResult, ExceptionKind,
};
use crate::Value;

pub(crate) fn unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (UnaryOp::Not, _) => Ok(Value::Bool(!operand.is_truthy())),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, Value::Float(f)) => Ok(Value::Float(*f)),
        (UnaryOp::Neg, _) => match operand.as_index() {
            Some(n) => n.checked_neg().map(Value::Int).ok_or_else(int_overflow),
            None => Err(bad_operand("-", operand)),
        },
        (UnaryOp::Pos, _) => operand
            .as_index()
            .map(Value::Int)
            .ok_or_else(|| bad_operand("+", operand)),
    }
}

pub(crate) fn binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    if let (Some(a), Some(b)) = (left.as_index(), right.as_index()) {
        return int_op(op, a, b);
    }
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return float_op(op, a, b);
    }
    match (op, left, right) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::from(joined))
        }
        (BinaryOp::Add, Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        (BinaryOp::Mul, Value::Str(s), count) | (BinaryOp::Mul, count, Value::Str(s))
            if count.as_index().is_some() =>
        {
            let times = repeat_count(count, s.len())?;
            Ok(Value::from(s.repeat(times)))
        }
        (BinaryOp::Mul, Value::List(items), count) | (BinaryOp::Mul, count, Value::List(items))
            if count.as_index().is_some() =>
        {
            let items = items.borrow();
            let times = repeat_count(count, items.len())?;
            Ok(Value::list(repeat_items(&items, times)))
        }
        (BinaryOp::Mul, Value::Tuple(items), count) | (BinaryOp::Mul, count, Value::Tuple(items))
            if count.as_index().is_some() =>
        {
            let times = repeat_count(count, items.len())?;
            Ok(Value::Tuple(Rc::from(repeat_items(items, times))))
        }
        (BinaryOp::Add, Value::Str(_) | Value::List(_) | Value::Tuple(_), _) => {
            Err(type_error(format!(
                "can only concatenate {} (not \"{}\") to {}",
                left.type_name(),
                right.type_name(),
                left.type_name()
            )))
        }
        _ => Err(unsupported_operands(op.as_symbol(), left, right)),
    }
}

/// Repetition count for `seq * n`; negative counts repeat zero times.
fn repeat_count(count: &Value, item_len: usize) -> EvalResult<usize> {
    let count = usize::try_from(count.as_index().unwrap_or(0).max(0)).map_err(|_| int_overflow())?;
    if item_len.checked_mul(count).is_none() {
        return Err(EvalError::new(
            ExceptionKind::OverflowError,
            "repeated sequence is too long",
        ));
    }
    Ok(count)
}

fn repeat_items(items: &[Value], times: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len() * times);
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    out
}

fn int_op(op: BinaryOp, a: i64, b: i64) -> EvalResult {
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                return Err(zero_division("division by zero"));
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(zero_division("integer division or modulo by zero"));
            }
            floor_div(a, b)
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(zero_division("integer modulo by zero"));
            }
            Some(floor_mod(a, b))
        }
        BinaryOp::Pow => return int_pow(a, b),
    };
    result.map(Value::Int).ok_or_else(int_overflow)
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    // `checked_rem` only fails for `i64::MIN % -1`, which is 0.
    let rem = a.checked_rem(b).unwrap_or(0);
    if rem != 0 && ((rem < 0) != (b < 0)) {
        rem + b
    } else {
        rem
    }
}

fn int_pow(base: i64, exp: i64) -> EvalResult {
    if exp < 0 {
        if base == 0 {
            return Err(zero_division("0.0 cannot be raised to a negative power"));
        }
        return Ok(Value::Float((base as f64).powf(exp as f64)));
    }
    match u32::try_from(exp) {
        Ok(exp) => base.checked_pow(exp).map(Value::Int).ok_or_else(int_overflow),
        Err(_) => match base {
            0 | 1 => Ok(Value::Int(base)),
            -1 => Ok(Value::Int(if exp % 2 == 0 { 1 } else { -1 })),
            _ => Err(int_overflow()),
        },
    }
}

fn float_op(op: BinaryOp, a: f64, b: f64) -> EvalResult {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(zero_division("float division by zero"));
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(zero_division("float floor division by zero"));
            }
            (a / b).floor()
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(zero_division("float modulo"));
            }
            float_mod(a, b)
        }
        BinaryOp::Pow => return float_pow(a, b),
    };
    Ok(Value::Float(result))
}

fn float_mod(a: f64, b: f64) -> f64 {
    let rem = a % b;
    if rem == 0.0 {
        0.0_f64.copysign(b)
    } else if (rem < 0.0) != (b < 0.0) {
        rem + b
    } else {
        rem
    }
}

fn float_pow(base: f64, exp: f64) -> EvalResult {
    if base == 0.0 && exp < 0.0 {
        return Err(zero_division("0.0 cannot be raised to a negative power"));
    }
    if base < 0.0 && exp.fract() != 0.0 && exp.is_finite() {
        return Err(value_error(
            "negative number cannot be raised to a fractional power",
        ));
    }
    let result = base.powf(exp);
    if result.is_infinite() && base.is_finite() && exp.is_finite() {
        return Err(EvalError::new(
            ExceptionKind::OverflowError,
            "(34, 'Numerical result out of range')",
        ));
    }
    Ok(Value::Float(result))
}

/// Evaluate one link of a comparison chain.
pub(crate) fn compare(op: CmpOp, left: &Value, right: &Value) -> EvalResult<bool> {
    match op {
        CmpOp::Eq => Ok(left.py_eq(right)),
        CmpOp::NotEq => Ok(!left.py_eq(right)),
        CmpOp::Is => Ok(left.is_same(right)),
        CmpOp::IsNot => Ok(!left.is_same(right)),
        CmpOp::In => contains(right, left),
        CmpOp::NotIn => Ok(!contains(right, left)?),
        CmpOp::Lt | CmpOp::LtEq | CmpOp::Gt | CmpOp::GtEq => {
            let ordering = partial_order(op.as_symbol(), left, right)?;
            Ok(match (op, ordering) {
                (_, None) => false,
                (CmpOp::Lt, Some(ord)) => ord == Ordering::Less,
                (CmpOp::LtEq, Some(ord)) => ord != Ordering::Greater,
                (CmpOp::Gt, Some(ord)) => ord == Ordering::Greater,
                (_, Some(ord)) => ord != Ordering::Less,
            })
        }
    }
}

/// `left < right`, the only ordering sorting and `min`/`max` use.
pub(crate) fn less_than(left: &Value, right: &Value) -> EvalResult<bool> {
    compare(CmpOp::Lt, left, right)
}

/// Order of two values; `None` when unordered (a NaN is involved).
fn partial_order(symbol: &str, left: &Value, right: &Value) -> EvalResult<Option<Ordering>> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) => sequence_order(symbol, &a.borrow(), &b.borrow()),
        (Value::Tuple(a), Value::Tuple(b)) => sequence_order(symbol, a, b),
        _ => {
            if let (Some(a), Some(b)) = (left.as_index(), right.as_index()) {
                return Ok(Some(a.cmp(&b)));
            }
            match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
                _ => Err(not_comparable(symbol, left, right)),
            }
        }
    }
}

fn sequence_order(symbol: &str, a: &[Value], b: &[Value]) -> EvalResult<Option<Ordering>> {
    for (x, y) in a.iter().zip(b) {
        if !x.py_eq(y) {
            return partial_order(symbol, x, y);
        }
    }
    Ok(Some(a.len().cmp(&b.len())))
}

/// `item in container`.
pub(crate) fn contains(container: &Value, item: &Value) -> EvalResult<bool> {
    match container {
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(&**needle)),
            _ => Err(type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                item.type_name()
            ))),
        },
        Value::List(items) => Ok(items.borrow().iter().any(|x| x.is_same(item) || x.py_eq(item))),
        Value::Tuple(items) => Ok(items.iter().any(|x| x.is_same(item) || x.py_eq(item))),
        Value::Dict(dict) => dict.borrow().contains(item),
        Value::Range(range) => {
            let n = match item {
                Value::Float(f) if crate::value::int_float_eq(*f as i64, *f) => Some(*f as i64),
                Value::Float(_) => None,
                _ => item.as_index(),
            };
            Ok(n.is_some_and(|n| range.contains(n)))
        }
        _ => Err(type_error(format!(
            "argument of type '{}' is not iterable",
            container.type_name()
        ))),
    }
}
