//! Built-in functions and the names every block can see without importing.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::{
    int_overflow, type_error, value_error, wrong_arg_count, EvalError, EvalResult, ExceptionKind,
};
use crate::format::format_value;
use crate::interpreter::{Args, Interpreter};
use crate::iter::{collect, iterate};
use crate::methods::{sort_values, update_from};
use crate::operators::{binary, less_than};
use crate::value::{BuiltinFunction, Dict, Range, Stream};
use crate::Value;
use pytex_ir::BinaryOp;

macro_rules! builtin {
    ($name:literal, $func:ident) => {
        BuiltinFunction {
            name: $name,
            func: $func,
        }
    };
}

static BUILTINS: &[BuiltinFunction] = &[
    builtin!("print", print),
    builtin!("len", len),
    builtin!("str", str),
    builtin!("repr", repr),
    builtin!("int", int),
    builtin!("float", float),
    builtin!("bool", bool),
    builtin!("list", list),
    builtin!("tuple", tuple),
    builtin!("dict", dict),
    builtin!("range", range),
    builtin!("abs", abs),
    builtin!("min", min),
    builtin!("max", max),
    builtin!("sum", sum),
    builtin!("round", round),
    builtin!("sorted", sorted),
    builtin!("reversed", reversed),
    builtin!("enumerate", enumerate),
    builtin!("zip", zip),
    builtin!("any", any),
    builtin!("all", all),
    builtin!("chr", chr),
    builtin!("ord", ord),
    builtin!("format", format),
];

/// Resolve a builtin name: a function or an exception type.
pub(crate) fn lookup(name: &str) -> Option<Value> {
    BUILTINS
        .iter()
        .find(|builtin| builtin.name == name)
        .map(Value::Builtin)
        .or_else(|| ExceptionKind::from_name(name).map(Value::ExceptionType))
}

fn print(interpreter: &mut Interpreter, mut args: Args) -> EvalResult {
    let sep = text_option(args.take_keyword("sep"), "sep", " ")?;
    let end = text_option(args.take_keyword("end"), "end", "\n")?;
    let file = args.take_keyword("file");
    args.take_keyword("flush");
    args.no_keywords("print")?;

    let mut text = String::new();
    for (i, value) in args.positional.iter().enumerate() {
        if i > 0 {
            text.push_str(&sep);
        }
        text.push_str(&value.to_str());
    }
    text.push_str(&end);

    let stream = match file {
        None | Some(Value::None) => Stream::Stdout,
        Some(Value::Stream(stream)) => stream,
        Some(other) => {
            return Err(EvalError::new(
                ExceptionKind::AttributeError,
                format!("'{}' object has no attribute 'write'", other.type_name()),
            ))
        }
    };
    interpreter.write_stream(stream, &text);
    Ok(Value::None)
}

fn text_option(value: Option<Value>, name: &str, default: &str) -> EvalResult<String> {
    match value {
        None | Some(Value::None) => Ok(default.to_owned()),
        Some(Value::Str(s)) => Ok(s.to_string()),
        Some(other) => Err(type_error(format!(
            "{name} must be None or a string, not {}",
            other.type_name()
        ))),
    }
}

fn len(_: &mut Interpreter, args: Args) -> EvalResult {
    let [value] = args.exact::<1>("len")?;
    let len = match &value {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.borrow().len(),
        Value::Tuple(items) => items.len(),
        Value::Dict(dict) => dict.borrow().len(),
        Value::Range(range) => range.len(),
        _ => {
            return Err(type_error(format!(
                "object of type '{}' has no len()",
                value.type_name()
            )))
        }
    };
    i64::try_from(len).map(Value::Int).map_err(|_| int_overflow())
}

fn str(_: &mut Interpreter, args: Args) -> EvalResult {
    args.expect("str", 0, 1)?;
    Ok(args
        .positional
        .first()
        .map_or_else(|| Value::str(""), |value| Value::from(value.to_str())))
}

fn repr(_: &mut Interpreter, args: Args) -> EvalResult {
    let [value] = args.exact::<1>("repr")?;
    Ok(Value::from(value.repr()))
}

fn int(_: &mut Interpreter, mut args: Args) -> EvalResult {
    let base = args.take_keyword("base");
    args.expect("int", 0, 2)?;
    let mut positional = args.positional.into_iter();
    let Some(value) = positional.next() else {
        return Ok(Value::Int(0));
    };
    let base = base.or_else(|| positional.next());
    if let Some(base) = base {
        let Value::Str(text) = &value else {
            return Err(type_error("int() can't convert non-string with explicit base"));
        };
        let base = base
            .as_index()
            .filter(|base| *base == 0 || (2..=36).contains(base))
            .ok_or_else(|| value_error("int() base must be >= 2 and <= 36, or 0"))?;
        return parse_int(text, base as u32).map(Value::Int);
    }
    match &value {
        Value::Int(_) | Value::Bool(_) => Ok(Value::Int(value.as_index().unwrap_or(0))),
        Value::Float(f) => float_to_int(f.trunc()).map(Value::Int),
        Value::Str(text) => parse_int(text, 10).map(Value::Int),
        _ => Err(type_error(format!(
            "int() argument must be a string or a real number, not '{}'",
            value.type_name()
        ))),
    }
}

/// Convert an integral float to `int`.
pub(crate) fn float_to_int(f: f64) -> EvalResult<i64> {
    if f.is_nan() {
        return Err(value_error("cannot convert float NaN to integer"));
    }
    if f.is_infinite() {
        return Err(EvalError::new(
            ExceptionKind::OverflowError,
            "cannot convert float infinity to integer",
        ));
    }
    if !crate::value::int_float_eq(f as i64, f) {
        return Err(int_overflow());
    }
    Ok(f as i64)
}

/// Integer literal text with optional sign, underscores and, for base 0 or
/// a matching base, a `0x`/`0o`/`0b` prefix.
fn parse_int(text: &str, base: u32) -> EvalResult<i64> {
    let invalid = || {
        value_error(format!(
            "invalid literal for int() with base {base}: {}",
            crate::value::str_repr(text)
        ))
    };
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let lower = unsigned.to_ascii_lowercase();
    let (base, digits) = match (base, lower.get(..2)) {
        (0 | 16, Some("0x")) => (16, &unsigned[2..]),
        (0 | 8, Some("0o")) => (8, &unsigned[2..]),
        (0 | 2, Some("0b")) => (2, &unsigned[2..]),
        (0, _) => (10, unsigned),
        (base, _) => (base, unsigned),
    };
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return Err(invalid());
    }
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    let magnitude = u64::from_str_radix(&cleaned, base).map_err(|err| {
        if matches!(err.kind(), std::num::IntErrorKind::PosOverflow) {
            int_overflow()
        } else {
            invalid()
        }
    })?;
    let value = if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    };
    value.ok_or_else(int_overflow)
}

fn float(_: &mut Interpreter, args: Args) -> EvalResult {
    args.expect("float", 0, 1)?;
    let Some(value) = args.positional.first() else {
        return Ok(Value::Float(0.0));
    };
    match value {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(_) | Value::Bool(_) => Ok(Value::Float(value.as_f64().unwrap_or(0.0))),
        Value::Str(text) => parse_float(text).map(Value::Float),
        _ => Err(type_error(format!(
            "float() argument must be a string or a real number, not '{}'",
            value.type_name()
        ))),
    }
}

fn parse_float(text: &str) -> EvalResult<f64> {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();
    let unsigned = lower.trim_start_matches(['+', '-']);
    let special = match unsigned {
        "inf" | "infinity" => Some(f64::INFINITY),
        "nan" => Some(f64::NAN),
        _ => None,
    };
    if let Some(special) = special {
        return Ok(if lower.starts_with('-') { -special } else { special });
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != '_').collect();
    let valid = !trimmed.contains("__")
        && !cleaned.is_empty()
        && cleaned.chars().all(|c| c.is_ascii_digit() || "+-.eE".contains(c));
    valid
        .then(|| cleaned.parse::<f64>().ok())
        .flatten()
        .ok_or_else(|| {
            value_error(format!(
                "could not convert string to float: {}",
                crate::value::str_repr(text)
            ))
        })
}

fn bool(_: &mut Interpreter, args: Args) -> EvalResult {
    args.expect("bool", 0, 1)?;
    Ok(Value::Bool(
        args.positional.first().is_some_and(Value::is_truthy),
    ))
}

fn list(_: &mut Interpreter, args: Args) -> EvalResult {
    args.expect("list", 0, 1)?;
    match args.positional.first() {
        Some(iterable) => Ok(Value::list(collect(iterable)?)),
        None => Ok(Value::list(Vec::new())),
    }
}

fn tuple(_: &mut Interpreter, args: Args) -> EvalResult {
    args.expect("tuple", 0, 1)?;
    match args.positional.first() {
        Some(Value::Tuple(items)) => Ok(Value::Tuple(Rc::clone(items))),
        Some(iterable) => Ok(Value::tuple(collect(iterable)?)),
        None => Ok(Value::tuple(Vec::new())),
    }
}

fn dict(_: &mut Interpreter, mut args: Args) -> EvalResult {
    let keywords = std::mem::take(&mut args.keywords);
    args.expect("dict", 0, 1)?;
    let dict = Rc::new(RefCell::new(Dict::new()));
    if let Some(source) = args.positional.first() {
        update_from(&dict, source)?;
    }
    for (key, value) in keywords {
        dict.borrow_mut().insert(Value::from(key), value)?;
    }
    Ok(Value::Dict(dict))
}

fn range(_: &mut Interpreter, args: Args) -> EvalResult {
    args.expect("range", 1, 3)?;
    let mut bounds = Vec::with_capacity(3);
    for value in &args.positional {
        bounds.push(value.as_index().ok_or_else(|| {
            type_error(format!(
                "'{}' object cannot be interpreted as an integer",
                value.type_name()
            ))
        })?);
    }
    let (start, stop, step) = match bounds.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Err(wrong_arg_count("range", 1, 3, bounds.len())),
    };
    if step == 0 {
        return Err(value_error("range() arg 3 must not be zero"));
    }
    Ok(Value::Range(Range { start, stop, step }))
}

fn abs(_: &mut Interpreter, args: Args) -> EvalResult {
    let [value] = args.exact::<1>("abs")?;
    match &value {
        Value::Float(f) => Ok(Value::Float(f.abs())),
        _ => match value.as_index() {
            Some(n) => n.checked_abs().map(Value::Int).ok_or_else(int_overflow),
            None => Err(type_error(format!(
                "bad operand type for abs(): '{}'",
                value.type_name()
            ))),
        },
    }
}

fn min(interpreter: &mut Interpreter, args: Args) -> EvalResult {
    extremum(interpreter, args, "min", false)
}

fn max(interpreter: &mut Interpreter, args: Args) -> EvalResult {
    extremum(interpreter, args, "max", true)
}

/// `min`/`max`: first of the smallest (largest) items by `key`.
fn extremum(interpreter: &mut Interpreter, mut args: Args, name: &str, largest: bool) -> EvalResult {
    let key = args.take_keyword("key").filter(|key| !matches!(key, Value::None));
    let default = args.take_keyword("default");
    args.expect(name, 1, usize::MAX)?;
    let items = if args.positional.len() == 1 {
        collect(&args.positional[0])?
    } else {
        if default.is_some() {
            return Err(type_error(format!(
                "Cannot specify a default for {name}() with multiple positional arguments"
            )));
        }
        args.positional
    };

    let mut best: Option<(Value, Value)> = None;
    for item in items {
        let item_key = match &key {
            Some(key) => interpreter.call(key, Args::new(vec![item.clone()]))?,
            None => item.clone(),
        };
        let replace = match &best {
            None => true,
            Some((best_key, _)) if largest => less_than(best_key, &item_key)?,
            Some((best_key, _)) => less_than(&item_key, best_key)?,
        };
        if replace {
            best = Some((item_key, item));
        }
    }
    match (best, default) {
        (Some((_, item)), _) => Ok(item),
        (None, Some(default)) => Ok(default),
        (None, None) => Err(value_error(format!("{name}() iterable argument is empty"))),
    }
}

fn sum(_: &mut Interpreter, mut args: Args) -> EvalResult {
    let start = args.take_keyword("start");
    args.expect("sum", 1, 2)?;
    let mut positional = args.positional.into_iter();
    let iterable = positional.next().unwrap_or(Value::None);
    let mut total = start.or_else(|| positional.next()).unwrap_or(Value::Int(0));
    if matches!(total, Value::Str(_)) {
        return Err(type_error(
            "sum() can't sum strings [use ''.join(seq) instead]",
        ));
    }
    for item in iterate(&iterable)? {
        total = binary(BinaryOp::Add, &total, &item)?;
    }
    Ok(total)
}

fn round(_: &mut Interpreter, mut args: Args) -> EvalResult {
    let ndigits = args.take_keyword("ndigits");
    args.expect("round", 1, 2)?;
    let mut positional = args.positional.into_iter();
    let number = positional.next().unwrap_or(Value::None);
    let ndigits = ndigits.or_else(|| positional.next()).filter(|n| !matches!(n, Value::None));
    let ndigits = match ndigits {
        Some(n) => Some(n.as_index().ok_or_else(|| {
            type_error(format!(
                "'{}' object cannot be interpreted as an integer",
                n.type_name()
            ))
        })?),
        None => None,
    };
    match (&number, ndigits) {
        (Value::Float(f), None) => float_to_int(f.round_ties_even()).map(Value::Int),
        (Value::Float(f), Some(digits)) => Ok(Value::Float(round_float(*f, digits))),
        (_, digits) => {
            let Some(n) = number.as_index() else {
                return Err(type_error(format!(
                    "type {} doesn't define __round__ method",
                    number.type_name()
                )));
            };
            match digits {
                Some(digits) if digits < 0 => Ok(Value::Int(round_int(n, digits))),
                _ => Ok(Value::Int(n)),
            }
        }
    }
}

/// Round to `digits` decimal places using the float's exact decimal value,
/// so `round(2.675, 2)` is `2.67` (the stored value is below the tie).
fn round_float(f: f64, digits: i64) -> f64 {
    if !f.is_finite() {
        return f;
    }
    if digits >= 0 {
        // No finite float has more decimal places that can change.
        if digits > 323 {
            return f;
        }
        let text = format!("{f:.*}", digits as usize);
        return text.parse().unwrap_or(f);
    }
    if digits < -308 {
        return 0.0 * f.signum();
    }
    let scale = 10f64.powi(digits.unsigned_abs() as i32);
    let rounded = (f / scale).round_ties_even() * scale;
    if rounded.is_finite() {
        rounded
    } else {
        f
    }
}

/// Round to a negative number of digits, ties to even.
fn round_int(n: i64, digits: i64) -> i64 {
    let Some(scale) = u32::try_from(-digits).ok().and_then(|d| 10i64.checked_pow(d)) else {
        return 0;
    };
    let quotient = n.div_euclid(scale);
    let remainder = n.rem_euclid(scale);
    let twice = i128::from(remainder) * 2;
    let round_up = twice > i128::from(scale) || (twice == i128::from(scale) && quotient % 2 != 0);
    let quotient = if round_up { quotient + 1 } else { quotient };
    quotient.saturating_mul(scale)
}

fn sorted(interpreter: &mut Interpreter, mut args: Args) -> EvalResult {
    let key = args.take_keyword("key");
    let reverse = args.take_keyword("reverse").is_some_and(|value| value.is_truthy());
    let [iterable] = args.exact::<1>("sorted")?;
    let items = collect(&iterable)?;
    Ok(Value::list(sort_values(interpreter, items, key.as_ref(), reverse)?))
}

fn reversed(_: &mut Interpreter, args: Args) -> EvalResult {
    let [sequence] = args.exact::<1>("reversed")?;
    if matches!(sequence, Value::Dict(_)) {
        return Err(type_error("'dict' object is not reversible"));
    }
    let mut items = collect(&sequence)?;
    items.reverse();
    Ok(Value::list(items))
}

fn enumerate(_: &mut Interpreter, mut args: Args) -> EvalResult {
    let start = args.take_keyword("start");
    args.expect("enumerate", 1, 2)?;
    let mut positional = args.positional.into_iter();
    let iterable = positional.next().unwrap_or(Value::None);
    let start = match start.or_else(|| positional.next()) {
        Some(start) => start.as_index().ok_or_else(|| {
            type_error(format!(
                "'{}' object cannot be interpreted as an integer",
                start.type_name()
            ))
        })?,
        None => 0,
    };
    let mut pairs = Vec::new();
    let mut index = start;
    for item in iterate(&iterable)? {
        pairs.push(Value::tuple(vec![Value::Int(index), item]));
        index = index.checked_add(1).ok_or_else(int_overflow)?;
    }
    Ok(Value::list(pairs))
}

fn zip(_: &mut Interpreter, args: Args) -> EvalResult {
    args.no_keywords("zip")?;
    let columns = args
        .positional
        .iter()
        .map(collect)
        .collect::<EvalResult<Vec<_>>>()?;
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
    let zipped = (0..rows)
        .map(|row| Value::tuple(columns.iter().map(|column| column[row].clone()).collect()))
        .collect();
    Ok(Value::list(zipped))
}

fn any(_: &mut Interpreter, args: Args) -> EvalResult {
    let [iterable] = args.exact::<1>("any")?;
    Ok(Value::Bool(iterate(&iterable)?.any(|item| item.is_truthy())))
}

fn all(_: &mut Interpreter, args: Args) -> EvalResult {
    let [iterable] = args.exact::<1>("all")?;
    Ok(Value::Bool(iterate(&iterable)?.all(|item| item.is_truthy())))
}

fn chr(_: &mut Interpreter, args: Args) -> EvalResult {
    let [code] = args.exact::<1>("chr")?;
    let code = code.as_index().ok_or_else(|| {
        type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            code.type_name()
        ))
    })?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|c| Value::from(c.to_string()))
        .ok_or_else(|| value_error("chr() arg not in range(0x110000)"))
}

fn ord(_: &mut Interpreter, args: Args) -> EvalResult {
    let [text] = args.exact::<1>("ord")?;
    let Value::Str(s) = &text else {
        return Err(type_error(format!(
            "ord() expected string of length 1, but {} found",
            text.type_name()
        )));
    };
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Int(i64::from(u32::from(c)))),
        _ => Err(type_error(format!(
            "ord() expected a character, but string of length {} found",
            s.chars().count()
        ))),
    }
}

fn format(_: &mut Interpreter, args: Args) -> EvalResult {
    args.expect("format", 1, 2)?;
    let spec = match args.positional.get(1) {
        None => String::new(),
        Some(Value::Str(spec)) => spec.to_string(),
        Some(other) => {
            return Err(type_error(format!(
                "format() argument 2 must be str, not {}",
                other.type_name()
            )))
        }
    };
    Ok(Value::from(format_value(&args.positional[0], &spec)?))
}
