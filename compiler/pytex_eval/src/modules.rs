//! Built-in modules available to `import`: `math` and `sys`.
//!
//! Modules are created once per thread and cached, so attribute assignments
//! such as `math.answer = 42` are visible to later imports.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::builtins::float_to_int;
use crate::errors::{
    int_overflow, module_not_found, type_error, value_error, EvalError, EvalResult, ExceptionKind,
};
use crate::interpreter::{Args, Interpreter};
use crate::value::{BuiltinFunction, ModuleObject, Stream};
use crate::Value;

thread_local! {
    static LOADED: RefCell<FxHashMap<&'static str, Rc<ModuleObject>>> =
        RefCell::new(FxHashMap::default());
}

/// Import the module named by a dotted path.
pub(crate) fn import(path: &str) -> EvalResult<Rc<ModuleObject>> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let name = match head {
        "math" => "math",
        "sys" => "sys",
        _ => return Err(module_not_found(head)),
    };
    if rest.is_some() {
        return Err(EvalError::new(
            ExceptionKind::ModuleNotFoundError,
            format!("No module named '{path}'; '{name}' is not a package"),
        ));
    }
    let module = LOADED.with(|loaded| {
        Rc::clone(
            loaded
                .borrow_mut()
                .entry(name)
                .or_insert_with(|| Rc::new(build(name))),
        )
    });
    tracing::trace!(module = name, "import");
    Ok(module)
}

fn build(name: &'static str) -> ModuleObject {
    let mut attrs = IndexMap::new();
    attrs.insert("__name__".to_owned(), Value::str(name));
    if name == "sys" {
        attrs.insert("stdout".to_owned(), Value::Stream(Stream::Stdout));
        attrs.insert("stderr".to_owned(), Value::Stream(Stream::Stderr));
        attrs.insert(
            "version".to_owned(),
            Value::from(format!("3.12.0 (pytex {})", env!("CARGO_PKG_VERSION"))),
        );
        attrs.insert("maxsize".to_owned(), Value::Int(i64::MAX));
    } else {
        attrs.insert("pi".to_owned(), Value::Float(std::f64::consts::PI));
        attrs.insert("e".to_owned(), Value::Float(std::f64::consts::E));
        attrs.insert("tau".to_owned(), Value::Float(std::f64::consts::TAU));
        attrs.insert("inf".to_owned(), Value::Float(f64::INFINITY));
        attrs.insert("nan".to_owned(), Value::Float(f64::NAN));
        for function in MATH {
            attrs.insert(function.name().to_owned(), Value::Builtin(function));
        }
    }
    ModuleObject::new(name, attrs)
}

macro_rules! math_fn {
    ($name:literal, $func:ident) => {
        BuiltinFunction {
            name: $name,
            func: $func,
        }
    };
}

static MATH: &[BuiltinFunction] = &[
    math_fn!("sqrt", sqrt),
    math_fn!("floor", floor),
    math_fn!("ceil", ceil),
    math_fn!("trunc", trunc),
    math_fn!("fabs", fabs),
    math_fn!("exp", exp),
    math_fn!("log", log),
    math_fn!("log10", log10),
    math_fn!("log2", log2),
    math_fn!("pow", pow),
    math_fn!("sin", sin),
    math_fn!("cos", cos),
    math_fn!("tan", tan),
    math_fn!("asin", asin),
    math_fn!("acos", acos),
    math_fn!("atan", atan),
    math_fn!("atan2", atan2),
    math_fn!("hypot", hypot),
    math_fn!("degrees", degrees),
    math_fn!("radians", radians),
    math_fn!("isnan", isnan),
    math_fn!("isinf", isinf),
    math_fn!("isfinite", isfinite),
    math_fn!("isclose", isclose),
    math_fn!("gcd", gcd),
    math_fn!("factorial", factorial),
];

fn domain_error() -> EvalError {
    value_error("math domain error")
}

fn range_error() -> EvalError {
    EvalError::new(ExceptionKind::OverflowError, "math range error")
}

fn real(value: &Value) -> EvalResult<f64> {
    value.as_f64().ok_or_else(|| {
        type_error(format!(
            "must be real number, not {}",
            value.type_name()
        ))
    })
}

fn integer(value: &Value) -> EvalResult<i64> {
    value.as_index().ok_or_else(|| {
        type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name()
        ))
    })
}

/// Check a libm result against finite inputs: NaN is a domain error and an
/// infinity is a range error.
fn checked(inputs: &[f64], result: f64) -> EvalResult {
    let finite_inputs = inputs.iter().all(|x| x.is_finite());
    if result.is_nan() && !inputs.iter().any(|x| x.is_nan()) {
        return Err(domain_error());
    }
    if result.is_infinite() && finite_inputs {
        return Err(range_error());
    }
    Ok(Value::Float(result))
}

fn unary(args: Args, name: &str, f: fn(f64) -> f64) -> EvalResult {
    let [x] = args.exact::<1>(name)?;
    let x = real(&x)?;
    checked(&[x], f(x))
}

fn sqrt(_: &mut Interpreter, args: Args) -> EvalResult {
    unary(args, "sqrt", f64::sqrt)
}

fn exp(_: &mut Interpreter, args: Args) -> EvalResult {
    unary(args, "exp", f64::exp)
}

fn sin(_: &mut Interpreter, args: Args) -> EvalResult {
    unary(args, "sin", f64::sin)
}

fn cos(_: &mut Interpreter, args: Args) -> EvalResult {
    unary(args, "cos", f64::cos)
}

fn tan(_: &mut Interpreter, args: Args) -> EvalResult {
    unary(args, "tan", f64::tan)
}

fn asin(_: &mut Interpreter, args: Args) -> EvalResult {
    unary(args, "asin", f64::asin)
}

fn acos(_: &mut Interpreter, args: Args) -> EvalResult {
    unary(args, "acos", f64::acos)
}

fn atan(_: &mut Interpreter, args: Args) -> EvalResult {
    unary(args, "atan", f64::atan)
}

fn fabs(_: &mut Interpreter, args: Args) -> EvalResult {
    unary(args, "fabs", f64::abs)
}

fn degrees(_: &mut Interpreter, args: Args) -> EvalResult {
    unary(args, "degrees", f64::to_degrees)
}

fn radians(_: &mut Interpreter, args: Args) -> EvalResult {
    unary(args, "radians", f64::to_radians)
}

fn rounding(args: Args, name: &str, f: fn(f64) -> f64) -> EvalResult {
    let [x] = args.exact::<1>(name)?;
    if let Some(n) = x.as_index() {
        return Ok(Value::Int(n));
    }
    float_to_int(f(real(&x)?)).map(Value::Int)
}

fn floor(_: &mut Interpreter, args: Args) -> EvalResult {
    rounding(args, "floor", f64::floor)
}

fn ceil(_: &mut Interpreter, args: Args) -> EvalResult {
    rounding(args, "ceil", f64::ceil)
}

fn trunc(_: &mut Interpreter, args: Args) -> EvalResult {
    rounding(args, "trunc", f64::trunc)
}

fn logarithm(x: &Value) -> EvalResult<f64> {
    let x = real(x)?;
    if x <= 0.0 {
        return Err(domain_error());
    }
    Ok(x.ln())
}

fn log(_: &mut Interpreter, args: Args) -> EvalResult {
    args.expect("log", 1, 2)?;
    let numerator = logarithm(&args.positional[0])?;
    match args.positional.get(1) {
        None => Ok(Value::Float(numerator)),
        Some(base) => {
            let denominator = logarithm(base)?;
            if denominator == 0.0 {
                return Err(crate::errors::zero_division("float division by zero"));
            }
            Ok(Value::Float(numerator / denominator))
        }
    }
}

fn log10(_: &mut Interpreter, args: Args) -> EvalResult {
    let [x] = args.exact::<1>("log10")?;
    logarithm(&x)?;
    Ok(Value::Float(real(&x)?.log10()))
}

fn log2(_: &mut Interpreter, args: Args) -> EvalResult {
    let [x] = args.exact::<1>("log2")?;
    logarithm(&x)?;
    Ok(Value::Float(real(&x)?.log2()))
}

fn pow(_: &mut Interpreter, args: Args) -> EvalResult {
    let [x, y] = args.exact::<2>("pow")?;
    let (x, y) = (real(&x)?, real(&y)?);
    if x == 0.0 && y < 0.0 {
        return Err(domain_error());
    }
    checked(&[x, y], x.powf(y))
}

fn atan2(_: &mut Interpreter, args: Args) -> EvalResult {
    let [y, x] = args.exact::<2>("atan2")?;
    Ok(Value::Float(real(&y)?.atan2(real(&x)?)))
}

fn hypot(_: &mut Interpreter, args: Args) -> EvalResult {
    args.no_keywords("hypot")?;
    let coordinates = args
        .positional
        .iter()
        .map(real)
        .collect::<EvalResult<Vec<_>>>()?;
    if coordinates.iter().any(|x| x.is_infinite()) {
        return Ok(Value::Float(f64::INFINITY));
    }
    let result = coordinates.iter().fold(0.0, |acc: f64, x| acc.hypot(*x));
    checked(&coordinates, result)
}

fn isnan(_: &mut Interpreter, args: Args) -> EvalResult {
    let [x] = args.exact::<1>("isnan")?;
    Ok(Value::Bool(real(&x)?.is_nan()))
}

fn isinf(_: &mut Interpreter, args: Args) -> EvalResult {
    let [x] = args.exact::<1>("isinf")?;
    Ok(Value::Bool(real(&x)?.is_infinite()))
}

fn isfinite(_: &mut Interpreter, args: Args) -> EvalResult {
    let [x] = args.exact::<1>("isfinite")?;
    Ok(Value::Bool(real(&x)?.is_finite()))
}

fn isclose(_: &mut Interpreter, mut args: Args) -> EvalResult {
    let rel_tol = args.take_keyword("rel_tol");
    let abs_tol = args.take_keyword("abs_tol");
    let [a, b] = args.exact::<2>("isclose")?;
    let (a, b) = (real(&a)?, real(&b)?);
    let rel_tol = rel_tol.as_ref().map_or(Ok(1e-9), real)?;
    let abs_tol = abs_tol.as_ref().map_or(Ok(0.0), real)?;
    if rel_tol < 0.0 || abs_tol < 0.0 {
        return Err(value_error("tolerances must be non-negative"));
    }
    if a == b {
        return Ok(Value::Bool(true));
    }
    if a.is_infinite() || b.is_infinite() {
        return Ok(Value::Bool(false));
    }
    let diff = (a - b).abs();
    Ok(Value::Bool(
        diff <= (rel_tol * b).abs() || diff <= (rel_tol * a).abs() || diff <= abs_tol,
    ))
}

fn gcd(_: &mut Interpreter, args: Args) -> EvalResult {
    args.no_keywords("gcd")?;
    let mut result: u64 = 0;
    for value in &args.positional {
        let mut a = result;
        let mut b = integer(value)?.unsigned_abs();
        while b != 0 {
            (a, b) = (b, a % b);
        }
        result = a;
    }
    i64::try_from(result).map(Value::Int).map_err(|_| int_overflow())
}

fn factorial(_: &mut Interpreter, args: Args) -> EvalResult {
    let [n] = args.exact::<1>("factorial")?;
    let n = integer(&n)?;
    if n < 0 {
        return Err(value_error("factorial() not defined for negative values"));
    }
    (2..=n)
        .try_fold(1i64, i64::checked_mul)
        .map(Value::Int)
        .ok_or_else(int_overflow)
}
