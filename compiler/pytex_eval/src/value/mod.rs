//! Runtime values.
//!
//! Containers share their storage through `Rc` so that aliasing behaves the
//! way user code expects: `b = a; b.append(1)` is visible through `a`.

mod dict;
mod repr;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use pytex_ir::{FunctionDef, LambdaDef};

use crate::environment::Namespace;
use crate::errors::{EvalError, EvalResult, ExceptionKind};
use crate::interpreter::{Args, Interpreter};

pub use dict::{Dict, HashKey};
pub use repr::{float_repr, str_repr};

#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<[Value]>),
    Dict(Rc<RefCell<Dict>>),
    Range(Range),
    Function(Rc<Function>),
    Builtin(&'static BuiltinFunction),
    Method(Rc<BoundMethod>),
    Module(Rc<ModuleObject>),
    ExceptionType(ExceptionKind),
    Exception(Rc<ExceptionObject>),
    Stream(Stream),
}

impl Value {
    pub fn str(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::from(items))
    }

    pub fn dict(dict: Dict) -> Value {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Range(_) => "range",
            Value::Function(_) => "function",
            Value::Builtin(_) | Value::Method(_) => "builtin_function_or_method",
            Value::Module(_) => "module",
            Value::ExceptionType(_) => "type",
            Value::Exception(exc) => exc.kind.name(),
            Value::Stream(_) => "_io.TextIOWrapper",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(dict) => !dict.borrow().is_empty(),
            Value::Range(range) => range.len() > 0,
            _ => true,
        }
    }

    /// Integer view of `int` and `bool`, the types usable as indices.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Numeric view of `int`, `bool` and `float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => self.as_index().map(|n| n as f64),
        }
    }

    /// Identity comparison for `is`.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => {
                Rc::ptr_eq(a, b) || (a.is_empty() && b.is_empty())
            }
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            (Value::Method(a), Value::Method(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            (Value::Exception(a), Value::Exception(b)) => Rc::ptr_eq(a, b),
            (Value::ExceptionType(a), Value::ExceptionType(b)) => a == b,
            (Value::Stream(a), Value::Stream(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            _ => false,
        }
    }

    /// Value equality (`==`). Numbers compare across `bool`, `int` and
    /// `float`; containers compare element-wise.
    pub fn py_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || sequences_equal(&a.borrow(), &b.borrow())
            }
            (Value::Tuple(a), Value::Tuple(b)) => sequences_equal(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b) || a.borrow().py_eq(&b.borrow()),
            (Value::Range(a), Value::Range(b)) => a.items_equal(b),
            (Value::ExceptionType(a), Value::ExceptionType(b)) => a == b,
            (Value::Stream(a), Value::Stream(b)) => a == b,
            _ => match (self.numeric(), other.numeric()) {
                (Some(a), Some(b)) => a.py_eq(b),
                _ => self.is_same(other),
            },
        }
    }

    fn numeric(&self) -> Option<Number> {
        match self {
            Value::Float(f) => Some(Number::Float(*f)),
            _ => self.as_index().map(Number::Int),
        }
    }

    /// Dictionary key for this value.
    pub fn hash_key(&self) -> EvalResult<HashKey> {
        HashKey::from_value(self)
    }
}

fn sequences_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.py_eq(y))
}

#[derive(Copy, Clone)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn py_eq(self, other: Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Int(i), Number::Float(f)) | (Number::Float(f), Number::Int(i)) => {
                int_float_eq(i, f)
            }
        }
    }
}

/// Exact comparison of an int and a float; `2**53 + 1 != 2.0**53`.
pub(crate) fn int_float_eq(i: i64, f: f64) -> bool {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if !f.is_finite() || f.fract() != 0.0 || f < -LIMIT || f >= LIMIT {
        return false;
    }
    f as i64 == i
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.py_eq(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

/// `range(start, stop, step)`; `step` is never zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Range {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl Range {
    pub fn len(&self) -> usize {
        let (start, stop, step) = (
            i128::from(self.start),
            i128::from(self.stop),
            i128::from(self.step),
        );
        let (lo, hi, step) = if step > 0 {
            (start, stop, step)
        } else {
            (stop, start, -step)
        };
        if lo >= hi {
            return 0;
        }
        ((hi - lo - 1) / step + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, which must be below `len()`.
    pub fn get(&self, index: usize) -> i64 {
        (i128::from(self.start) + i128::from(self.step) * index as i128) as i64
    }

    pub fn contains(&self, n: i64) -> bool {
        let (n, start, stop, step) = (
            i128::from(n),
            i128::from(self.start),
            i128::from(self.stop),
            i128::from(self.step),
        );
        let in_bounds = if step > 0 {
            start <= n && n < stop
        } else {
            stop < n && n <= start
        };
        in_bounds && (n - start) % step == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> {
        let range = *self;
        (0..range.len()).map(move |i| range.get(i))
    }

    fn items_equal(&self, other: &Range) -> bool {
        let len = self.len();
        len == other.len()
            && (len == 0
                || (self.start == other.start && (len == 1 || self.step == other.step)))
    }
}

/// A user-defined function or lambda together with the scopes it closes over.
pub struct Function {
    pub(crate) name: Rc<str>,
    pub(crate) code: FunctionCode,
    /// Evaluated defaults for the trailing parameters.
    pub(crate) defaults: Vec<Value>,
    pub(crate) globals: Namespace,
    /// Enclosing function scopes, outermost first.
    pub(crate) enclosing: Rc<[Namespace]>,
}

pub(crate) enum FunctionCode {
    Def(Rc<FunctionDef>),
    Lambda(Rc<LambdaDef>),
}

impl Function {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn params(&self) -> &[pytex_ir::Param] {
        match &self.code {
            FunctionCode::Def(def) => &def.params,
            FunctionCode::Lambda(lambda) => &lambda.params,
        }
    }
}

pub(crate) type BuiltinFn = fn(&mut Interpreter, Args) -> EvalResult;

/// A function implemented in Rust.
pub struct BuiltinFunction {
    pub(crate) name: &'static str,
    pub(crate) func: BuiltinFn,
}

impl BuiltinFunction {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A built-in method bound to its receiver, e.g. `items.append`.
pub struct BoundMethod {
    pub(crate) receiver: Value,
    pub(crate) name: &'static str,
}

/// A built-in module such as `math`; attributes are assignable.
pub struct ModuleObject {
    name: &'static str,
    attrs: RefCell<IndexMap<String, Value>>,
}

impl ModuleObject {
    pub(crate) fn new(name: &'static str, attrs: IndexMap<String, Value>) -> Self {
        ModuleObject {
            name,
            attrs: RefCell::new(attrs),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.borrow().get(name).cloned()
    }

    pub fn set(&self, name: &str, value: Value) {
        self.attrs.borrow_mut().insert(name.to_owned(), value);
    }

    /// Public attributes in definition order, for `from m import *`.
    pub fn public_attrs(&self) -> Vec<(String, Value)> {
        self.attrs
            .borrow()
            .iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

/// An exception instance, as bound by `except E as e`.
pub struct ExceptionObject {
    pub kind: ExceptionKind,
    pub args: Vec<Value>,
    /// `str()` of the exception.
    pub message: String,
}

impl ExceptionObject {
    /// Instance built by calling an exception type.
    pub fn new(kind: ExceptionKind, args: Vec<Value>) -> Self {
        let message = match args.as_slice() {
            [] => String::new(),
            [arg] if kind == ExceptionKind::KeyError => arg.repr(),
            [arg] => arg.to_str(),
            _ => Value::tuple(args.clone()).repr(),
        };
        ExceptionObject {
            kind,
            args,
            message,
        }
    }

    /// Instance for an exception raised by the runtime or re-entering `except`.
    pub fn from_error(err: &EvalError) -> Self {
        let args = if err.message.is_empty() {
            Vec::new()
        } else {
            vec![Value::str(&err.message)]
        };
        ExceptionObject {
            kind: err.kind,
            args,
            message: err.message.clone(),
        }
    }

    pub fn to_error(&self) -> EvalError {
        EvalError::new(self.kind, self.message.clone())
    }
}

/// Text stream objects exposed as `sys.stdout` and `sys.stderr`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stream {
    /// The executor's active print handler.
    Stdout,
    /// The process's real standard error.
    Stderr,
}

impl Stream {
    pub fn name(self) -> &'static str {
        match self {
            Stream::Stdout => "<stdout>",
            Stream::Stderr => "<stderr>",
        }
    }
}

#[cfg(test)]
mod tests;
