//! Exceptions raised by evaluated code.
//!
//! Every failure inside a code block, from a syntax error to an uncaught
//! `raise`, surfaces as one [`EvalError`]. The constructors below are the
//! single place the evaluator's messages are spelled out.

use std::fmt;

use pytex_ir::Span;
use pytex_parse::ParseError;

use crate::Value;

/// Built-in exception classes, arranged in the usual hierarchy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    BaseException,
    Exception,
    ArithmeticError,
    ZeroDivisionError,
    OverflowError,
    LookupError,
    IndexError,
    KeyError,
    NameError,
    UnboundLocalError,
    TypeError,
    ValueError,
    AttributeError,
    ImportError,
    ModuleNotFoundError,
    AssertionError,
    RuntimeError,
    RecursionError,
    NotImplementedError,
    SyntaxError,
    IndentationError,
    StopIteration,
}

impl ExceptionKind {
    pub const ALL: [ExceptionKind; 22] = [
        ExceptionKind::BaseException,
        ExceptionKind::Exception,
        ExceptionKind::ArithmeticError,
        ExceptionKind::ZeroDivisionError,
        ExceptionKind::OverflowError,
        ExceptionKind::LookupError,
        ExceptionKind::IndexError,
        ExceptionKind::KeyError,
        ExceptionKind::NameError,
        ExceptionKind::UnboundLocalError,
        ExceptionKind::TypeError,
        ExceptionKind::ValueError,
        ExceptionKind::AttributeError,
        ExceptionKind::ImportError,
        ExceptionKind::ModuleNotFoundError,
        ExceptionKind::AssertionError,
        ExceptionKind::RuntimeError,
        ExceptionKind::RecursionError,
        ExceptionKind::NotImplementedError,
        ExceptionKind::SyntaxError,
        ExceptionKind::IndentationError,
        ExceptionKind::StopIteration,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::BaseException => "BaseException",
            Self::Exception => "Exception",
            Self::ArithmeticError => "ArithmeticError",
            Self::ZeroDivisionError => "ZeroDivisionError",
            Self::OverflowError => "OverflowError",
            Self::LookupError => "LookupError",
            Self::IndexError => "IndexError",
            Self::KeyError => "KeyError",
            Self::NameError => "NameError",
            Self::UnboundLocalError => "UnboundLocalError",
            Self::TypeError => "TypeError",
            Self::ValueError => "ValueError",
            Self::AttributeError => "AttributeError",
            Self::ImportError => "ImportError",
            Self::ModuleNotFoundError => "ModuleNotFoundError",
            Self::AssertionError => "AssertionError",
            Self::RuntimeError => "RuntimeError",
            Self::RecursionError => "RecursionError",
            Self::NotImplementedError => "NotImplementedError",
            Self::SyntaxError => "SyntaxError",
            Self::IndentationError => "IndentationError",
            Self::StopIteration => "StopIteration",
        }
    }

    /// Direct base class; `None` only for `BaseException`.
    pub const fn parent(self) -> Option<ExceptionKind> {
        let parent = match self {
            Self::BaseException => return None,
            Self::Exception => Self::BaseException,
            Self::ZeroDivisionError | Self::OverflowError => Self::ArithmeticError,
            Self::IndexError | Self::KeyError => Self::LookupError,
            Self::UnboundLocalError => Self::NameError,
            Self::ModuleNotFoundError => Self::ImportError,
            Self::RecursionError | Self::NotImplementedError => Self::RuntimeError,
            Self::IndentationError => Self::SyntaxError,
            Self::ArithmeticError
            | Self::LookupError
            | Self::NameError
            | Self::TypeError
            | Self::ValueError
            | Self::AttributeError
            | Self::ImportError
            | Self::AssertionError
            | Self::RuntimeError
            | Self::SyntaxError
            | Self::StopIteration => Self::Exception,
        };
        Some(parent)
    }

    /// Whether an `except other:` clause catches this kind.
    pub fn is_subclass_of(self, other: ExceptionKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    pub fn from_name(name: &str) -> Option<ExceptionKind> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An exception propagating out of evaluated code.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: ExceptionKind,
    /// Exception message; `str()` of the exception.
    pub message: String,
    /// Where it was raised, when known.
    pub span: Option<Span>,
}

/// Result of evaluating an expression.
pub type EvalResult<T = Value> = Result<T, EvalError>;

impl EvalError {
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
            span: None,
        }
    }

    /// Attach a source span unless one is already set.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    /// Convert a parse failure of `source` into a `SyntaxError` or
    /// `IndentationError` naming the line.
    pub fn from_parse(err: &ParseError, source: &str) -> Self {
        let kind = if err.is_indentation() {
            ExceptionKind::IndentationError
        } else {
            ExceptionKind::SyntaxError
        };
        let span = err.span();
        let line = span.line_in(source);
        EvalError::new(kind, format!("{err} (line {line})")).with_span(span)
    }

    /// 1-based source line of the error, if it carries a span.
    pub fn line_in(&self, source: &str) -> Option<usize> {
        self.span.map(|span| span.line_in(source))
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for EvalError {}

// Names

#[cold]
pub fn undefined_name(name: &str) -> EvalError {
    EvalError::new(
        ExceptionKind::NameError,
        format!("name '{name}' is not defined"),
    )
}

#[cold]
pub fn unbound_local(name: &str) -> EvalError {
    EvalError::new(
        ExceptionKind::UnboundLocalError,
        format!("cannot access local variable '{name}' where it is not associated with a value"),
    )
}

// Types and operators

#[cold]
pub fn type_error(message: impl Into<String>) -> EvalError {
    EvalError::new(ExceptionKind::TypeError, message)
}

#[cold]
pub fn value_error(message: impl Into<String>) -> EvalError {
    EvalError::new(ExceptionKind::ValueError, message)
}

#[cold]
pub fn unsupported_operands(symbol: &str, left: &Value, right: &Value) -> EvalError {
    type_error(format!(
        "unsupported operand type(s) for {symbol}: '{}' and '{}'",
        left.type_name(),
        right.type_name()
    ))
}

#[cold]
pub fn bad_operand(symbol: &str, operand: &Value) -> EvalError {
    type_error(format!(
        "bad operand type for unary {symbol}: '{}'",
        operand.type_name()
    ))
}

#[cold]
pub fn not_comparable(symbol: &str, left: &Value, right: &Value) -> EvalError {
    type_error(format!(
        "'{symbol}' not supported between instances of '{}' and '{}'",
        left.type_name(),
        right.type_name()
    ))
}

#[cold]
pub fn not_callable(value: &Value) -> EvalError {
    type_error(format!("'{}' object is not callable", value.type_name()))
}

#[cold]
pub fn not_iterable(value: &Value) -> EvalError {
    type_error(format!("'{}' object is not iterable", value.type_name()))
}

#[cold]
pub fn unhashable(value: &Value) -> EvalError {
    type_error(format!("unhashable type: '{}'", value.type_name()))
}

#[cold]
pub fn no_attribute(value: &Value, name: &str) -> EvalError {
    let message = match value {
        Value::Module(module) => format!("module '{}' has no attribute '{name}'", module.name()),
        _ => format!("'{}' object has no attribute '{name}'", value.type_name()),
    };
    EvalError::new(ExceptionKind::AttributeError, message)
}

// Arithmetic

#[cold]
pub fn zero_division(message: &str) -> EvalError {
    EvalError::new(ExceptionKind::ZeroDivisionError, message)
}

#[cold]
pub fn int_overflow() -> EvalError {
    EvalError::new(
        ExceptionKind::OverflowError,
        "integer result does not fit in 64 bits",
    )
}

// Lookup

#[cold]
pub fn index_out_of_range(type_name: &str) -> EvalError {
    EvalError::new(
        ExceptionKind::IndexError,
        format!("{type_name} index out of range"),
    )
}

#[cold]
pub fn key_error(key: &Value) -> EvalError {
    EvalError::new(ExceptionKind::KeyError, key.repr())
}

// Calls

#[cold]
pub fn wrong_arg_count(func: &str, min: usize, max: usize, given: usize) -> EvalError {
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    let message = if given < min && min != max {
        format!(
            "{func}() takes at least {min} positional argument{} ({given} given)",
            plural(min)
        )
    } else {
        let expected = if min == max {
            format!("{max} positional argument{}", plural(max))
        } else {
            format!("from {min} to {max} positional arguments")
        };
        let verb = if given == 1 { "was" } else { "were" };
        format!("{func}() takes {expected} but {given} {verb} given")
    };
    type_error(message)
}

#[cold]
pub fn missing_arguments(func: &str, names: &[&str]) -> EvalError {
    let quoted: Vec<String> = names.iter().map(|name| format!("'{name}'")).collect();
    let list = match quoted.as_slice() {
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
        [] => String::new(),
    };
    let plural = if names.len() == 1 { "" } else { "s" };
    type_error(format!(
        "{func}() missing {} required positional argument{plural}: {list}",
        names.len()
    ))
}

#[cold]
pub fn unexpected_keyword(name: &str, keyword: &str) -> EvalError {
    type_error(format!(
        "{name}() got an unexpected keyword argument '{keyword}'"
    ))
}

#[cold]
pub fn recursion_limit() -> EvalError {
    EvalError::new(
        ExceptionKind::RecursionError,
        "maximum recursion depth exceeded",
    )
}

// Imports

#[cold]
pub fn module_not_found(name: &str) -> EvalError {
    EvalError::new(
        ExceptionKind::ModuleNotFoundError,
        format!("No module named '{name}'"),
    )
}
