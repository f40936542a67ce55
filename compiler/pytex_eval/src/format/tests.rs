#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;

use super::*;

fn fmt(value: impl Into<Value>, spec: &str) -> String {
    format_value(&value.into(), spec).unwrap()
}

#[test]
fn integers() {
    assert_eq!(fmt(42_i64, "5d"), "   42");
    assert_eq!(fmt(42_i64, "<5"), "42   ");
    assert_eq!(fmt(42_i64, "^6"), "  42  ");
    assert_eq!(fmt(-42_i64, "05d"), "-0042");
    assert_eq!(fmt(42_i64, "+d"), "+42");
    assert_eq!(fmt(42_i64, " d"), " 42");
    assert_eq!(fmt(-7_i64, "=+6"), "-    7");
    assert_eq!(fmt(1_234_567_i64, ","), "1,234,567");
    assert_eq!(fmt(1_234_567_i64, "_"), "1_234_567");
    assert_eq!(fmt(255_i64, "_b"), "1111_1111");
    assert_eq!(fmt(255_i64, "#x"), "0xff");
    assert_eq!(fmt(255_i64, "X"), "FF");
    assert_eq!(fmt(8_i64, "#o"), "0o10");
    assert_eq!(fmt(5_i64, "*>4"), "***5");
    assert_eq!(fmt(true, "d"), "1");
}

#[test]
fn integers_accept_float_types() {
    assert_eq!(fmt(5_i64, ".1f"), "5.0");
    assert_eq!(fmt(1_i64, "%"), "100.000000%");
}

#[test]
fn floats() {
    assert_eq!(fmt(3.141_59, ".2f"), "3.14");
    assert_eq!(fmt(3.141_59, "10.3f"), "     3.142");
    assert_eq!(fmt(-3.141_59, "010.3f"), "-00003.142");
    assert_eq!(fmt(1234.5, ",.2f"), "1,234.50");
    assert_eq!(fmt(12_345.678, ".3e"), "1.235e+04");
    assert_eq!(fmt(12_345.678, "E"), "1.234568E+04");
    assert_eq!(fmt(0.256, ".1%"), "25.6%");
    assert_eq!(fmt(0.000_012_34, "g"), "1.234e-05");
    assert_eq!(fmt(123_456_789.0, "g"), "1.23457e+08");
    assert_eq!(fmt(100.0, "g"), "100");
    assert_eq!(fmt(1234.5, ".2"), "1.2e+03");
    assert_eq!(fmt(1.0, ".3"), "1.0");
    assert_eq!(fmt(2.5, ""), "2.5");
    assert_eq!(fmt(2.0, "8"), "     2.0");
    assert_eq!(fmt(f64::INFINITY, "f"), "inf");
    assert_eq!(fmt(f64::NEG_INFINITY, "F"), "-INF");
}

#[test]
fn strings() {
    assert_eq!(fmt("ab", ">5"), "   ab");
    assert_eq!(fmt("ab", "5"), "ab   ");
    assert_eq!(fmt("hello", ".2"), "he");
    assert_eq!(fmt("hi", "*^7"), "**hi***");
    assert_eq!(fmt("héllo", "s"), "héllo");
}

#[test]
fn invalid_specs() {
    let err = format_value(&Value::Float(1.5), "d").unwrap_err();
    assert_eq!(err.kind, ExceptionKind::ValueError);
    assert_eq!(
        err.message,
        "Unknown format code 'd' for object of type 'float'"
    );

    let err = format_value(&Value::str("s"), "+").unwrap_err();
    assert_eq!(err.message, "Sign not allowed in string format specifier");

    let err = format_value(&Value::list(Vec::new()), "x").unwrap_err();
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert_eq!(
        err.message,
        "unsupported format string passed to list.__format__"
    );
}

#[test]
fn templates() {
    let args = [Value::Int(1), Value::str("two")];
    let kwargs = [("name".to_owned(), Value::str("x"))];
    assert_eq!(format_template("{} and {}", &args, &[]).unwrap(), "1 and two");
    assert_eq!(format_template("{1}{0}{1}", &args, &[]).unwrap(), "two1two");
    assert_eq!(format_template("{name!r}", &[], &kwargs).unwrap(), "'x'");
    assert_eq!(format_template("{{{}}}", &args, &[]).unwrap(), "{1}");
    assert_eq!(
        format_template("{0:>{1}}", &[Value::str("a"), Value::Int(3)], &[]).unwrap(),
        "  a"
    );
    let items = Value::list(vec![Value::Int(10), Value::Int(20)]);
    assert_eq!(format_template("{0[1]}", &[items], &[]).unwrap(), "20");
}

#[test]
fn template_errors() {
    let args = [Value::Int(1), Value::Int(2)];
    let err = format_template("{}{0}", &args, &[]).unwrap_err();
    assert_eq!(
        err.message,
        "cannot switch from automatic field numbering to manual field specification"
    );
    let err = format_template("{0}{}", &args, &[]).unwrap_err();
    assert_eq!(
        err.message,
        "cannot switch from manual field specification to automatic field numbering"
    );
    let err = format_template("{missing}", &args, &[]).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::KeyError);
    let err = format_template("{5}", &args, &[]).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::IndexError);
    let err = format_template("}", &args, &[]).unwrap_err();
    assert_eq!(err.message, "Single '}' encountered in format string");
}
