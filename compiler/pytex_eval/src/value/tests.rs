#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

#[test]
fn float_repr_matches_python() {
    let cases = [
        (0.0, "0.0"),
        (-0.0, "-0.0"),
        (1.0, "1.0"),
        (0.1, "0.1"),
        (2.5, "2.5"),
        (1.0 / 3.0, "0.3333333333333333"),
        (123_456_789.0, "123456789.0"),
        (1e15, "1000000000000000.0"),
        (1e16, "1e+16"),
        (1.5e20, "1.5e+20"),
        (0.0001, "0.0001"),
        (0.000_015, "1.5e-05"),
        (-2.75e-7, "-2.75e-07"),
        (f64::INFINITY, "inf"),
        (f64::NEG_INFINITY, "-inf"),
        (f64::NAN, "nan"),
    ];
    for (value, expected) in cases {
        assert_eq!(float_repr(value), expected, "repr of {value:?}");
    }
}

#[test]
fn str_repr_picks_quotes_and_escapes() {
    assert_eq!(str_repr("abc"), "'abc'");
    assert_eq!(str_repr("it's"), "\"it's\"");
    assert_eq!(str_repr("both ' and \""), "'both \\' and \"'");
    assert_eq!(str_repr("a\nb\t\\"), "'a\\nb\\t\\\\'");
    assert_eq!(str_repr("\u{7}"), "'\\x07'");
    assert_eq!(str_repr("π"), "'π'");
}

#[test]
fn container_reprs() {
    let list = Value::list(vec![Value::Int(1), Value::str("a"), Value::None]);
    assert_eq!(list.repr(), "[1, 'a', None]");
    assert_eq!(Value::tuple(vec![Value::Int(1)]).repr(), "(1,)");
    assert_eq!(Value::tuple(Vec::new()).repr(), "()");

    let mut dict = Dict::new();
    dict.insert(Value::str("k"), Value::Float(1.0)).unwrap();
    dict.insert(Value::Int(2), Value::Bool(true)).unwrap();
    assert_eq!(Value::dict(dict).repr(), "{'k': 1.0, 2: True}");

    let range = Value::Range(Range {
        start: 0,
        stop: 10,
        step: 2,
    });
    assert_eq!(range.repr(), "range(0, 10, 2)");
}

#[test]
fn self_containing_list_repr_terminates() {
    let list = Value::list(vec![Value::Int(1)]);
    if let Value::List(items) = &list {
        items.borrow_mut().push(list.clone());
    }
    assert_eq!(list.repr(), "[1, [...]]");
}

#[test]
fn str_of_string_is_unquoted() {
    assert_eq!(Value::str("text").to_str(), "text");
    assert_eq!(Value::str("text").repr(), "'text'");
    assert_eq!(Value::Float(3.0).to_str(), "3.0");
}

#[test]
fn numeric_equality_crosses_types() {
    assert_eq!(Value::Int(1), Value::Float(1.0));
    assert_eq!(Value::Bool(true), Value::Int(1));
    assert!(!Value::Int(1).py_eq(&Value::str("1")));
    assert!(!Value::Float(f64::NAN).py_eq(&Value::Float(f64::NAN)));
    assert!(!Value::Int(i64::MAX).py_eq(&Value::Float(9_223_372_036_854_775_808.0)));
    assert_eq!(
        Value::tuple(vec![Value::Int(1), Value::Float(2.0)]),
        Value::tuple(vec![Value::Float(1.0), Value::Int(2)])
    );
}

#[test]
fn equal_numbers_share_a_dict_key() {
    let mut dict = Dict::new();
    dict.insert(Value::Int(1), Value::str("int")).unwrap();
    dict.insert(Value::Float(1.0), Value::str("float")).unwrap();
    dict.insert(Value::Bool(true), Value::str("bool")).unwrap();
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.keys(), vec![Value::Int(1)]);
    assert_eq!(dict.get(&Value::Int(1)).unwrap(), Some(Value::str("bool")));
    assert!(matches!(dict.keys()[0], Value::Int(1)));
}

#[test]
fn unhashable_keys_are_type_errors() {
    let err = Value::list(Vec::new()).hash_key().unwrap_err();
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert_eq!(err.message, "unhashable type: 'list'");
}

#[test]
fn range_len_and_contains() {
    let range = Range {
        start: 10,
        stop: 0,
        step: -3,
    };
    assert_eq!(range.len(), 4);
    assert_eq!(range.iter().collect::<Vec<_>>(), vec![10, 7, 4, 1]);
    assert!(range.contains(7));
    assert!(!range.contains(8));
    assert!(!range.contains(0));
    assert_eq!(range.get(3), 1);

    let empty = Range {
        start: 5,
        stop: 5,
        step: 1,
    };
    assert!(empty.is_empty());
    assert!(!Value::Range(empty).is_truthy());

    let huge = Range {
        start: i64::MIN,
        stop: i64::MAX,
        step: i64::MAX,
    };
    assert_eq!(huge.len(), 3);
}

#[test]
fn truthiness() {
    assert!(!Value::None.is_truthy());
    assert!(!Value::Int(0).is_truthy());
    assert!(!Value::Float(0.0).is_truthy());
    assert!(!Value::str("").is_truthy());
    assert!(!Value::list(Vec::new()).is_truthy());
    assert!(Value::str("0").is_truthy());
    assert!(Value::tuple(vec![Value::None]).is_truthy());
}

#[test]
fn exception_object_messages() {
    let single = ExceptionObject::new(ExceptionKind::ValueError, vec![Value::str("bad")]);
    assert_eq!(single.message, "bad");
    let key = ExceptionObject::new(ExceptionKind::KeyError, vec![Value::str("k")]);
    assert_eq!(key.message, "'k'");
    let many = ExceptionObject::new(
        ExceptionKind::RuntimeError,
        vec![Value::Int(1), Value::str("x")],
    );
    assert_eq!(many.message, "(1, 'x')");
    assert_eq!(many.to_error().to_string(), "RuntimeError: (1, 'x')");
}

proptest! {
    #[test]
    fn float_repr_reads_back(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let text = float_repr(f);
        prop_assert_eq!(text.parse::<f64>().unwrap(), f);
    }

    #[test]
    fn range_agrees_with_stepping(
        start in -50i64..50,
        stop in -50i64..50,
        step in prop_oneof![-7i64..=-1, 1i64..=7],
    ) {
        let range = Range { start, stop, step };
        let mut expected = Vec::new();
        let mut n = start;
        while (step > 0 && n < stop) || (step < 0 && n > stop) {
            expected.push(n);
            n += step;
        }
        prop_assert_eq!(range.len(), expected.len());
        let produced: Vec<i64> = (0..range.len()).map(|i| range.get(i)).collect();
        prop_assert_eq!(&produced, &expected);
        for probe in -60i64..60 {
            prop_assert_eq!(range.contains(probe), expected.contains(&probe));
        }
    }
}
