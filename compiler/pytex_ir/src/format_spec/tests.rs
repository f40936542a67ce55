//! Tests for the format specification parser.

#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn empty_spec() {
    let spec = parse_format_spec("").unwrap();
    assert_eq!(spec, ParsedFormatSpec::EMPTY);
    assert!(spec.is_empty());
}

// Alignment

#[test]
fn align_without_fill() {
    assert_eq!(parse_format_spec("<").unwrap().align, Some(Align::Left));
    assert_eq!(parse_format_spec(">").unwrap().align, Some(Align::Right));
    assert_eq!(parse_format_spec("^").unwrap().align, Some(Align::Center));
    assert_eq!(parse_format_spec("=").unwrap().align, Some(Align::AfterSign));
}

#[test]
fn fill_and_align() {
    let spec = parse_format_spec("*^").unwrap();
    assert_eq!(spec.fill, Some('*'));
    assert_eq!(spec.align, Some(Align::Center));
}

#[test]
fn fill_can_be_an_align_char() {
    let spec = parse_format_spec("<>").unwrap();
    assert_eq!(spec.fill, Some('<'));
    assert_eq!(spec.align, Some(Align::Right));
}

#[test]
fn fill_dash_is_not_a_sign() {
    let spec = parse_format_spec("-<5").unwrap();
    assert_eq!(spec.fill, Some('-'));
    assert_eq!(spec.align, Some(Align::Left));
    assert_eq!(spec.sign, None);
    assert_eq!(spec.width, Some(5));
}

// Sign, alternate, zero

#[test]
fn signs() {
    assert_eq!(parse_format_spec("+").unwrap().sign, Some(Sign::Plus));
    assert_eq!(parse_format_spec("-").unwrap().sign, Some(Sign::Minus));
    assert_eq!(parse_format_spec(" d").unwrap().sign, Some(Sign::Space));
}

#[test]
fn alternate_hex() {
    let spec = parse_format_spec("#x").unwrap();
    assert!(spec.alternate);
    assert_eq!(spec.format_type, Some(FormatType::Hex));
}

#[test]
fn zero_pad_with_width() {
    let spec = parse_format_spec("08.3f").unwrap();
    assert!(spec.zero_pad);
    assert_eq!(spec.width, Some(8));
    assert_eq!(spec.precision, Some(3));
    assert_eq!(spec.format_type, Some(FormatType::Fixed));
}

// Width, grouping, precision

#[test]
fn grouping() {
    let spec = parse_format_spec(",d").unwrap();
    assert_eq!(spec.grouping, Some(','));
    let spec = parse_format_spec("10_").unwrap();
    assert_eq!(spec.width, Some(10));
    assert_eq!(spec.grouping, Some('_'));
}

#[test]
fn full_spec() {
    let spec = parse_format_spec("*>+#012,.2f").unwrap();
    assert_eq!(
        spec,
        ParsedFormatSpec {
            fill: Some('*'),
            align: Some(Align::Right),
            sign: Some(Sign::Plus),
            alternate: true,
            zero_pad: true,
            width: Some(12),
            grouping: Some(','),
            precision: Some(2),
            format_type: Some(FormatType::Fixed),
        }
    );
}

#[test]
fn precision_without_digits_is_an_error() {
    assert!(matches!(
        parse_format_spec(".f"),
        Err(FormatSpecError::InvalidPrecision(_))
    ));
}

// Types

#[test]
fn every_type_char() {
    for c in ['s', 'd', 'n', 'b', 'o', 'x', 'X', 'e', 'E', 'f', 'F', 'g', 'G', '%'] {
        let spec = parse_format_spec(&c.to_string()).unwrap();
        assert_eq!(spec.format_type.map(|t| t.as_char()), Some(c));
    }
}

#[test]
fn integer_and_float_classes() {
    assert!(FormatType::Hex.is_integer_only());
    assert!(!FormatType::Fixed.is_integer_only());
    assert!(FormatType::Percent.is_float());
    assert!(!FormatType::Str.is_float());
}

// Errors

#[test]
fn unknown_type() {
    assert_eq!(
        parse_format_spec("z"),
        Err(FormatSpecError::UnknownType('z'))
    );
    assert_eq!(
        FormatSpecError::UnknownType('z').to_string(),
        "Unknown format code 'z'"
    );
}

#[test]
fn trailing_characters() {
    assert_eq!(
        parse_format_spec("dd"),
        Err(FormatSpecError::TrailingCharacters("d".into()))
    );
}
