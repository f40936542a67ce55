//! Format specification parser for `format()`, f-string fields and
//! `str.format` replacement fields.
//!
//! Parses the spec syntax
//! `[[fill]align][sign][#][0][width][grouping][.precision][type]`
//! used in fields like `{value:>10,.2f}`.
//!
//! The parsed result ([`ParsedFormatSpec`]) is consumed by the evaluator,
//! which applies type-specific formatting at runtime.

use std::fmt;

/// Parsed format specification.
///
/// All fields are `Option`; an empty spec `{x:}` produces all-`None`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParsedFormatSpec {
    /// Padding character (default: space).
    pub fill: Option<char>,
    /// Alignment direction.
    pub align: Option<Align>,
    /// Sign display for numbers.
    pub sign: Option<Sign>,
    /// Alternate form (`#`): adds `0b`/`0o`/`0x` prefix.
    pub alternate: bool,
    /// Zero-pad (`0`): pads with zeros after the sign.
    pub zero_pad: bool,
    /// Minimum field width.
    pub width: Option<usize>,
    /// Thousands separator (`,` or `_`).
    pub grouping: Option<char>,
    /// Decimal places (floats) or max length (strings).
    pub precision: Option<usize>,
    /// Type-specific format.
    pub format_type: Option<FormatType>,
}

impl ParsedFormatSpec {
    /// An empty spec with no formatting options set.
    pub const EMPTY: Self = Self {
        fill: None,
        align: None,
        sign: None,
        alternate: false,
        zero_pad: false,
        width: None,
        grouping: None,
        precision: None,
        format_type: None,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

/// Alignment direction for field padding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Align {
    /// `<` pads on the right.
    Left,
    /// `^` pads equally on both sides, extra on the right.
    Center,
    /// `>` pads on the left.
    Right,
    /// `=` pads between the sign and the digits.
    AfterSign,
}

/// Sign display mode for numeric values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    /// `+` always shows the sign.
    Plus,
    /// `-` shows the sign only for negatives (default).
    Minus,
    /// ` ` uses a space for non-negatives.
    Space,
}

/// Type-specific formatting mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FormatType {
    /// `s` string.
    Str,
    /// `d` decimal integer.
    Decimal,
    /// `n` number; decimal for ints, general for floats.
    Number,
    /// `b` binary integer.
    Binary,
    /// `o` octal integer.
    Octal,
    /// `x` lowercase hexadecimal.
    Hex,
    /// `X` uppercase hexadecimal.
    HexUpper,
    /// `e` lowercase scientific notation.
    Exp,
    /// `E` uppercase scientific notation.
    ExpUpper,
    /// `f` fixed-point decimal.
    Fixed,
    /// `F` fixed-point decimal, uppercase `INF`/`NAN`.
    FixedUpper,
    /// `g` general format.
    General,
    /// `G` general format, uppercase.
    GeneralUpper,
    /// `%` percentage (multiply by 100, append `%`).
    Percent,
}

impl FormatType {
    /// Returns `true` if this format type is only valid for integer values.
    pub fn is_integer_only(&self) -> bool {
        matches!(
            self,
            Self::Decimal | Self::Binary | Self::Octal | Self::Hex | Self::HexUpper
        )
    }

    /// Returns `true` if this format type renders a number as a float.
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            Self::Exp
                | Self::ExpUpper
                | Self::Fixed
                | Self::FixedUpper
                | Self::General
                | Self::GeneralUpper
                | Self::Percent
        )
    }

    /// The spec character for error messages.
    pub fn as_char(&self) -> char {
        match self {
            Self::Str => 's',
            Self::Decimal => 'd',
            Self::Number => 'n',
            Self::Binary => 'b',
            Self::Octal => 'o',
            Self::Hex => 'x',
            Self::HexUpper => 'X',
            Self::Exp => 'e',
            Self::ExpUpper => 'E',
            Self::Fixed => 'f',
            Self::FixedUpper => 'F',
            Self::General => 'g',
            Self::GeneralUpper => 'G',
            Self::Percent => '%',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        let ty = match c {
            's' => Self::Str,
            'd' => Self::Decimal,
            'n' => Self::Number,
            'b' => Self::Binary,
            'o' => Self::Octal,
            'x' => Self::Hex,
            'X' => Self::HexUpper,
            'e' => Self::Exp,
            'E' => Self::ExpUpper,
            'f' => Self::Fixed,
            'F' => Self::FixedUpper,
            'g' => Self::General,
            'G' => Self::GeneralUpper,
            '%' => Self::Percent,
            _ => return None,
        };
        Some(ty)
    }
}

/// Error from parsing a format specification string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatSpecError {
    /// Unknown format type character (e.g., `{n:z}`).
    UnknownType(char),
    /// Trailing characters after a valid spec.
    TrailingCharacters(String),
    /// Width is not a valid number.
    InvalidWidth(String),
    /// Precision is not a valid number.
    InvalidPrecision(String),
}

impl fmt::Display for FormatSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType(c) => write!(f, "Unknown format code '{c}'"),
            Self::TrailingCharacters(_) => write!(f, "Invalid format specifier"),
            Self::InvalidWidth(s) => write!(f, "invalid width '{s}'"),
            Self::InvalidPrecision(s) => write!(f, "invalid precision '{s}'"),
        }
    }
}

impl std::error::Error for FormatSpecError {}

/// Parse a format specification string.
///
/// Syntax: `[[fill]align][sign][#][0][width][grouping][.precision][type]`
///
/// # Examples
///
/// ```
/// use pytex_ir::format_spec::{parse_format_spec, Align, FormatType};
///
/// let spec = parse_format_spec("*^20.5f").unwrap();
/// assert_eq!(spec.fill, Some('*'));
/// assert_eq!(spec.align, Some(Align::Center));
/// assert_eq!(spec.width, Some(20));
/// assert_eq!(spec.precision, Some(5));
/// assert_eq!(spec.format_type, Some(FormatType::Fixed));
/// ```
pub fn parse_format_spec(spec: &str) -> Result<ParsedFormatSpec, FormatSpecError> {
    if spec.is_empty() {
        return Ok(ParsedFormatSpec::EMPTY);
    }

    let mut result = ParsedFormatSpec::EMPTY;
    let chars: Vec<char> = spec.chars().collect();
    let mut pos = 0;

    // [[fill]align]: if chars[1] aligns, chars[0] is the fill.
    if chars.len() >= 2 && is_align_char(chars[1]) {
        result.fill = Some(chars[0]);
        result.align = parse_align(chars[1]);
        pos = 2;
    } else if is_align_char(chars[0]) {
        result.align = parse_align(chars[0]);
        pos = 1;
    }

    // [sign]
    if let Some(&c) = chars.get(pos) {
        let sign = match c {
            '+' => Some(Sign::Plus),
            '-' => Some(Sign::Minus),
            ' ' => Some(Sign::Space),
            _ => None,
        };
        if sign.is_some() {
            result.sign = sign;
            pos += 1;
        }
    }

    // [#]
    if chars.get(pos) == Some(&'#') {
        result.alternate = true;
        pos += 1;
    }

    // [0]
    if chars.get(pos) == Some(&'0') {
        result.zero_pad = true;
        pos += 1;
    }

    // [width]
    let width_start = pos;
    while pos < chars.len() && chars[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos > width_start {
        let width_str: String = chars[width_start..pos].iter().collect();
        result.width = Some(
            width_str
                .parse()
                .map_err(|_| FormatSpecError::InvalidWidth(width_str))?,
        );
    }

    // [grouping]
    if let Some(&c @ (',' | '_')) = chars.get(pos) {
        result.grouping = Some(c);
        pos += 1;
    }

    // [.precision]
    if chars.get(pos) == Some(&'.') {
        pos += 1;
        let prec_start = pos;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            pos += 1;
        }
        let prec_str: String = chars[prec_start..pos].iter().collect();
        result.precision = Some(
            prec_str
                .parse()
                .map_err(|_| FormatSpecError::InvalidPrecision(prec_str))?,
        );
    }

    // [type]
    if let Some(&type_char) = chars.get(pos) {
        result.format_type =
            Some(FormatType::from_char(type_char).ok_or(FormatSpecError::UnknownType(type_char))?);
        pos += 1;
    }

    if pos < chars.len() {
        let trailing: String = chars[pos..].iter().collect();
        return Err(FormatSpecError::TrailingCharacters(trailing));
    }

    Ok(result)
}

fn is_align_char(c: char) -> bool {
    matches!(c, '<' | '>' | '^' | '=')
}

fn parse_align(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '^' => Some(Align::Center),
        '>' => Some(Align::Right),
        '=' => Some(Align::AfterSign),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
