//! The format-spec mini-language, shared by `format()`, f-string fields and
//! `str.format`.
//!
//! Supports:
//! - Integers: decimal, binary, octal, hex, sign, alternate form, grouping
//! - Floats: `e`, `f`, `g`, `%` and the default repr-like rendering
//! - Strings: precision truncation, width, alignment

use pytex_ir::format_spec::{parse_format_spec, Align, FormatType, ParsedFormatSpec, Sign};

use crate::errors::{type_error, value_error, EvalError, EvalResult, ExceptionKind};
use crate::methods::get_attribute;
use crate::subscript::get_item;
use crate::value::float_repr;
use crate::Value;

/// Format `value` according to `spec`, as `format(value, spec)` does.
pub fn format_value(value: &Value, spec: &str) -> EvalResult<String> {
    if spec.is_empty() {
        return Ok(value.to_str());
    }
    let parsed = parse_format_spec(spec).map_err(|err| value_error(err.to_string()))?;
    match value {
        Value::Int(_) | Value::Bool(_) => {
            let n = value.as_index().unwrap_or(0);
            match parsed.format_type {
                Some(ty) if ty.is_float() => Ok(format_float(n as f64, &parsed)),
                Some(FormatType::Str) => Err(unknown_code(FormatType::Str, value)),
                _ => Ok(format_int(n, &parsed)),
            }
        }
        Value::Float(f) => match parsed.format_type {
            Some(ty) if ty.is_integer_only() || ty == FormatType::Str => {
                Err(unknown_code(ty, value))
            }
            _ => Ok(format_float(*f, &parsed)),
        },
        Value::Str(s) => match parsed.format_type {
            None | Some(FormatType::Str) => format_str(s, &parsed),
            Some(ty) => Err(unknown_code(ty, value)),
        },
        _ => Err(type_error(format!(
            "unsupported format string passed to {}.__format__",
            value.type_name()
        ))),
    }
}

#[cold]
fn unknown_code(ty: FormatType, value: &Value) -> EvalError {
    value_error(format!(
        "Unknown format code '{}' for object of type '{}'",
        ty.as_char(),
        value.type_name()
    ))
}

fn format_int(n: i64, spec: &ParsedFormatSpec) -> String {
    let abs = n.unsigned_abs();
    let (digits, prefix, group_size) = match spec.format_type {
        Some(FormatType::Binary) => (format!("{abs:b}"), "0b", 4),
        Some(FormatType::Octal) => (format!("{abs:o}"), "0o", 4),
        Some(FormatType::Hex) => (format!("{abs:x}"), "0x", 4),
        Some(FormatType::HexUpper) => (format!("{abs:X}"), "0X", 4),
        _ => (abs.to_string(), "", 3),
    };
    let digits = match spec.grouping {
        Some(separator) => group_digits(&digits, separator, group_size),
        None => digits,
    };
    let prefix = if spec.alternate { prefix } else { "" };
    let sign = sign_str(n < 0, spec);
    pad_number(&format!("{sign}{prefix}"), &digits, spec)
}

fn format_float(f: f64, spec: &ParsedFormatSpec) -> String {
    let negative = f.is_sign_negative() && !f.is_nan();
    let abs = f.abs();
    let upper = matches!(
        spec.format_type,
        Some(FormatType::ExpUpper | FormatType::FixedUpper | FormatType::GeneralUpper)
    );

    let body = if abs.is_finite() {
        match spec.format_type {
            Some(FormatType::Exp | FormatType::ExpUpper) => {
                format_exp(abs, spec.precision.unwrap_or(6), spec.alternate)
            }
            Some(FormatType::Fixed | FormatType::FixedUpper) => {
                let precision = spec.precision.unwrap_or(6);
                with_point(format!("{abs:.precision$}"), spec.alternate && precision == 0)
            }
            Some(FormatType::Percent) => {
                let precision = spec.precision.unwrap_or(6);
                let pct = abs * 100.0;
                format!(
                    "{}%",
                    with_point(format!("{pct:.precision$}"), spec.alternate && precision == 0)
                )
            }
            Some(FormatType::General | FormatType::GeneralUpper | FormatType::Number) => {
                format_general(abs, spec.precision.unwrap_or(6), spec.alternate, false)
            }
            _ => match spec.precision {
                Some(precision) => format_general(abs, precision, spec.alternate, true),
                None => float_repr(abs),
            },
        }
    } else {
        let text = if abs.is_nan() { "nan" } else { "inf" };
        if spec.format_type == Some(FormatType::Percent) {
            format!("{text}%")
        } else {
            text.to_owned()
        }
    };
    let body = if upper { body.to_uppercase() } else { body };

    let body = match spec.grouping {
        Some(separator) if abs.is_finite() => {
            let split = body.find(|c: char| !c.is_ascii_digit()).unwrap_or(body.len());
            let (int_part, rest) = body.split_at(split);
            format!("{}{rest}", group_digits(int_part, separator, 3))
        }
        _ => body,
    };
    pad_number(sign_str(negative, spec), &body, spec)
}

fn with_point(mut text: String, force: bool) -> String {
    if force && !text.contains('.') {
        text.push('.');
    }
    text
}

/// `d.ddde+XX` with `precision` digits after the point.
fn format_exp(abs: f64, precision: usize, alternate: bool) -> String {
    let text = format!("{abs:.precision$e}");
    let (mantissa, exp) = text.split_once('e').unwrap_or((&text, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let mantissa = with_point(mantissa.to_owned(), alternate && precision == 0);
    let exp_sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{exp_sign}{:02}", exp.unsigned_abs())
}

/// General format: `precision` significant digits, scientific notation
/// only for very large or small exponents, trailing zeros removed.
/// `keep_point` keeps at least one fractional digit, as the untyped
/// form with a precision does.
fn format_general(abs: f64, precision: usize, alternate: bool, keep_point: bool) -> String {
    let precision = precision.max(1);
    if abs == 0.0 {
        return if alternate {
            format!("{:.*}", precision - 1, 0.0)
        } else if keep_point {
            "0.0".to_owned()
        } else {
            "0".to_owned()
        };
    }
    let sci = format!("{abs:.*e}", precision - 1);
    let exp: i32 = sci
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);

    if exp >= -4 && exp < precision as i32 {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        let fixed = format!("{abs:.decimals$}");
        if alternate {
            return with_point(fixed, true);
        }
        let trimmed = trim_fraction(&fixed);
        if keep_point && !trimmed.contains('.') {
            format!("{trimmed}.0")
        } else {
            trimmed
        }
    } else {
        let formatted = format_exp(abs, precision - 1, alternate);
        if alternate {
            return formatted;
        }
        let (mantissa, exp) = formatted.split_once('e').unwrap_or((&formatted, ""));
        format!("{}e{exp}", trim_fraction(mantissa))
    }
}

fn trim_fraction(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        text.to_owned()
    }
}

fn group_digits(digits: &str, separator: char, size: usize) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / size);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % size == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

fn format_str(s: &str, spec: &ParsedFormatSpec) -> EvalResult<String> {
    if spec.sign.is_some() {
        return Err(value_error("Sign not allowed in string format specifier"));
    }
    if spec.align == Some(Align::AfterSign) {
        return Err(value_error(
            "'=' alignment not allowed in string format specifier",
        ));
    }
    let truncated: String = match spec.precision {
        Some(precision) => s.chars().take(precision).collect(),
        None => s.to_owned(),
    };
    Ok(pad(&truncated, spec, Align::Left))
}

fn sign_str(negative: bool, spec: &ParsedFormatSpec) -> &'static str {
    if negative {
        "-"
    } else {
        match spec.sign {
            Some(Sign::Plus) => "+",
            Some(Sign::Space) => " ",
            Some(Sign::Minus) | None => "",
        }
    }
}

/// Pad a number; `0` in the spec means zero fill between sign and digits.
fn pad_number(sign: &str, digits: &str, spec: &ParsedFormatSpec) -> String {
    let mut spec = spec.clone();
    if spec.zero_pad && spec.fill.is_none() && spec.align.is_none() {
        spec.fill = Some('0');
        spec.align = Some(Align::AfterSign);
    }
    if spec.align == Some(Align::AfterSign) {
        let width = spec.width.unwrap_or(0);
        let len = sign.chars().count() + digits.chars().count();
        let fill: String =
            std::iter::repeat_n(spec.fill.unwrap_or(' '), width.saturating_sub(len)).collect();
        return format!("{sign}{fill}{digits}");
    }
    pad(&format!("{sign}{digits}"), &spec, Align::Right)
}

/// Apply width and alignment.
fn pad(s: &str, spec: &ParsedFormatSpec, default_align: Align) -> String {
    let Some(width) = spec.width else {
        return s.to_owned();
    };
    let len = s.chars().count();
    if len >= width {
        return s.to_owned();
    }
    let fill = spec.fill.unwrap_or(' ');
    let padding = width - len;
    let repeat = |n: usize| std::iter::repeat_n(fill, n).collect::<String>();
    match spec.align.unwrap_or(default_align) {
        Align::Left => format!("{s}{}", repeat(padding)),
        Align::Right | Align::AfterSign => format!("{}{s}", repeat(padding)),
        Align::Center => {
            let left = padding / 2;
            format!("{}{s}{}", repeat(left), repeat(padding - left))
        }
    }
}

/// `template.format(*args, **kwargs)`.
pub(crate) fn format_template(
    template: &str,
    args: &[Value],
    kwargs: &[(String, Value)],
) -> EvalResult<String> {
    let mut state = TemplateState {
        args,
        kwargs,
        next_auto: Some(0),
        manual: false,
    };
    state.render(template, 0)
}

struct TemplateState<'a> {
    args: &'a [Value],
    kwargs: &'a [(String, Value)],
    /// Next automatic field index; `None` once exhausted by overflow.
    next_auto: Option<usize>,
    manual: bool,
}

impl TemplateState<'_> {
    fn render(&mut self, template: &str, depth: usize) -> EvalResult<String> {
        if depth > 2 {
            return Err(value_error("Max string recursion exceeded"));
        }
        let mut out = String::new();
        let mut chars = template.char_indices().peekable();
        while let Some((start, c)) = chars.next() {
            match c {
                '{' if chars.peek().is_some_and(|&(_, next)| next == '{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek().is_some_and(|&(_, next)| next == '}') => {
                    chars.next();
                    out.push('}');
                }
                '}' => return Err(value_error("Single '}' encountered in format string")),
                '{' => {
                    let mut nesting = 1;
                    let mut end = None;
                    for (i, c) in chars.by_ref() {
                        match c {
                            '{' => nesting += 1,
                            '}' => {
                                nesting -= 1;
                                if nesting == 0 {
                                    end = Some(i);
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                    let end = end.ok_or_else(|| value_error("expected '}' before end of string"))?;
                    let field = &template[start + 1..end];
                    out.push_str(&self.render_field(field, depth)?);
                }
                c => out.push(c),
            }
        }
        Ok(out)
    }

    fn render_field(&mut self, field: &str, depth: usize) -> EvalResult<String> {
        let (name_part, spec) = split_outside_brackets(field, ':');
        let (name, conversion) = match split_outside_brackets(name_part, '!') {
            (name, Some(conversion)) => {
                let mut conv = conversion.chars();
                match (conv.next(), conv.next()) {
                    (Some(c @ ('r' | 's' | 'a')), None) => (name, Some(c)),
                    (Some(c), None) => {
                        return Err(value_error(format!("Unknown conversion specifier {c}")))
                    }
                    _ => {
                        return Err(value_error(
                            "expected ':' after conversion specifier",
                        ))
                    }
                }
            }
            (name, None) => (name, None),
        };

        let value = self.resolve(name)?;
        let value = match conversion {
            Some('r' | 'a') => Value::from(value.repr()),
            Some(_) => Value::from(value.to_str()),
            None => value,
        };
        let spec = match spec {
            Some(spec) if spec.contains('{') => self.render(spec, depth + 1)?,
            Some(spec) => spec.to_owned(),
            None => String::new(),
        };
        format_value(&value, &spec)
    }

    /// Field name: an index, a keyword, or empty for the next automatic
    /// index, then any `.attr` / `[key]` accessors.
    fn resolve(&mut self, name: &str) -> EvalResult {
        let head_end = name.find(['.', '[']).unwrap_or(name.len());
        let (head, mut rest) = name.split_at(head_end);

        let mut value = if head.is_empty() {
            if self.manual {
                return Err(value_error(
                    "cannot switch from manual field specification to automatic field numbering",
                ));
            }
            let index = self.next_auto.unwrap_or(usize::MAX);
            self.next_auto = index.checked_add(1);
            self.positional(index)?
        } else if let Ok(index) = head.parse::<usize>() {
            if self.next_auto != Some(0) {
                return Err(value_error(
                    "cannot switch from automatic field numbering to manual field specification",
                ));
            }
            self.manual = true;
            self.positional(index)?
        } else {
            self.kwargs
                .iter()
                .find(|(key, _)| key == head)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| EvalError::new(ExceptionKind::KeyError, format!("'{head}'")))?
        };

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('.') {
                let end = after.find(['.', '[']).unwrap_or(after.len());
                value = get_attribute(&value, &after[..end])?;
                rest = &after[end..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let end = after
                    .find(']')
                    .ok_or_else(|| value_error("Missing ']' in format string"))?;
                let key = &after[..end];
                let key = key
                    .parse::<i64>()
                    .map_or_else(|_| Value::from(key), Value::Int);
                value = get_item(&value, &key)?;
                rest = &after[end + 1..];
            } else {
                return Err(value_error(
                    "Only '.' or '[' may follow ']' in format field specifier",
                ));
            }
        }
        Ok(value)
    }

    fn positional(&self, index: usize) -> EvalResult {
        self.args.get(index).cloned().ok_or_else(|| {
            EvalError::new(
                ExceptionKind::IndexError,
                format!("Replacement index {index} out of range for positional args tuple"),
            )
        })
    }
}

/// Split at the first `separator` not inside `[...]`.
fn split_outside_brackets(text: &str, separator: char) -> (&str, Option<&str>) {
    let mut in_brackets = false;
    for (i, c) in text.char_indices() {
        match c {
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            c if c == separator && !in_brackets => {
                return (&text[..i], Some(&text[i + c.len_utf8()..]));
            }
            _ => {}
        }
    }
    (text, None)
}

#[cfg(test)]
mod tests;
