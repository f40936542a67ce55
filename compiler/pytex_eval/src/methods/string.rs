//! `str` methods. Indices and widths count characters, not bytes.

use std::rc::Rc;

use crate::errors::{no_attribute, type_error, value_error, EvalResult};
use crate::format::format_template;
use crate::interpreter::Args;
use crate::iter::iterate;
use crate::Value;

pub(super) fn call(s: &Rc<str>, name: &str, mut args: Args) -> EvalResult {
    match name {
        "upper" => {
            args.expect(name, 0, 0)?;
            Ok(Value::from(s.to_uppercase()))
        }
        "lower" => {
            args.expect(name, 0, 0)?;
            Ok(Value::from(s.to_lowercase()))
        }
        "strip" | "lstrip" | "rstrip" => {
            args.expect(name, 0, 1)?;
            let chars = optional_str(args.positional.first(), name)?;
            let matches = |c: char| match &chars {
                Some(chars) => chars.contains(c),
                None => c.is_whitespace(),
            };
            let stripped = match name {
                "strip" => s.trim_matches(matches),
                "lstrip" => s.trim_start_matches(matches),
                _ => s.trim_end_matches(matches),
            };
            Ok(Value::str(stripped))
        }
        "split" => {
            let sep = args.take_keyword("sep");
            let maxsplit = args.take_keyword("maxsplit");
            args.expect(name, 0, 2)?;
            let mut positional = args.positional.into_iter();
            let sep = sep.or_else(|| positional.next());
            let maxsplit = maxsplit.or_else(|| positional.next());
            let maxsplit = match maxsplit {
                Some(value) => value
                    .as_index()
                    .ok_or_else(|| type_error("'maxsplit' must be an integer"))?,
                None => -1,
            };
            let limit = usize::try_from(maxsplit).ok();
            let parts = match optional_str(sep.as_ref(), name)? {
                Some(sep) if sep.is_empty() => return Err(value_error("empty separator")),
                Some(sep) => match limit {
                    Some(limit) => s.splitn(limit + 1, sep.as_str()).map(Value::str).collect(),
                    None => s.split(sep.as_str()).map(Value::str).collect(),
                },
                None => split_whitespace(s, limit),
            };
            Ok(Value::list(parts))
        }
        "join" => {
            let [iterable] = args.exact::<1>(name)?;
            let mut out = String::new();
            for (i, item) in iterate(&iterable)?.enumerate() {
                let Value::Str(item) = item else {
                    return Err(type_error(format!(
                        "sequence item {i}: expected str instance, {} found",
                        item.type_name()
                    )));
                };
                if i > 0 {
                    out.push_str(s);
                }
                out.push_str(&item);
            }
            Ok(Value::from(out))
        }
        "replace" => {
            args.expect(name, 2, 3)?;
            let old = required_str(&args.positional[0], name)?;
            let new = required_str(&args.positional[1], name)?;
            let count = args.positional.get(2).and_then(Value::as_index).unwrap_or(-1);
            let replaced = match usize::try_from(count) {
                Ok(count) => s.replacen(old.as_str(), &new, count),
                Err(_) => s.replace(old.as_str(), &new),
            };
            Ok(Value::from(replaced))
        }
        "startswith" | "endswith" => {
            let [affix] = args.exact::<1>(name)?;
            let candidates = match &affix {
                Value::Tuple(items) => items.to_vec(),
                _ => vec![affix.clone()],
            };
            for candidate in candidates {
                let Value::Str(candidate) = candidate else {
                    return Err(type_error(format!(
                        "{name} first arg must be str or a tuple of str, not {}",
                        candidate.type_name()
                    )));
                };
                let hit = if name == "startswith" {
                    s.starts_with(&*candidate)
                } else {
                    s.ends_with(&*candidate)
                };
                if hit {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        "find" => {
            let [sub] = args.exact::<1>(name)?;
            let sub = required_str(&sub, name)?;
            let index = s
                .find(sub.as_str())
                .map_or(-1, |byte| s[..byte].chars().count() as i64);
            Ok(Value::Int(index))
        }
        "count" => {
            let [sub] = args.exact::<1>(name)?;
            let sub = required_str(&sub, name)?;
            let count = if sub.is_empty() {
                s.chars().count() + 1
            } else {
                s.matches(sub.as_str()).count()
            };
            Ok(Value::Int(count as i64))
        }
        "format" => Ok(Value::from(format_template(
            s,
            &args.positional,
            &args.keywords,
        )?)),
        "capitalize" => {
            args.expect(name, 0, 0)?;
            let mut chars = s.chars();
            let capitalized = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            };
            Ok(Value::from(capitalized))
        }
        "title" => {
            args.expect(name, 0, 0)?;
            let mut out = String::with_capacity(s.len());
            let mut previous_cased = false;
            for c in s.chars() {
                if previous_cased {
                    out.extend(c.to_lowercase());
                } else {
                    out.extend(c.to_uppercase());
                }
                previous_cased = c.is_alphabetic();
            }
            Ok(Value::from(out))
        }
        "center" | "ljust" | "rjust" => {
            args.expect(name, 1, 2)?;
            let width = args.positional[0]
                .as_index()
                .ok_or_else(|| type_error("'width' must be an integer"))?;
            let fill = match args.positional.get(1) {
                Some(Value::Str(fill)) if fill.chars().count() == 1 => fill.chars().next().unwrap_or(' '),
                Some(_) => {
                    return Err(type_error(
                        "The fill character must be exactly one character long",
                    ))
                }
                None => ' ',
            };
            Ok(Value::from(justify(s, name, width, fill)))
        }
        "zfill" => {
            let [width] = args.exact::<1>(name)?;
            let width = width
                .as_index()
                .ok_or_else(|| type_error("'width' must be an integer"))?;
            let len = s.chars().count() as i64;
            if width <= len {
                return Ok(Value::Str(Rc::clone(s)));
            }
            let zeros = "0".repeat((width - len) as usize);
            let filled = match s.chars().next() {
                Some(sign @ ('+' | '-')) => format!("{sign}{zeros}{}", &s[1..]),
                _ => format!("{zeros}{s}"),
            };
            Ok(Value::from(filled))
        }
        "splitlines" => {
            args.expect(name, 0, 0)?;
            Ok(Value::list(split_lines(s).into_iter().map(Value::str).collect()))
        }
        "isdigit" => {
            args.expect(name, 0, 0)?;
            Ok(Value::Bool(!s.is_empty() && s.chars().all(char::is_numeric)))
        }
        "isalpha" => {
            args.expect(name, 0, 0)?;
            Ok(Value::Bool(!s.is_empty() && s.chars().all(char::is_alphabetic)))
        }
        _ => Err(no_attribute(&Value::Str(Rc::clone(s)), name)),
    }
}

fn required_str(value: &Value, method: &str) -> EvalResult<String> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        _ => Err(type_error(format!(
            "{method}() argument must be str, not {}",
            value.type_name()
        ))),
    }
}

fn optional_str(value: Option<&Value>, method: &str) -> EvalResult<Option<String>> {
    match value {
        None | Some(Value::None) => Ok(None),
        Some(value) => required_str(value, method).map(Some),
    }
}

/// Split on runs of whitespace, at most `limit` times.
fn split_whitespace(s: &str, limit: Option<usize>) -> Vec<Value> {
    let mut parts = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if limit.is_some_and(|limit| parts.len() >= limit) {
            parts.push(Value::str(rest.trim_end()));
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        parts.push(Value::str(&rest[..end]));
        rest = rest[end..].trim_start();
    }
    parts
}

/// Lines split on `\n`, `\r\n` or `\r`, without their terminators.
fn split_lines(s: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&s[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&s[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < s.len() {
        lines.push(&s[start..]);
    }
    lines
}

fn justify(s: &str, method: &str, width: i64, fill: char) -> String {
    let len = s.chars().count() as i64;
    if width <= len {
        return s.to_owned();
    }
    let padding = (width - len) as usize;
    let repeat = |n: usize| std::iter::repeat_n(fill, n).collect::<String>();
    match method {
        "ljust" => format!("{s}{}", repeat(padding)),
        "rjust" => format!("{}{s}", repeat(padding)),
        _ => {
            let left = padding / 2 + (padding & width as usize & 1);
            format!("{}{s}{}", repeat(left), repeat(padding - left))
        }
    }
}
