//! Backslash escape processing for string literals.

/// Process backslash escapes in the body of a non-raw string literal.
///
/// Unknown escapes are kept verbatim (`"\q"` stays two characters). A
/// backslash before a newline joins the lines.
pub fn unescape(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };
        match escape {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0'..='7' => {
                let mut value = escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            'x' => out.push(hex_escape(&mut chars, 2, "\\xXX")?),
            'u' => out.push(hex_escape(&mut chars, 4, "\\uXXXX")?),
            'U' => out.push(hex_escape(&mut chars, 8, "\\UXXXXXXXX")?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    form: &str,
) -> Result<char, String> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let digit = chars
            .peek()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| format!("(unicode error) truncated {form} escape"))?;
        chars.next();
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| "(unicode error) illegal Unicode character".to_owned())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::unescape;

    #[test]
    fn simple_escapes() {
        assert_eq!(unescape(r"a\nb\tc\\d").as_deref(), Ok("a\nb\tc\\d"));
        assert_eq!(unescape(r#"\"\'"#).as_deref(), Ok("\"'"));
    }

    #[test]
    fn unknown_escape_is_kept() {
        assert_eq!(unescape(r"\section").as_deref(), Ok("\\section"));
        assert_eq!(unescape(r"\LaTeX").as_deref(), Ok("\\LaTeX"));
    }

    #[test]
    fn numeric_escapes() {
        assert_eq!(unescape(r"\x41é\U0001F40D\101\0").as_deref(), Ok("Aé🐍A\0"));
    }

    #[test]
    fn truncated_hex_escape() {
        assert!(unescape(r"\x4").is_err());
        assert!(unescape(r"\u12").is_err());
    }

    #[test]
    fn line_continuation_inside_string() {
        assert_eq!(unescape("ab\\\ncd").as_deref(), Ok("abcd"));
    }
}
