//! F-string bodies.
//!
//! The lexer hands over the raw text between the quotes. Here it is split
//! into literal pieces and `{expr!conv:spec}` fields; each field expression
//! is lexed and parsed on its own, with spans shifted back into the
//! enclosing source.

use pytex_ir::{Expr, FStringPart, Span, TokenKind};
use pytex_lexer::unescape;

use crate::{ParseError, Parser};

/// Split an f-string body into parts.
pub(crate) fn parse(
    source: &str,
    token_span: Span,
    body: &str,
    raw: bool,
) -> Result<Vec<FStringPart>, ParseError> {
    let splitter = Splitter {
        source,
        body,
        raw,
        base: body_offset(source, token_span),
        span: token_span,
    };
    splitter.parts(0, body.len())
}

/// Offset of the first body byte: past the prefix and opening quote(s).
fn body_offset(source: &str, span: Span) -> usize {
    let text = source.get(span.to_range()).unwrap_or("");
    let Some(quote_at) = text.find(&['"', '\''][..]) else {
        return span.start as usize;
    };
    let quote = &text[quote_at..=quote_at];
    let delimiter = if text[quote_at..].starts_with(&quote.repeat(3)) {
        3
    } else {
        1
    };
    span.start as usize + quote_at + delimiter
}

struct Splitter<'a> {
    source: &'a str,
    body: &'a str,
    raw: bool,
    base: usize,
    span: Span,
}

impl Splitter<'_> {
    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::FString {
            message: message.into(),
            span: self.span,
        }
    }

    fn text(&self, from: usize, to: usize) -> &str {
        self.body.get(from..to).unwrap_or("")
    }

    fn parts(&self, from: usize, to: usize) -> Result<Vec<FStringPart>, ParseError> {
        let bytes = self.body.as_bytes();
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut literal_start = from;
        let mut i = from;
        while i < to {
            match bytes[i] {
                b'{' | b'}' if i + 1 < to && bytes[i + 1] == bytes[i] => {
                    literal.push_str(self.text(literal_start, i + 1));
                    i += 2;
                    literal_start = i;
                }
                b'{' => {
                    literal.push_str(self.text(literal_start, i));
                    self.flush(&mut parts, &mut literal)?;
                    i = self.field(i, to, &mut parts)?;
                    literal_start = i;
                }
                b'}' => return Err(self.error("single '}' is not allowed")),
                _ => i += 1,
            }
        }
        literal.push_str(self.text(literal_start, to));
        self.flush(&mut parts, &mut literal)?;
        Ok(parts)
    }

    fn flush(&self, parts: &mut Vec<FStringPart>, literal: &mut String) -> Result<(), ParseError> {
        if literal.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(literal);
        let cooked = if self.raw {
            text
        } else {
            unescape(&text).map_err(|message| self.error(message))?
        };
        parts.push(FStringPart::Literal(cooked));
        Ok(())
    }

    /// Parse the field opening at `open`; returns the index after its `}`.
    fn field(
        &self,
        open: usize,
        to: usize,
        parts: &mut Vec<FStringPart>,
    ) -> Result<usize, ParseError> {
        let bytes = self.body.as_bytes();
        let mut i = open + 1;
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;
        while i < to {
            let b = bytes[i];
            if let Some(q) = quote {
                if b == q {
                    quote = None;
                }
                i += 1;
                continue;
            }
            match b {
                b'\'' | b'"' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                b'}' if depth > 0 => depth -= 1,
                b'}' | b':' if depth == 0 => break,
                b'!' if depth == 0 && bytes.get(i + 1) != Some(&b'=') => break,
                _ => {}
            }
            i += 1;
        }
        if i >= to {
            return Err(self.error("expecting '}'"));
        }

        let raw_expr = self.text(open + 1, i);
        let trimmed = raw_expr.trim_end();
        let self_documenting = trimmed.ends_with('=')
            && !["==", "!=", "<=", ">="]
                .iter()
                .any(|op| trimmed.ends_with(op));
        let expr_text = if self_documenting {
            parts.push(FStringPart::Literal(raw_expr.to_owned()));
            &trimmed[..trimmed.len() - 1]
        } else {
            raw_expr
        };
        if expr_text.trim().is_empty() {
            return Err(self.error("empty expression not allowed"));
        }
        let expr = self.sub_expression(expr_text, self.base + open + 1)?;

        let mut conversion = None;
        if bytes[i] == b'!' {
            match bytes.get(i + 1) {
                Some(b'r' | b'a') => conversion = Some('r'),
                Some(b's') => conversion = Some('s'),
                _ => {
                    return Err(
                        self.error("invalid conversion character: expected 's', 'r', or 'a'")
                    )
                }
            }
            i += 2;
        }

        let mut spec = Vec::new();
        if i < to && bytes[i] == b':' {
            let spec_start = i + 1;
            let mut depth = 0usize;
            i = spec_start;
            while i < to {
                match bytes[i] {
                    b'{' => depth += 1,
                    b'}' if depth == 0 => break,
                    b'}' => depth -= 1,
                    _ => {}
                }
                i += 1;
            }
            spec = self.parts(spec_start, i)?;
        }

        if i >= to || bytes[i] != b'}' {
            return Err(self.error("expecting '}'"));
        }
        if self_documenting && conversion.is_none() && spec.is_empty() {
            conversion = Some('r');
        }
        parts.push(FStringPart::Field {
            expr,
            conversion,
            spec,
        });
        Ok(i + 1)
    }

    /// Parse `text` (located at `offset` in the source) as one expression.
    ///
    /// The text is wrapped in parentheses so that leading whitespace and line
    /// breaks inside triple-quoted f-strings are insignificant.
    fn sub_expression(&self, text: &str, offset: usize) -> Result<Expr, ParseError> {
        let wrapped = format!("({text})");
        let mut tokens =
            pytex_lexer::lex(&wrapped).map_err(|err| self.error(err.to_string()))?;
        let shift = u32::try_from(offset.saturating_sub(1)).unwrap_or(u32::MAX);
        for token in &mut tokens {
            token.span = Span::new(
                token.span.start.saturating_add(shift),
                token.span.end.saturating_add(shift),
            );
        }
        let mut parser = Parser::new(self.source, tokens);
        parenthesized(&mut parser).map_err(|err| self.error(err.to_string()))
    }
}

fn parenthesized(parser: &mut Parser<'_>) -> Result<Expr, ParseError> {
    parser.expect(&TokenKind::LParen)?;
    let expr = parser.expression_list()?;
    parser.expect(&TokenKind::RParen)?;
    parser.skip_newlines();
    parser.expect_end()?;
    Ok(expr)
}
