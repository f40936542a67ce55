//! Lexer for the pytex embedded language.
//!
//! Turns source text into a flat token list. Line structure is resolved here:
//! the output carries explicit `Newline`, `Indent` and `Dedent` tokens, and
//! line breaks inside brackets or after a trailing backslash never reach the
//! parser.

mod cursor;
mod escape;

use pytex_ir::{Span, Token, TokenKind};

use cursor::Cursor;
pub use escape::unescape;

/// Tab stops are every 8 columns.
const TAB_WIDTH: usize = 8;

/// Lexing failure. Every variant is reported to user code as a
/// `SyntaxError` (or `IndentationError`, see [`LexError::is_indentation`]).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString { span: Span },
    #[error("unterminated triple-quoted string literal")]
    UnterminatedTripleString { span: Span },
    #[error("{message}")]
    InvalidEscape { message: String, span: Span },
    #[error("integer literal is too large")]
    IntOverflow { span: Span },
    #[error("invalid {kind} literal")]
    InvalidNumber { kind: &'static str, span: Span },
    #[error("leading zeros in decimal integer literals are not permitted")]
    LeadingZeros { span: Span },
    #[error("invalid character '{ch}' (U+{:04X})", u32::from(*ch))]
    InvalidCharacter { ch: char, span: Span },
    #[error("unexpected character after line continuation character")]
    BadContinuation { span: Span },
    #[error("unmatched '{close}'")]
    UnmatchedBracket { close: char, span: Span },
    #[error("closing parenthesis '{close}' does not match opening parenthesis '{open}'")]
    MismatchedBracket { open: char, close: char, span: Span },
    #[error("'{open}' was never closed")]
    UnclosedBracket { open: char, span: Span },
    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnterminatedString { span }
            | LexError::UnterminatedTripleString { span }
            | LexError::InvalidEscape { span, .. }
            | LexError::IntOverflow { span }
            | LexError::InvalidNumber { span, .. }
            | LexError::LeadingZeros { span }
            | LexError::InvalidCharacter { span, .. }
            | LexError::BadContinuation { span }
            | LexError::UnmatchedBracket { span, .. }
            | LexError::MismatchedBracket { span, .. }
            | LexError::UnclosedBracket { span, .. }
            | LexError::InconsistentDedent { span } => *span,
        }
    }

    /// Whether this is an indentation error rather than a plain syntax error.
    pub fn is_indentation(&self) -> bool {
        matches!(self, LexError::InconsistentDedent { .. })
    }
}

/// Lex `source` into tokens, ending with `Newline`, any pending `Dedent`s and
/// `Eof`.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
    /// Indentation widths of the open blocks; always starts with `0`.
    indents: Vec<usize>,
    /// Open brackets, innermost last.
    brackets: Vec<(u8, Span)>,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            cursor: Cursor::new(source),
            tokens: Vec::with_capacity(source.len() / 4 + 4),
            indents: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            if self.at_line_start && self.brackets.is_empty() {
                self.at_line_start = false;
                self.indentation()?;
            }
            self.cursor
                .eat_while(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\x0c'));
            if self.cursor.is_eof() {
                break;
            }
            let start = self.cursor.pos();
            match self.cursor.current() {
                b'#' => self.cursor.eat_until_newline_or_eof(),
                b'\n' => {
                    self.cursor.advance();
                    if self.brackets.is_empty() {
                        self.newline(Span::from_range(start..start + 1));
                        self.at_line_start = true;
                    }
                }
                b'\\' => self.continuation()?,
                b'0'..=b'9' => self.number()?,
                b'.' if self.cursor.peek().is_ascii_digit() => self.number()?,
                b'"' | b'\'' => self.string(start, false, false)?,
                _ => {
                    if let Some(c) = self.cursor.current_char() {
                        if is_name_start(c) {
                            self.name_or_prefixed_string()?;
                            continue;
                        }
                    }
                    self.operator()?;
                }
            }
        }

        if let Some(&(open, span)) = self.brackets.last() {
            return Err(LexError::UnclosedBracket {
                open: char::from(open),
                span,
            });
        }
        let end = Span::point(self.cursor.pos());
        self.newline(end);
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(TokenKind::Dedent, end);
        }
        self.push(TokenKind::Eof, end);
        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokenKind, span: Span) {
        self.tokens.push(Token::new(kind, span));
    }

    /// Emit `Newline` unless the current logical line is empty.
    fn newline(&mut self, span: Span) {
        let needed = self.tokens.last().is_some_and(|token| {
            !matches!(
                token.kind,
                TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
            )
        });
        if needed {
            self.push(TokenKind::Newline, span);
        }
    }

    /// Measure leading whitespace and emit `Indent`/`Dedent` tokens.
    ///
    /// Blank and comment-only lines do not affect indentation.
    fn indentation(&mut self) -> Result<(), LexError> {
        let start = self.cursor.pos();
        let mut width = 0;
        loop {
            match self.cursor.current() {
                b' ' => width += 1,
                b'\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                b'\x0c' => width = 0,
                _ => break,
            }
            self.cursor.advance();
        }
        if self.cursor.is_eof() || matches!(self.cursor.current(), b'#' | b'\n' | b'\r') {
            return Ok(());
        }

        let span = Span::from_range(start..self.cursor.pos());
        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            self.push(TokenKind::Indent, span);
        } else {
            while width < self.indents.last().copied().unwrap_or(0) {
                self.indents.pop();
                self.push(TokenKind::Dedent, span);
            }
            if width != self.indents.last().copied().unwrap_or(0) {
                return Err(LexError::InconsistentDedent { span });
            }
        }
        Ok(())
    }

    /// A backslash must be the last character on its line.
    fn continuation(&mut self) -> Result<(), LexError> {
        let start = self.cursor.pos();
        self.cursor.advance();
        if self.cursor.current() == b'\r' {
            self.cursor.advance();
        }
        if self.cursor.current() == b'\n' {
            self.cursor.advance();
            return Ok(());
        }
        Err(LexError::BadContinuation {
            span: Span::from_range(start..start + 1),
        })
    }

    fn name_or_prefixed_string(&mut self) -> Result<(), LexError> {
        let start = self.cursor.pos();
        while let Some(c) = self.cursor.current_char() {
            if !is_name_continue(c) {
                break;
            }
            self.cursor.advance_char();
        }
        let text = self.cursor.slice_from(start);

        if matches!(self.cursor.current(), b'"' | b'\'') {
            let lower = text.to_ascii_lowercase();
            let prefix = match lower.as_str() {
                "r" => Some((true, false)),
                "f" => Some((false, true)),
                "rf" | "fr" => Some((true, true)),
                _ => None,
            };
            if let Some((raw, formatted)) = prefix {
                return self.string(start, raw, formatted);
            }
        }

        let span = Span::from_range(start..self.cursor.pos());
        let kind = TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Name(text.to_owned()));
        self.push(kind, span);
        Ok(())
    }

    /// Lex a string literal; the cursor sits on the opening quote and
    /// `start` is the beginning of any prefix.
    fn string(&mut self, start: usize, raw: bool, formatted: bool) -> Result<(), LexError> {
        let quote = self.cursor.current();
        let triple = self.cursor.peek() == quote && self.cursor.peek_at(2) == quote;
        let delimiter_len = if triple { 3 } else { 1 };
        self.cursor.advance_n(delimiter_len);
        let body_start = self.cursor.pos();

        let body_end = loop {
            if self.cursor.is_eof() {
                let span = Span::from_range(start..self.cursor.pos());
                return Err(if triple {
                    LexError::UnterminatedTripleString { span }
                } else {
                    LexError::UnterminatedString { span }
                });
            }
            match self.cursor.current() {
                b'\\' => {
                    self.cursor.advance();
                    self.cursor.advance_char();
                }
                b'\n' if !triple => {
                    return Err(LexError::UnterminatedString {
                        span: Span::from_range(start..self.cursor.pos()),
                    });
                }
                b if b == quote
                    && (!triple
                        || (self.cursor.peek() == quote && self.cursor.peek_at(2) == quote)) =>
                {
                    let end = self.cursor.pos();
                    self.cursor.advance_n(delimiter_len);
                    break end;
                }
                _ => self.cursor.advance_char(),
            }
        };

        let body = self.cursor.slice(body_start, body_end);
        let span = Span::from_range(start..self.cursor.pos());
        let kind = if formatted {
            TokenKind::FString {
                body: body.to_owned(),
                raw,
            }
        } else if raw {
            TokenKind::Str(body.to_owned())
        } else {
            TokenKind::Str(unescape(body).map_err(|message| LexError::InvalidEscape { message, span })?)
        };
        self.push(kind, span);
        Ok(())
    }

    fn number(&mut self) -> Result<(), LexError> {
        let start = self.cursor.pos();
        let radix = match (self.cursor.current(), self.cursor.peek()) {
            (b'0', b'x' | b'X') => Some((16, "hexadecimal")),
            (b'0', b'o' | b'O') => Some((8, "octal")),
            (b'0', b'b' | b'B') => Some((2, "binary")),
            _ => None,
        };

        let kind = if let Some((radix, name)) = radix {
            self.cursor.advance_n(2);
            let digits_start = self.cursor.pos();
            self.cursor.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
            let span = Span::from_range(start..self.cursor.pos());
            let digits = self.cursor.slice_from(digits_start);
            let value = parse_digits(digits, radix, name, span)?;
            TokenKind::Int(value)
        } else {
            self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
            let mut is_float = false;
            if self.cursor.current() == b'.' {
                is_float = true;
                self.cursor.advance();
                self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
            }
            if matches!(self.cursor.current(), b'e' | b'E')
                && (self.cursor.peek().is_ascii_digit()
                    || (matches!(self.cursor.peek(), b'+' | b'-')
                        && self.cursor.peek_at(2).is_ascii_digit()))
            {
                is_float = true;
                self.cursor.advance_n(2);
                self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
            }
            let text = self.cursor.slice_from(start);
            let span = Span::from_range(start..self.cursor.pos());
            if text.contains("__") || text.ends_with('_') || text.contains("_.") {
                return Err(LexError::InvalidNumber {
                    kind: "decimal",
                    span,
                });
            }
            let cleaned = text.replace('_', "");
            if is_float {
                let value = cleaned.parse::<f64>().map_err(|_| LexError::InvalidNumber {
                    kind: "decimal",
                    span,
                })?;
                TokenKind::Float(value)
            } else {
                if cleaned.len() > 1
                    && cleaned.starts_with('0')
                    && cleaned.bytes().any(|b| b != b'0')
                {
                    return Err(LexError::LeadingZeros { span });
                }
                TokenKind::Int(parse_digits(&cleaned, 10, "decimal", span)?)
            }
        };

        if self
            .cursor
            .current_char()
            .is_some_and(|c| is_name_continue(c) || c == '.')
        {
            return Err(LexError::InvalidNumber {
                kind: "decimal",
                span: Span::from_range(start..self.cursor.pos() + 1),
            });
        }
        let span = Span::from_range(start..self.cursor.pos());
        self.push(kind, span);
        Ok(())
    }

    fn operator(&mut self) -> Result<(), LexError> {
        const THREE: [(&str, TokenKind); 2] = [
            ("//=", TokenKind::DoubleSlashEq),
            ("**=", TokenKind::DoubleStarEq),
        ];
        const TWO: [(&str, TokenKind); 11] = [
            ("**", TokenKind::DoubleStar),
            ("//", TokenKind::DoubleSlash),
            ("==", TokenKind::EqEq),
            ("!=", TokenKind::NotEq),
            ("<=", TokenKind::LtEq),
            (">=", TokenKind::GtEq),
            ("+=", TokenKind::PlusEq),
            ("-=", TokenKind::MinusEq),
            ("*=", TokenKind::StarEq),
            ("/=", TokenKind::SlashEq),
            ("%=", TokenKind::PercentEq),
        ];

        let start = self.cursor.pos();
        for (text, kind) in THREE.iter().chain(TWO.iter()) {
            if self.cursor.starts_with(text) {
                self.cursor.advance_n(text.len());
                self.push(kind.clone(), Span::from_range(start..self.cursor.pos()));
                return Ok(());
            }
        }

        let byte = self.cursor.current();
        let span = Span::from_range(start..start + 1);
        let kind = match byte {
            b'(' | b'[' | b'{' => {
                self.brackets.push((byte, span));
                match byte {
                    b'(' => TokenKind::LParen,
                    b'[' => TokenKind::LBracket,
                    _ => TokenKind::LBrace,
                }
            }
            b')' | b']' | b'}' => {
                self.close_bracket(byte, span)?;
                match byte {
                    b')' => TokenKind::RParen,
                    b']' => TokenKind::RBracket,
                    _ => TokenKind::RBrace,
                }
            }
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'.' => TokenKind::Dot,
            b';' => TokenKind::Semicolon,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'=' => TokenKind::Eq,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            _ => {
                let ch = self.cursor.current_char().unwrap_or('\0');
                return Err(LexError::InvalidCharacter {
                    ch,
                    span: Span::from_range(start..start + ch.len_utf8()),
                });
            }
        };
        self.cursor.advance();
        self.push(kind, span);
        Ok(())
    }

    fn close_bracket(&mut self, close: u8, span: Span) -> Result<(), LexError> {
        let expected_open = match close {
            b')' => b'(',
            b']' => b'[',
            _ => b'{',
        };
        match self.brackets.pop() {
            Some((open, _)) if open == expected_open => Ok(()),
            Some((open, _)) => Err(LexError::MismatchedBracket {
                open: char::from(open),
                close: char::from(close),
                span,
            }),
            None => Err(LexError::UnmatchedBracket {
                close: char::from(close),
                span,
            }),
        }
    }
}

fn parse_digits(digits: &str, radix: u32, kind: &'static str, span: Span) -> Result<i64, LexError> {
    let invalid = || LexError::InvalidNumber { kind, span };
    if digits.is_empty()
        || digits.starts_with('_') && radix == 10
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err(invalid());
    }
    let cleaned = digits.strip_prefix('_').unwrap_or(digits).replace('_', "");
    if !cleaned.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }
    i64::from_str_radix(&cleaned, radix).map_err(|_| LexError::IntOverflow { span })
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
