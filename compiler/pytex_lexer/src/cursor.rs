//! Byte cursor over the source text.
//!
//! The lexer only branches on ASCII bytes; non-ASCII characters are consumed
//! whole through [`Cursor::current_char`] so that slices always land on char
//! boundaries.

use memchr::memchr;

pub(crate) struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Cursor { source, pos: 0 }
    }

    /// Current byte, or `0` at end of input.
    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.peek_at(0)
    }

    #[inline]
    pub(crate) fn peek(&self) -> u8 {
        self.peek_at(1)
    }

    #[inline]
    pub(crate) fn peek_at(&self, offset: usize) -> u8 {
        self.source
            .as_bytes()
            .get(self.pos + offset)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn current_char(&self) -> Option<char> {
        self.source.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.advance_n(1);
    }

    #[inline]
    pub(crate) fn advance_n(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.source.len());
    }

    /// Advance past the current character, whatever its UTF-8 width.
    pub(crate) fn advance_char(&mut self) {
        let width = self.current_char().map_or(1, char::len_utf8);
        self.advance_n(width);
    }

    pub(crate) fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Skip to the next `\n` (not consumed) or end of input.
    pub(crate) fn eat_until_newline_or_eof(&mut self) {
        let rest = &self.source.as_bytes()[self.pos..];
        self.pos += memchr(b'\n', rest).unwrap_or(rest.len());
    }

    pub(crate) fn starts_with(&self, text: &str) -> bool {
        self.source
            .get(self.pos..)
            .is_some_and(|rest| rest.starts_with(text))
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or("")
    }

    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        self.slice(start, self.pos)
    }
}
