//! Source location spans.
//!
//! Byte ranges into the text a span of code came from. Offsets are stored as
//! `u32`; anything larger saturates instead of panicking, since documents are
//! user input.

use std::fmt;

/// Half-open byte range `start..end`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Placeholder span for synthesized nodes.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create from a `usize` byte range, saturating at `u32::MAX`.
    #[inline]
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        let start = u32::try_from(range.start).unwrap_or(u32::MAX);
        let end = u32::try_from(range.end).unwrap_or(u32::MAX);
        Span { start, end }
    }

    /// Zero-length span at `offset`.
    #[inline]
    pub fn point(offset: usize) -> Span {
        Self::from_range(offset..offset)
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    #[inline]
    pub fn to_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }

    /// 1-based line number of `start` within `source`.
    ///
    /// Offsets past the end of `source` report the last line.
    pub fn line_in(&self, source: &str) -> usize {
        let end = (self.start as usize).min(source.len());
        let prefix = source.get(..end).unwrap_or(source);
        count_newlines(prefix.as_bytes()) + 1
    }
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        let merged = Span::new(10, 20).merge(Span::new(15, 30));
        assert_eq!(merged, Span::new(10, 30));
        assert_eq!(merged.len(), 20);
    }

    #[test]
    fn from_range_saturates() {
        let span = Span::from_range(0..usize::MAX);
        assert_eq!(span.end, u32::MAX);
    }

    #[test]
    fn line_numbers_are_one_based() {
        let source = "a\nbb\nccc";
        assert_eq!(Span::point(0).line_in(source), 1);
        assert_eq!(Span::point(2).line_in(source), 2);
        assert_eq!(Span::point(5).line_in(source), 3);
        assert_eq!(Span::point(500).line_in(source), 3);
    }

    #[test]
    fn empty_and_debug() {
        assert!(Span::point(4).is_empty());
        assert_eq!(format!("{:?}", Span::new(1, 3)), "1..3");
    }
}
