//! Pytex Segment - splitting a document at its code delimiters.
//!
//! A pytex document is typesetting markup with code blocks fenced by
//! [`DELIMITER`]. Every delimiter toggles between literal and executable
//! mode, starting in literal mode:
//!
//! ```text
//! Some LaTeX 🐍print("hi")🐍 more LaTeX
//! └ literal ┘ └ executable ┘└ literal ┘
//! ```
//!
//! Each executable segment is preceded by exactly one literal segment, which
//! may be empty. Text after the last delimiter becomes a final literal
//! segment only when it is non-empty. An unmatched final delimiter opens an
//! executable segment that runs to the end of the document and is marked
//! unterminated.
//!
//! Segmentation never depends on execution, so [`segment`] can run eagerly
//! before any code does; [`segments`] is the lazy form.

use std::fmt;
use std::iter::FusedIterator;

use memchr::memmem::Finder;
use pytex_ir::Span;

/// The code fence: U+1F40D SNAKE.
pub const DELIMITER: &str = "\u{1F40D}";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Markup copied to the output unchanged.
    Literal,
    /// Code whose standard output replaces it.
    Executable,
}

impl SegmentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Literal => "literal",
            SegmentKind::Executable => "executable",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run of document text between delimiters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    kind: SegmentKind,
    text: &'a str,
    span: Span,
    terminated: bool,
}

impl<'a> Segment<'a> {
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn is_executable(&self) -> bool {
        self.kind == SegmentKind::Executable
    }

    pub fn is_literal(&self) -> bool {
        self.kind == SegmentKind::Literal
    }

    /// The segment's text, delimiters excluded.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte range of [`Segment::text`] in the document.
    pub fn span(&self) -> Span {
        self.span
    }

    /// False only for an executable segment opened by an unmatched final
    /// delimiter.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Append the document text this segment came from, delimiters included.
    pub fn write_source(&self, out: &mut String) {
        match self.kind {
            SegmentKind::Literal => out.push_str(self.text),
            SegmentKind::Executable => {
                out.push_str(DELIMITER);
                out.push_str(self.text);
                if self.terminated {
                    out.push_str(DELIMITER);
                }
            }
        }
    }
}

/// Where the scan resumes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    Literal,
    Executable,
    Done,
}

/// Lazy segmentation of a document, in document order.
pub struct Segments<'a> {
    document: &'a str,
    finder: Finder<'static>,
    pos: usize,
    mode: Mode,
}

impl<'a> Segments<'a> {
    pub fn new(document: &'a str) -> Self {
        Segments {
            document,
            finder: Finder::new(DELIMITER),
            pos: 0,
            mode: Mode::Literal,
        }
    }

    fn make(&self, kind: SegmentKind, end: usize, terminated: bool) -> Segment<'a> {
        let segment = Segment {
            kind,
            text: &self.document[self.pos..end],
            span: Span::from_range(self.pos..end),
            terminated,
        };
        tracing::trace!(
            kind = %segment.kind,
            start = self.pos,
            end,
            "segment"
        );
        segment
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        let kind = match self.mode {
            Mode::Literal => SegmentKind::Literal,
            Mode::Executable => SegmentKind::Executable,
            Mode::Done => return None,
        };
        let found = self
            .finder
            .find(&self.document.as_bytes()[self.pos..])
            .map(|offset| self.pos + offset);

        let segment = match (found, kind) {
            (Some(end), _) => {
                let segment = self.make(kind, end, true);
                self.pos = end + DELIMITER.len();
                self.mode = match kind {
                    SegmentKind::Literal => Mode::Executable,
                    SegmentKind::Executable => Mode::Literal,
                };
                segment
            }
            (None, SegmentKind::Literal) => {
                self.mode = Mode::Done;
                if self.pos == self.document.len() {
                    return None;
                }
                self.make(kind, self.document.len(), true)
            }
            (None, SegmentKind::Executable) => {
                self.mode = Mode::Done;
                tracing::warn!(
                    offset = self.pos.saturating_sub(DELIMITER.len()),
                    "unterminated code block runs to the end of the document"
                );
                self.make(kind, self.document.len(), false)
            }
        };
        Some(segment)
    }
}

impl FusedIterator for Segments<'_> {}

/// Lazily split `document` into segments.
pub fn segments(document: &str) -> Segments<'_> {
    Segments::new(document)
}

/// Split `document` into segments.
pub fn segment(document: &str) -> Vec<Segment<'_>> {
    let segments: Vec<_> = segments(document).collect();
    tracing::debug!(
        segments = segments.len(),
        executable = segments.iter().filter(|s| s.is_executable()).count(),
        "segmented document"
    );
    segments
}

#[cfg(test)]
mod tests;
