//! Line lookup over document text.
//!
//! Offsets are byte offsets into the document; lines are 1-based.

use std::ops::Range;

/// Where a piece of text sits within a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextLocation {
    /// The text was found; the range is absolute within the document.
    Span(Range<usize>),
    /// The line exists but does not contain the text.
    LineOnly,
    /// The document has no such line.
    OutOfRange,
}

/// A document split into lines for offset computation.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> Document<'a> {
    /// Index the line starts of `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { text, line_starts }
    }

    /// Number of lines; a trailing newline opens a final empty line.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset at which the 1-based `line` starts.
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line.checked_sub(1)?).copied()
    }

    /// Text of the 1-based `line`, without its line terminator.
    #[must_use]
    pub fn line_text(&self, line: usize) -> Option<&'a str> {
        let start = self.line_start(line)?;
        let end = self
            .line_starts
            .get(line)
            .map_or(self.text.len(), |next| next.saturating_sub(1));
        let raw = self.text.get(start..end)?;
        Some(raw.strip_suffix('\r').unwrap_or(raw))
    }

    /// Locate the first occurrence of `needle` within the 1-based `line`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cuke_glue_server::markers::{Document, TextLocation};
    ///
    /// let doc = Document::new("Feature: f\n  Scenario: s\n  Given foo bar\n");
    /// assert_eq!(doc.locate(3, "foo bar"), TextLocation::Span(33..40));
    /// assert_eq!(doc.locate(3, "baz"), TextLocation::LineOnly);
    /// assert_eq!(doc.locate(9, "foo bar"), TextLocation::OutOfRange);
    /// ```
    #[must_use]
    pub fn locate(&self, line: usize, needle: &str) -> TextLocation {
        let (Some(start), Some(text)) = (self.line_start(line), self.line_text(line)) else {
            return TextLocation::OutOfRange;
        };
        text.find(needle).map_or(TextLocation::LineOnly, |index| {
            let begin = start + index;
            TextLocation::Span(begin..begin + needle.len())
        })
    }

    /// The document text.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }
}
