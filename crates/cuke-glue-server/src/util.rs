//! Shared helpers for LSP position handling.
//!
//! Markers carry byte offsets; the LSP speaks 0-based lines and UTF-16
//! columns. The conversions live here so both the builder and the handlers
//! can reach them.

use std::ops::Range;

use lsp_types::Position;

/// Calculate UTF-16 code units for a character.
///
/// # Examples
///
/// ```
/// use cuke_glue_server::util::utf16_code_units;
///
/// assert_eq!(utf16_code_units('a'), 1);
/// assert_eq!(utf16_code_units('é'), 1);
/// assert_eq!(utf16_code_units('🦀'), 2);
/// ```
#[inline]
#[must_use]
pub fn utf16_code_units(ch: char) -> u32 {
    if u32::from(ch) <= 0xFFFF { 1 } else { 2 }
}

/// Convert a byte offset into an LSP position.
///
/// Offsets past the end of `source` clamp to the end; offsets inside a
/// multi-byte character count that character.
///
/// # Examples
///
/// ```
/// use cuke_glue_server::util::byte_offset_to_position;
///
/// let source = "Feature: café\n  Given ok\n";
/// let position = byte_offset_to_position(source, 17);
/// assert_eq!((position.line, position.character), (1, 2));
/// ```
#[must_use]
pub fn byte_offset_to_position(source: &str, byte_offset: usize) -> Position {
    let mut line = 0u32;
    let mut character = 0u32;
    for (index, ch) in source.char_indices() {
        if index >= byte_offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            character = 0;
        } else {
            character += utf16_code_units(ch);
        }
    }
    Position::new(line, character)
}

/// Convert a byte range into an LSP range.
#[must_use]
pub fn byte_range_to_lsp_range(source: &str, range: &Range<usize>) -> lsp_types::Range {
    lsp_types::Range::new(
        byte_offset_to_position(source, range.start),
        byte_offset_to_position(source, range.end),
    )
}

/// UTF-16 length of the 0-based `line` in `source`, `0` when absent.
#[must_use]
pub fn line_length_utf16(source: &str, line: usize) -> u32 {
    source
        .lines()
        .nth(line)
        .map_or(0, |text| text.trim_end_matches('\r').chars().map(utf16_code_units).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case('\u{FFFF}', 1)]
    #[case('\u{10000}', 2)]
    #[case('日', 1)]
    fn counts_code_units_at_plane_boundaries(#[case] ch: char, #[case] expected: u32) {
        assert_eq!(utf16_code_units(ch), expected);
    }

    #[rstest]
    #[case(0, (0, 0))]
    #[case(9, (0, 9))]
    #[case(14, (1, 0))]
    #[case(500, (2, 0))]
    fn positions_ascii_offsets(#[case] offset: usize, #[case] expected: (u32, u32)) {
        let source = "Feature: demo\n  Scenario: s\n";
        let position = byte_offset_to_position(source, offset);
        assert_eq!((position.line, position.character), expected);
    }

    #[test]
    fn counts_surrogate_pairs_as_two_columns() {
        let source = "Given 🦀 walks";
        let start = source.find("walks").unwrap_or_default();
        let range = byte_range_to_lsp_range(source, &(start..source.len()));
        assert_eq!(range.start, Position::new(0, 9));
        assert_eq!(range.end, Position::new(0, 14));
    }

    #[test]
    fn measures_line_length_without_carriage_return() {
        assert_eq!(line_length_utf16("a\r\nGiven é\r\n", 1), 7);
        assert_eq!(line_length_utf16("a\n", 4), 0);
    }
}
