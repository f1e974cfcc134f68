//! Document analysis helpers shared by the providers.
//!
//! Bridges byte-offset spans to LSP positions (0-based lines, UTF-16 code
//! units per the LSP spec) and caches the most recent parse so repeated
//! requests against identical text skip re-parsing.

use std::sync::Mutex;

use tower_lsp::lsp_types::{Position, Range};

use flux_common::span::Span;
use flux_parser::Parse;
use flux_types::FileSemantics;

/// The result of analyzing one document.
pub struct DocumentAnalysis {
    /// The parse result, kept for node-path queries.
    pub parse: Parse,
    /// Per-file semantic tables (named types, enums, literal typing).
    pub semantics: FileSemantics,
}

/// Cache of the most recent (text, parse) pair. Identical text returns the
/// cached tree; the parse is deterministic so this is purely a shortcut.
static PARSE_CACHE: Mutex<Option<(String, Parse)>> = Mutex::new(None);

/// Parse a document, reusing the cached tree on an exact text match.
pub fn parse_document(text: &str) -> Parse {
    {
        let cache = PARSE_CACHE.lock().unwrap();
        if let Some((cached_text, parse)) = cache.as_ref() {
            if cached_text.len() == text.len() && cached_text == text {
                return parse.clone();
            }
        }
    }
    let parse = flux_parser::parse(text);
    *PARSE_CACHE.lock().unwrap() = Some((text.to_string(), parse.clone()));
    parse
}

/// Analyze a document: parse (cached) and derive semantic tables.
pub fn analyze_document(text: &str) -> DocumentAnalysis {
    let parse = parse_document(text);
    let semantics = FileSemantics::analyze(&parse);
    DocumentAnalysis { parse, semantics }
}

/// Convert a byte offset to an LSP Position (0-based line, UTF-16 column).
pub fn offset_to_position(source: &str, offset: usize) -> Position {
    let offset = offset.min(source.len());
    let before = &source[..offset];

    let line = before.matches('\n').count() as u32;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_text = &source[line_start..offset];

    let character: u32 = line_text.chars().map(|c| c.len_utf16() as u32).sum();

    Position { line, character }
}

/// Convert an LSP Position back to a byte offset in the source.
pub fn position_to_offset(source: &str, position: &Position) -> Option<usize> {
    let mut line_start = 0usize;
    for _ in 0..position.line {
        let rest = &source[line_start..];
        line_start += rest.find('\n')? + 1;
    }

    let line_text = &source[line_start..];
    let mut utf16_offset = 0u32;
    for (byte_idx, c) in line_text.char_indices() {
        if c == '\n' || utf16_offset >= position.character {
            return Some(line_start + byte_idx);
        }
        utf16_offset += c.len_utf16() as u32;
    }
    Some(source.len())
}

/// Convert a byte span to an LSP range.
pub fn span_to_range(source: &str, span: Span) -> Range {
    Range::new(
        offset_to_position(source, span.start as usize),
        offset_to_position(source, span.end as usize),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_position_round_trip_ascii() {
        let source = "ab\ncd\nef";
        for offset in 0..=source.len() {
            let position = offset_to_position(source, offset);
            assert_eq!(
                position_to_offset(source, &position),
                Some(offset),
                "offset {offset}"
            );
        }
    }

    #[test]
    fn position_counts_utf16_units() {
        // '𝕊' is 2 UTF-16 code units and 4 UTF-8 bytes.
        let source = "\u{1D54A}x";
        let position = offset_to_position(source, 4);
        assert_eq!(position, Position::new(0, 2));
        assert_eq!(position_to_offset(source, &position), Some(4));
    }

    #[test]
    fn position_past_last_line_is_none() {
        let source = "a\nb";
        assert!(position_to_offset(source, &Position::new(5, 0)).is_none());
    }

    #[test]
    fn position_past_line_end_clamps_to_newline() {
        let source = "ab\ncd";
        assert_eq!(
            position_to_offset(source, &Position::new(0, 99)),
            Some(2)
        );
    }

    #[test]
    fn parse_cache_returns_identical_tree() {
        let a = parse_document("const x = 1;");
        let b = parse_document("const x = 1;");
        // Same green node pointer-wise text; structural equality is enough.
        assert_eq!(
            a.syntax().text().to_string(),
            b.syntax().text().to_string()
        );
    }
}
