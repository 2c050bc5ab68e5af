//! Position reconciler: source text + token stream -> highlighted markup.
//!
//! The lexer reports each token with only `end_line` and `start_column`; the
//! source is a linear character stream. This module walks both at once with a
//! `(line, column)` cursor and emits, in order:
//! * escaped *gap* text for any region no token covers,
//! * escaped token text, wrapped in `<span class="...">` when the token's kind
//!   has a presentation class.
//!
//! Invariants (hold after every emitted fragment):
//! * The de-escaped visible text of everything emitted so far equals the
//!   source prefix ending at the cursor. At the end of a pass it equals the
//!   whole source, for ANY token stream (empty, overlapping, out of range,
//!   wrong text).
//! * The cursor never moves backward.
//! * Every fragment is escaped exactly once; span tags are the only raw markup.
//!
//! Token acceptance: after gap filling up to the token's reported start, a
//! token is emitted only if the source at the cursor actually begins with the
//! token's text. Overlapping tokens (reported start before the cursor) skip
//! gap filling and go through the same check at the current cursor. A token
//! that fails the check is dropped and its characters later surface as gap
//! text. Columns count UTF-16 code units, the unit the lexer reports in; a
//! column inside a surrogate pair resolves to the next character boundary.
//! Positions past the end of a line or of the source are clamped.

use crate::escape::escape_into;
use crate::style::StyleMap;
use core_lexer::Token;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Completed reconciliation passes.
pub static RECONCILE_PASSES: AtomicU64 = AtomicU64::new(0);
/// Tokens dropped because their text did not match the source at the cursor.
pub static TOKENS_REJECTED: AtomicU64 = AtomicU64::new(0);

/// 1-indexed `(line, column)` position. Field order makes the derived `Ord`
/// lexicographic (line first), which is what "precedes" means here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub const fn origin() -> Self {
        Self::new(1, 1)
    }

    /// Reported start of a token.
    pub fn token_start(token: &Token) -> Self {
        Self::new(token.start_line(), token.start_column)
    }

    /// Move past `text`: `k` embedded newlines advance the line by `k` and put
    /// the column one past the final segment; otherwise the column advances by
    /// the text length in UTF-16 units.
    pub fn advance_over(&mut self, text: &str) {
        match text.rfind('\n') {
            Some(last_nl) => {
                self.line += text.bytes().filter(|b| *b == b'\n').count();
                self.column = utf16_len(&text[last_nl + 1..]) + 1;
            }
            None => self.column += utf16_len(text),
        }
    }
}

/// Source split into lines with byte offsets, for cursor <-> offset mapping.
struct SourceLines<'a> {
    source: &'a str,
    lines: Vec<&'a str>,
    starts: Vec<usize>,
}

impl<'a> SourceLines<'a> {
    fn new(source: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut starts = Vec::new();
        let mut offset = 0;
        for line in source.split('\n') {
            starts.push(offset);
            offset += line.len() + 1;
            lines.push(line);
        }
        Self {
            source,
            lines,
            starts,
        }
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, line: usize) -> Option<&'a str> {
        line.checked_sub(1).and_then(|i| self.lines.get(i)).copied()
    }

    /// Byte offset of the cursor inside the whole source, clamped to bounds.
    fn offset(&self, at: Cursor) -> usize {
        match self.line(at.line) {
            Some(text) => self.starts[at.line - 1] + byte_col(text, at.column),
            None if at.line == 0 => 0,
            None => self.source.len(),
        }
    }
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Byte index of 1-indexed UTF-16 `column` within `line`, clamped to the line
/// end.
fn byte_col(line: &str, column: usize) -> usize {
    let target = column.saturating_sub(1);
    let mut units = 0;
    for (i, c) in line.char_indices() {
        if units >= target {
            return i;
        }
        units += c.len_utf16();
    }
    line.len()
}

/// Reconciles token streams against source text using a shared style table.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'s> {
    styles: &'s StyleMap,
}

impl<'s> Reconciler<'s> {
    pub fn new(styles: &'s StyleMap) -> Self {
        Self { styles }
    }

    /// Run one reconciliation pass. Never fails; see module docs.
    pub fn reconcile(&self, source: &str, tokens: &[Token]) -> String {
        let mut pass = Pass {
            src: SourceLines::new(source),
            styles: self.styles,
            cursor: Cursor::origin(),
            out: String::with_capacity(source.len() + source.len() / 2),
            rejected: 0,
        };
        for token in tokens {
            let start = Cursor::token_start(token);
            if pass.cursor < start {
                pass.fill_gap(start);
            }
            pass.emit_token(token);
        }
        pass.flush();

        RECONCILE_PASSES.fetch_add(1, Ordering::Relaxed);
        if pass.rejected > 0 {
            TOKENS_REJECTED.fetch_add(pass.rejected, Ordering::Relaxed);
        }
        trace!(
            target: "render.reconcile",
            tokens = tokens.len(),
            rejected = pass.rejected,
            source_len = source.len(),
            markup_len = pass.out.len(),
            "reconcile_pass"
        );
        pass.out
    }
}

/// Convenience wrapper for a single pass.
pub fn reconcile(source: &str, tokens: &[Token], styles: &StyleMap) -> String {
    Reconciler::new(styles).reconcile(source, tokens)
}

struct Pass<'a, 's> {
    src: SourceLines<'a>,
    styles: &'s StyleMap,
    cursor: Cursor,
    out: String,
    rejected: u64,
}

impl Pass<'_, '_> {
    /// Emit uncovered text from the cursor up to `target`: whole line
    /// remainders (plus newline) while on an earlier line, then the partial
    /// span on the target line.
    fn fill_gap(&mut self, target: Cursor) {
        while self.cursor < target {
            let Some(line) = self.src.line(self.cursor.line) else {
                break;
            };
            let line_end = utf16_len(line) + 1;
            if self.cursor.line < target.line {
                escape_into(&mut self.out, &line[byte_col(line, self.cursor.column)..]);
                if self.cursor.line < self.src.line_count() {
                    self.out.push('\n');
                    self.cursor = Cursor::new(self.cursor.line + 1, 1);
                } else {
                    // Target lies beyond the last line; stop at end of source.
                    self.cursor.column = line_end;
                    break;
                }
            } else {
                let end_column = target.column.min(line_end);
                let from = byte_col(line, self.cursor.column);
                let to = byte_col(line, end_column);
                escape_into(&mut self.out, &line[from..to]);
                self.cursor.column = end_column;
                break;
            }
        }
    }

    fn emit_token(&mut self, token: &Token) {
        if token.text.is_empty() {
            return;
        }
        let at = self.src.offset(self.cursor);
        if !self.src.source[at..].starts_with(token.text.as_str()) {
            self.rejected += 1;
            trace!(
                target: "render.reconcile",
                kind = token.kind.as_tag(),
                end_line = token.end_line,
                start_column = token.start_column,
                cursor_line = self.cursor.line,
                cursor_column = self.cursor.column,
                text_len = token.text.len(),
                "token_rejected"
            );
            return;
        }
        match self.styles.class_for(&token.kind) {
            Some(class) => {
                self.out.push_str("<span class=\"");
                self.out.push_str(class);
                self.out.push_str("\">");
                escape_into(&mut self.out, &token.text);
                self.out.push_str("</span>");
            }
            None => escape_into(&mut self.out, &token.text),
        }
        self.cursor.advance_over(&token.text);
    }

    /// Emit everything from the cursor to the end of the source, reinserting
    /// newlines between lines but not after the last one.
    fn flush(&mut self) {
        let total = self.src.line_count();
        while let Some(line) = self.src.line(self.cursor.line) {
            escape_into(&mut self.out, &line[byte_col(line, self.cursor.column)..]);
            if self.cursor.line < total {
                self.out.push('\n');
            }
            self.cursor = Cursor::new(self.cursor.line + 1, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_lexer::TokenKind;

    fn styles() -> StyleMap {
        StyleMap::new()
    }

    #[test]
    fn contiguous_tokens_single_line() {
        let src = "[Block]";
        let tokens = vec![
            Token::new(TokenKind::OpenBracket, "[", 1, 1),
            Token::new(TokenKind::Identifier, "Block", 1, 2),
            Token::new(TokenKind::CloseBracket, "]", 1, 7),
        ];
        assert_eq!(
            reconcile(src, &tokens, &styles()),
            "<span class=\"token-operator\">[</span>\
             <span class=\"token-identifier\">Block</span>\
             <span class=\"token-operator\">]</span>"
        );
    }

    #[test]
    fn gaps_are_filled_with_escaped_text() {
        let src = "a <b> c";
        let tokens = vec![Token::new(TokenKind::Identifier, "b", 1, 4)];
        assert_eq!(
            reconcile(src, &tokens, &styles()),
            "a &lt;<span class=\"token-identifier\">b</span>&gt; c"
        );
    }

    #[test]
    fn gap_crossing_lines_reinserts_newlines() {
        let src = "one\ntwo\nthree";
        let tokens = vec![Token::new(TokenKind::Value, "three", 3, 1)];
        assert_eq!(
            reconcile(src, &tokens, &styles()),
            "one\ntwo\n<span class=\"token-value\">three</span>"
        );
    }

    #[test]
    fn trailing_lines_flushed_without_extra_newline() {
        let src = "x\n\ny";
        let tokens = vec![Token::new(TokenKind::Text, "x", 1, 1)];
        assert_eq!(
            reconcile(src, &tokens, &styles()),
            "<span class=\"token-text\">x</span>\n\ny"
        );
        assert_eq!(reconcile("x\n", &tokens, &styles()), "<span class=\"token-text\">x</span>\n");
    }

    #[test]
    fn multi_line_token_advances_cursor() {
        let mut cursor = Cursor::new(2, 5);
        cursor.advance_over("@_\nbody\ntail");
        assert_eq!(cursor, Cursor::new(4, 5));

        let mut flat = Cursor::new(1, 3);
        flat.advance_over("abc");
        assert_eq!(flat, Cursor::new(1, 6));
    }

    #[test]
    fn multi_line_token_then_same_line_token() {
        let src = "# a\n# b -> x";
        let tokens = vec![
            Token::new(TokenKind::Comment, "# a\n# b", 2, 1),
            Token::new(TokenKind::ThinArrow, "->", 2, 5),
        ];
        assert_eq!(
            reconcile(src, &tokens, &styles()),
            "<span class=\"token-comment\"># a\n# b</span> \
             <span class=\"token-operator\">-&gt;</span> x"
        );
    }

    #[test]
    fn unknown_kind_emitted_unwrapped() {
        let src = "ab";
        let tokens = vec![Token::new(TokenKind::Other("WEIRD".into()), "a", 1, 1)];
        assert_eq!(reconcile(src, &tokens, &styles()), "ab");
    }

    #[test]
    fn overlapping_token_never_rewinds() {
        let src = "abcd";
        let tokens = vec![
            Token::new(TokenKind::Identifier, "abc", 1, 1),
            // Claims column 2 but the cursor is already at 4; text matches at cursor.
            Token::new(TokenKind::Value, "d", 1, 2),
        ];
        assert_eq!(
            reconcile(src, &tokens, &styles()),
            "<span class=\"token-identifier\">abc</span><span class=\"token-value\">d</span>"
        );
    }

    #[test]
    fn overlapping_token_with_stale_text_is_dropped() {
        let src = "abcd";
        let tokens = vec![
            Token::new(TokenKind::Identifier, "abc", 1, 1),
            Token::new(TokenKind::Value, "bc", 1, 2),
        ];
        assert_eq!(
            reconcile(src, &tokens, &styles()),
            "<span class=\"token-identifier\">abc</span>d"
        );
    }

    #[test]
    fn token_past_end_of_source_is_absorbed() {
        let src = "ab\ncd";
        let tokens = vec![
            Token::new(TokenKind::Text, "zz", 9, 4),
            Token::new(TokenKind::Text, "q", 2, 40),
        ];
        assert_eq!(reconcile(src, &tokens, &styles()), "ab\ncd");
    }

    #[test]
    fn zero_coordinates_are_tolerated() {
        let src = "ab";
        let tokens = vec![
            Token::new(TokenKind::Text, "a", 0, 0),
            Token::new(TokenKind::Text, "b", 1, 0),
        ];
        assert_eq!(
            reconcile(src, &tokens, &styles()),
            "<span class=\"token-text\">a</span><span class=\"token-text\">b</span>"
        );
    }

    #[test]
    fn columns_count_utf16_units_not_bytes() {
        let src = "é=ü";
        let tokens = vec![
            Token::new(TokenKind::Equal, "=", 1, 2),
            Token::new(TokenKind::Value, "ü", 1, 3),
        ];
        assert_eq!(
            reconcile(src, &tokens, &styles()),
            "é<span class=\"token-operator\">=</span><span class=\"token-value\">ü</span>"
        );
    }

    #[test]
    fn astral_characters_take_two_columns() {
        let src = "😀 [x]";
        let tokens = vec![
            Token::new(TokenKind::OpenBracket, "[", 1, 4),
            Token::new(TokenKind::Identifier, "x", 1, 5),
            Token::new(TokenKind::CloseBracket, "]", 1, 6),
        ];
        assert_eq!(
            reconcile(src, &tokens, &styles()),
            "😀 <span class=\"token-operator\">[</span>\
             <span class=\"token-identifier\">x</span>\
             <span class=\"token-operator\">]</span>"
        );
    }

    #[test]
    fn astral_gap_then_token_on_later_line() {
        let src = "𝄞𝄞 a\nb 🎵 end";
        let tokens = vec![
            Token::new(TokenKind::Text, "a", 1, 6),
            Token::new(TokenKind::EndKeyword, "end", 2, 6),
        ];
        assert_eq!(
            reconcile(src, &tokens, &styles()),
            "𝄞𝄞 <span class=\"token-text\">a</span>\nb 🎵 <span class=\"token-keyword\">end</span>"
        );
    }

    #[test]
    fn utf16_column_mapping() {
        assert_eq!(byte_col("😀x", 1), 0);
        assert_eq!(byte_col("😀x", 3), 4);
        // Inside the surrogate pair: next boundary.
        assert_eq!(byte_col("😀x", 2), 4);
        assert_eq!(byte_col("😀x", 99), 5);

        let mut cursor = Cursor::new(1, 1);
        cursor.advance_over("😀é");
        assert_eq!(cursor, Cursor::new(1, 4));
        cursor.advance_over("🎵\n😀");
        assert_eq!(cursor, Cursor::new(2, 3));
    }

    #[test]
    fn empty_source_and_stream() {
        assert_eq!(reconcile("", &[], &styles()), "");
        assert_eq!(reconcile("abc\ndef", &[], &styles()), "abc\ndef");
    }
}
