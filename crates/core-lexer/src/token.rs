//! Token data model as produced by the external lexer.
//!
//! A token carries its exact source text plus *only* two coordinates: the
//! 1-indexed line containing its last character (`end_line`) and the 1-indexed
//! column of its first character on its first line (`start_column`). There is
//! no absolute offset; consumers reconstruct positions from these two fields
//! and the newline count of `text`.
//!
//! Wire format (JSON, one object per token):
//! `{"type": "OPEN_BRACKET", "value": "[", "line": 1, "start": 1}`
//!
//! Missing fields decode to their defaults so one malformed entry never fails
//! the whole stream; the reconciler is responsible for absorbing the result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed lexer vocabulary. Tags outside the known set are preserved verbatim
/// in `Other` so the tokens view can still show them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TokenKind {
    OpenBracket,
    CloseBracket,
    EndKeyword,
    Identifier,
    Equal,
    Value,
    Text,
    ThinArrow,
    OpenParen,
    CloseParen,
    OpenAt,
    CloseAt,
    Colon,
    Comma,
    Semicolon,
    Comment,
    Escape,
    /// Any tag the lexer may emit that has no presentation mapping (e.g. `EOF`).
    Other(String),
}

impl TokenKind {
    /// Every kind the lexer is known to emit, in vocabulary order.
    pub const KNOWN: [TokenKind; 17] = [
        TokenKind::OpenBracket,
        TokenKind::CloseBracket,
        TokenKind::EndKeyword,
        TokenKind::Identifier,
        TokenKind::Equal,
        TokenKind::Value,
        TokenKind::Text,
        TokenKind::ThinArrow,
        TokenKind::OpenParen,
        TokenKind::CloseParen,
        TokenKind::OpenAt,
        TokenKind::CloseAt,
        TokenKind::Colon,
        TokenKind::Comma,
        TokenKind::Semicolon,
        TokenKind::Comment,
        TokenKind::Escape,
    ];

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "OPEN_BRACKET" => TokenKind::OpenBracket,
            "CLOSE_BRACKET" => TokenKind::CloseBracket,
            "END_KEYWORD" => TokenKind::EndKeyword,
            "IDENTIFIER" => TokenKind::Identifier,
            "EQUAL" => TokenKind::Equal,
            "VALUE" => TokenKind::Value,
            "TEXT" => TokenKind::Text,
            "THIN_ARROW" => TokenKind::ThinArrow,
            "OPEN_PAREN" => TokenKind::OpenParen,
            "CLOSE_PAREN" => TokenKind::CloseParen,
            "OPEN_AT" => TokenKind::OpenAt,
            "CLOSE_AT" => TokenKind::CloseAt,
            "COLON" => TokenKind::Colon,
            "COMMA" => TokenKind::Comma,
            "SEMICOLON" => TokenKind::Semicolon,
            "COMMENT" => TokenKind::Comment,
            "ESCAPE" => TokenKind::Escape,
            other => TokenKind::Other(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            TokenKind::OpenBracket => "OPEN_BRACKET",
            TokenKind::CloseBracket => "CLOSE_BRACKET",
            TokenKind::EndKeyword => "END_KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Equal => "EQUAL",
            TokenKind::Value => "VALUE",
            TokenKind::Text => "TEXT",
            TokenKind::ThinArrow => "THIN_ARROW",
            TokenKind::OpenParen => "OPEN_PAREN",
            TokenKind::CloseParen => "CLOSE_PAREN",
            TokenKind::OpenAt => "OPEN_AT",
            TokenKind::CloseAt => "CLOSE_AT",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Comment => "COMMENT",
            TokenKind::Escape => "ESCAPE",
            TokenKind::Other(tag) => tag,
        }
    }
}

impl Default for TokenKind {
    fn default() -> Self {
        TokenKind::Other(String::new())
    }
}

impl From<String> for TokenKind {
    fn from(tag: String) -> Self {
        TokenKind::from_tag(&tag)
    }
}

impl From<TokenKind> for String {
    fn from(kind: TokenKind) -> Self {
        kind.as_tag().to_string()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// One lexical unit. Field names follow Rust conventions; serde renames map
/// them onto the lexer's wire names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type", default)]
    pub kind: TokenKind,
    /// Exact source substring covered by the token (may span lines).
    #[serde(rename = "value", default)]
    pub text: String,
    /// 1-indexed line holding the token's last character.
    #[serde(rename = "line", default)]
    pub end_line: usize,
    /// 1-indexed column of the first character on its first line, in UTF-16
    /// code units.
    #[serde(rename = "start", default)]
    pub start_column: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        end_line: usize,
        start_column: usize,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            end_line,
            start_column,
        }
    }

    /// Build a token from its *start* coordinates, deriving `end_line` the same
    /// way a lexer reporting end lines would. Mostly useful for fixtures.
    pub fn starting_at(
        kind: TokenKind,
        text: impl Into<String>,
        start_line: usize,
        start_column: usize,
    ) -> Self {
        let text = text.into();
        let end_line = start_line + newline_count(&text);
        Self::new(kind, text, end_line, start_column)
    }

    /// Number of `\n` characters inside `text`.
    pub fn newline_count(&self) -> usize {
        newline_count(&self.text)
    }

    /// Line of the first character: `end_line - newline_count`. Saturates at 0
    /// for malformed tokens whose text claims more lines than `end_line` allows.
    pub fn start_line(&self) -> usize {
        self.end_line.saturating_sub(self.newline_count())
    }
}

fn newline_count(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_line_derived_from_end_line() {
        let t = Token::new(TokenKind::Comment, "# a\n# b\n", 3, 1);
        assert_eq!(t.newline_count(), 2);
        assert_eq!(t.start_line(), 1);
    }

    #[test]
    fn start_line_saturates_for_malformed_tokens() {
        let t = Token::new(TokenKind::Text, "a\nb\nc", 1, 1);
        assert_eq!(t.start_line(), 0);
    }

    #[test]
    fn starting_at_computes_end_line() {
        let t = Token::starting_at(TokenKind::Text, "x\ny", 4, 2);
        assert_eq!(t.end_line, 5);
        assert_eq!(t.start_line(), 4);
    }

    #[test]
    fn kind_tags_cover_known_vocabulary() {
        for kind in TokenKind::KNOWN.iter() {
            assert_eq!(&TokenKind::from_tag(kind.as_tag()), kind);
        }
        assert_eq!(
            TokenKind::from_tag("EOF"),
            TokenKind::Other("EOF".to_string())
        );
    }
}
