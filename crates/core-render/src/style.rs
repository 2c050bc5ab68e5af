//! Token classification: token kind -> presentation class.
//!
//! Two layers:
//! * `classify` is an exhaustive `match` over `TokenKind`. Adding a kind to the
//!   lexer vocabulary fails compilation here until it is given a category (or
//!   explicitly left unstyled). `TokenKind::Other` always resolves to `None`;
//!   the token's text is still emitted, only without a wrapping span.
//! * `StyleMap` turns a `StyleClass` category into the CSS class name written
//!   into markup. It is built once at startup (defaults plus optional
//!   configured overrides) and then shared by reference; no runtime mutation.
//!
//! Class names end up inside an attribute value, so only `[A-Za-z0-9_-]`
//! names are accepted. This keeps the reconciler free of attribute escaping.

use core_lexer::TokenKind;
use std::fmt;

/// Presentation categories used by the live editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleClass {
    Operator,
    Keyword,
    Identifier,
    Value,
    Text,
    Comment,
}

impl StyleClass {
    pub const ALL: [StyleClass; 6] = [
        StyleClass::Operator,
        StyleClass::Keyword,
        StyleClass::Identifier,
        StyleClass::Value,
        StyleClass::Text,
        StyleClass::Comment,
    ];

    /// Config key naming this category (`[highlight.classes] <key> = "..."`).
    pub fn key(self) -> &'static str {
        match self {
            StyleClass::Operator => "operator",
            StyleClass::Keyword => "keyword",
            StyleClass::Identifier => "identifier",
            StyleClass::Value => "value",
            StyleClass::Text => "text",
            StyleClass::Comment => "comment",
        }
    }

    pub fn default_class_name(self) -> &'static str {
        match self {
            StyleClass::Operator => "token-operator",
            StyleClass::Keyword => "token-keyword",
            StyleClass::Identifier => "token-identifier",
            StyleClass::Value => "token-value",
            StyleClass::Text => "token-text",
            StyleClass::Comment => "token-comment",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Map a token kind to its presentation category. `None` = emit unstyled.
pub fn classify(kind: &TokenKind) -> Option<StyleClass> {
    match kind {
        TokenKind::OpenBracket
        | TokenKind::CloseBracket
        | TokenKind::Equal
        | TokenKind::ThinArrow
        | TokenKind::OpenParen
        | TokenKind::CloseParen
        | TokenKind::OpenAt
        | TokenKind::CloseAt
        | TokenKind::Colon
        | TokenKind::Comma
        | TokenKind::Semicolon
        | TokenKind::Escape => Some(StyleClass::Operator),
        TokenKind::EndKeyword => Some(StyleClass::Keyword),
        TokenKind::Identifier => Some(StyleClass::Identifier),
        TokenKind::Value => Some(StyleClass::Value),
        TokenKind::Text => Some(StyleClass::Text),
        TokenKind::Comment => Some(StyleClass::Comment),
        TokenKind::Other(_) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidClassName {
    pub class: StyleClass,
    pub name: String,
}

impl fmt::Display for InvalidClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid class name {:?} for `{}` (allowed: A-Z a-z 0-9 _ -)",
            self.name,
            self.class.key()
        )
    }
}

impl std::error::Error for InvalidClassName {}

/// Category -> CSS class name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleMap {
    names: [String; 6],
}

impl Default for StyleMap {
    fn default() -> Self {
        Self {
            names: StyleClass::ALL.map(|c| c.default_class_name().to_string()),
        }
    }
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override one category's class name. Only used while building the map
    /// at startup; the finished map is shared immutably.
    pub fn set_class_name(
        &mut self,
        class: StyleClass,
        name: &str,
    ) -> Result<(), InvalidClassName> {
        let valid = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !valid {
            return Err(InvalidClassName {
                class,
                name: name.to_string(),
            });
        }
        self.names[class.index()] = name.to_string();
        Ok(())
    }

    pub fn class_name(&self, class: StyleClass) -> &str {
        &self.names[class.index()]
    }

    /// Full lookup: token kind -> class name, `None` when the kind is unstyled.
    pub fn class_for(&self, kind: &TokenKind) -> Option<&str> {
        classify(kind).map(|c| self.class_name(c))
    }
}
