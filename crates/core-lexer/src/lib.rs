//! Lexer contract and token model.
//!
//! The lexer itself is an external engine; this crate only fixes the shape of
//! what crosses the boundary:
//! * `Lexer::lex` takes the full source and returns tokens ordered by
//!   position. Tokens are NOT guaranteed to be contiguous or exhaustive.
//! * Failures surface as `LexError`. Callers on the highlight fast path treat
//!   any error as "render unstyled" and never propagate it further.
//! * `decode_tokens` parses the lexer's JSON wire format into `Token`s.

mod token;
pub use token::{Token, TokenKind};

use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexError {
    /// The engine ran but refused the input (diagnostic text attached).
    #[error("lexer rejected input: {0}")]
    Rejected(String),
    /// The engine could not be reached at all.
    #[error("lexer unavailable")]
    Unavailable(#[source] std::io::Error),
    /// Output was produced but is not a token stream.
    #[error("malformed token stream")]
    Decode(#[from] serde_json::Error),
}

/// Synchronous lexing contract used by the per-keystroke highlight pass.
pub trait Lexer {
    fn lex(&self, source: &str) -> Result<Vec<Token>, LexError>;
}

/// Adapter turning a closure into a `Lexer` (test doubles, in-process engines).
pub struct FnLexer<F>(pub F);

impl<F> Lexer for FnLexer<F>
where
    F: Fn(&str) -> Result<Vec<Token>, LexError>,
{
    fn lex(&self, source: &str) -> Result<Vec<Token>, LexError> {
        (self.0)(source)
    }
}

impl<L: Lexer + ?Sized> Lexer for &L {
    fn lex(&self, source: &str) -> Result<Vec<Token>, LexError> {
        (**self).lex(source)
    }
}

impl<L: Lexer + ?Sized> Lexer for Arc<L> {
    fn lex(&self, source: &str) -> Result<Vec<Token>, LexError> {
        (**self).lex(source)
    }
}

impl<L: Lexer + ?Sized> Lexer for Box<L> {
    fn lex(&self, source: &str) -> Result<Vec<Token>, LexError> {
        (**self).lex(source)
    }
}

/// Decode a JSON array of tokens in the lexer wire format.
pub fn decode_tokens(json: &str) -> Result<Vec<Token>, LexError> {
    let tokens: Vec<Token> = serde_json::from_str(json)?;
    tracing::trace!(target: "lexer.decode", count = tokens.len(), "tokens_decoded");
    Ok(tokens)
}
