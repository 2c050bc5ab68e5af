//! Shared helpers for reconciler integration tests.
#![allow(dead_code)]

use core_lexer::{Token, TokenKind};

/// Remove the wrapping `<span ...>` / `</span>` tags. Escaped text never
/// contains a raw `<`, so every `<` starts a tag.
pub fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                rest = &rest[open..];
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// De-escaped visible text of reconciler output.
pub fn visible_text(markup: &str) -> String {
    strip_tags(markup)
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

/// Cut `source` at the given char indices into contiguous tokens carrying
/// exact lexer-style coordinates (UTF-16 columns).
pub fn tokens_from_cuts(source: &str, cuts: &[usize], kinds: &[TokenKind]) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (chars.len() + 1)).collect();
    points.push(0);
    points.push(chars.len());
    points.sort_unstable();
    points.dedup();

    let mut tokens = Vec::new();
    let (mut line, mut column) = (1usize, 1usize);
    for (i, pair) in points.windows(2).enumerate() {
        let text: String = chars[pair[0]..pair[1]].iter().collect();
        let kind = kinds
            .get(i % kinds.len().max(1))
            .cloned()
            .unwrap_or(TokenKind::Text);
        let token = Token::starting_at(kind, text.clone(), line, column);
        match text.rfind('\n') {
            Some(nl) => {
                line += text.matches('\n').count();
                column = text[nl + 1..].encode_utf16().count() + 1;
            }
            None => column += text.encode_utf16().count(),
        }
        tokens.push(token);
    }
    tokens
}
