//! Round-trip and structure properties of the position reconciler.

mod common;

use common::{tokens_from_cuts, visible_text};
use core_lexer::{Token, TokenKind};
use core_render::{StyleMap, reconcile};
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = TokenKind> {
    prop_oneof![
        proptest::sample::select(TokenKind::KNOWN.to_vec()),
        Just(TokenKind::Other("EOF".to_string())),
    ]
}

fn source_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z \\[\\]=<>&\"'@_é😀𝄞\n]{0,60}").expect("valid regex")
}

fn arbitrary_token() -> impl Strategy<Value = Token> {
    (
        kind_strategy(),
        proptest::string::string_regex("[a-z<&'\n]{0,6}").expect("valid regex"),
        0usize..8,
        0usize..12,
    )
        .prop_map(|(kind, text, end_line, start_column)| Token::new(kind, text, end_line, start_column))
}

proptest! {
    #[test]
    fn round_trip_with_arbitrary_tokens(
        source in source_strategy(),
        tokens in proptest::collection::vec(arbitrary_token(), 0..12),
    ) {
        let markup = reconcile(&source, &tokens, &StyleMap::new());
        prop_assert_eq!(visible_text(&markup), source);
    }

    #[test]
    fn round_trip_with_exact_tokens(
        source in source_strategy(),
        cuts in proptest::collection::vec(0usize..80, 0..10),
        kinds in proptest::collection::vec(kind_strategy(), 1..5),
    ) {
        let tokens = tokens_from_cuts(&source, &cuts, &kinds);
        let markup = reconcile(&source, &tokens, &StyleMap::new());
        prop_assert_eq!(visible_text(&markup), source.clone());

        // Every exact token is accepted, so each classified one yields a span.
        let styled = tokens
            .iter()
            .filter(|t| !t.text.is_empty() && !matches!(t.kind, TokenKind::Other(_)))
            .count();
        prop_assert_eq!(markup.matches("</span>").count(), styled);
    }

    #[test]
    fn round_trip_with_shuffled_positions(
        source in source_strategy(),
        cuts in proptest::collection::vec(0usize..80, 0..10),
        shift in 1usize..4,
    ) {
        let mut tokens = tokens_from_cuts(&source, &cuts, &[TokenKind::Identifier]);
        let len = tokens.len();
        tokens.rotate_left(shift.min(len));
        let markup = reconcile(&source, &tokens, &StyleMap::new());
        prop_assert_eq!(visible_text(&markup), source);
    }
}

#[test]
fn empty_stream_is_escaped_source() {
    let markup = reconcile("abc\ndef", &[], &StyleMap::new());
    assert_eq!(markup, "abc\ndef");
}

#[test]
fn token_with_two_newlines() {
    let source = "[Doc]\n@_quote_@ first\nsecond\nthird @_end_@\n[end]";
    let tokens = vec![
        Token::starting_at(TokenKind::Text, "first\nsecond\nthird", 2, 11),
        Token::starting_at(TokenKind::OpenAt, "@_", 4, 7),
    ];
    let markup = reconcile(source, &tokens, &StyleMap::new());
    assert!(markup.contains("<span class=\"token-text\">first\nsecond\nthird</span> <span class=\"token-operator\">@_</span>end_@"));
    assert_eq!(visible_text(&markup), source);
}

#[test]
fn realistic_block() {
    let source = "[Block = title: \"x\"]\nhello\n[end]";
    let tokens = vec![
        Token::new(TokenKind::OpenBracket, "[", 1, 1),
        Token::new(TokenKind::Identifier, "Block", 1, 2),
        Token::new(TokenKind::Equal, "=", 1, 8),
        Token::new(TokenKind::Identifier, "title", 1, 10),
        Token::new(TokenKind::Colon, ":", 1, 15),
        Token::new(TokenKind::Value, "\"x\"", 1, 17),
        Token::new(TokenKind::CloseBracket, "]", 1, 20),
        Token::new(TokenKind::Text, "hello", 2, 1),
        Token::new(TokenKind::OpenBracket, "[", 3, 1),
        Token::new(TokenKind::EndKeyword, "end", 3, 2),
        Token::new(TokenKind::CloseBracket, "]", 3, 5),
        Token::new(TokenKind::Other("EOF".into()), "", 3, 6),
    ];
    let markup = reconcile(source, &tokens, &StyleMap::new());
    assert_eq!(
        markup,
        "<span class=\"token-operator\">[</span><span class=\"token-identifier\">Block</span> \
<span class=\"token-operator\">=</span> <span class=\"token-identifier\">title</span>\
<span class=\"token-operator\">:</span> <span class=\"token-value\">&quot;x&quot;</span>\
<span class=\"token-operator\">]</span>\n<span class=\"token-text\">hello</span>\n\
<span class=\"token-operator\">[</span><span class=\"token-keyword\">end</span>\
<span class=\"token-operator\">]</span>"
    );
}
