//! Child-process engine driven by small shell scripts.
#![cfg(unix)]

use core_engine::{Engine, EngineError, ProcessEngine};
use core_lexer::{LexError, Lexer, TokenKind};

fn script(body: &str) -> ProcessEngine {
    ProcessEngine::new("sh", vec!["-c".into(), body.into()])
}

#[test]
fn non_zero_exit_rejects_with_stderr() {
    let engine = script("echo boom >&2; exit 1");
    match Lexer::lex(&engine, "[Block]") {
        Err(LexError::Rejected(message)) => assert_eq!(message, "boom"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn silent_failure_reports_exit_status() {
    let engine = script("exit 3");
    match Lexer::lex(&engine, "x") {
        Err(LexError::Rejected(message)) => assert!(message.contains('3'), "{message}"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn successful_lex_decodes_tokens() {
    let engine = script(
        r#"cat >/dev/null; echo '[{"type":"END_KEYWORD","value":"end","line":1,"start":2}]'"#,
    );
    let tokens = Lexer::lex(&engine, "[end]").unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::EndKeyword);
    assert_eq!(tokens[0].start_column, 2);
}

#[tokio::test]
async fn async_parse_failure_is_diagnostic() {
    let engine = script("echo 'Unexpected token' >&2; exit 1");
    let err = engine.parse("[x").await.unwrap_err();
    assert!(matches!(&err, EngineError::Diagnostic(m) if m == "Unexpected token"));
}
