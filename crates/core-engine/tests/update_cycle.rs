//! `run_update` against an in-process engine double.

use core_engine::{Engine, EngineError, Format, MapperRef, TranspileRequest, UpdateOutcome, run_update};
use core_lexer::{Token, TokenKind};
use serde_json::{Value, json};
use std::sync::Mutex;

#[derive(Default)]
struct ScriptedEngine {
    fail_parse: Option<String>,
    requests: Mutex<Vec<TranspileRequest>>,
}

impl Engine for ScriptedEngine {
    async fn lex(&self, source: &str) -> Result<Vec<Token>, EngineError> {
        Ok(vec![Token::new(TokenKind::Text, source, 1, 1)])
    }

    async fn parse(&self, source: &str) -> Result<Value, EngineError> {
        match &self.fail_parse {
            Some(msg) => Err(EngineError::Diagnostic(msg.clone())),
            None => Ok(json!({ "type": "Document", "len": source.len() })),
        }
    }

    async fn transpile(&self, request: &TranspileRequest) -> Result<String, EngineError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(format!("<p>{}</p>", request.source))
    }
}

#[tokio::test]
async fn success_carries_all_three_views() {
    let engine = ScriptedEngine::default();
    let report = run_update(&engine, "hi", Format::Markdown).await;
    assert!(!report.is_failure());
    assert_eq!(report.format, Format::Markdown);
    assert_eq!(report.source, "hi");
    match &report.outcome {
        UpdateOutcome::Success { transpiled, ast, tokens } => {
            assert_eq!(transpiled, "<p>hi</p>");
            assert_eq!(ast["type"], "Document");
            assert_eq!(tokens.len(), 1);
        }
        other => panic!("expected success, got {other:?}"),
    }
    let requests = engine.requests.lock().unwrap();
    assert_eq!(requests[0].mapper, Some(MapperRef::Markdown));
}

#[tokio::test]
async fn failure_yields_placeholders() {
    let engine = ScriptedEngine {
        fail_parse: Some("\u{1b}[31mUnexpected token\u{1b}[0m at 1:3".into()),
        ..Default::default()
    };
    let report = run_update(&engine, "[x", Format::Html).await;
    assert!(report.is_failure());
    assert_eq!(
        report.ast(),
        json!({ "error": "\u{1b}[31mUnexpected token\u{1b}[0m at 1:3" })
    );
    assert!(report.tokens().is_empty());
    // Transpile never ran after the parse failure.
    assert!(engine.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn text_format_has_no_mapper() {
    let engine = ScriptedEngine::default();
    run_update(&engine, "plain", Format::Text).await;
    assert_eq!(engine.requests.lock().unwrap()[0].mapper, None);
}
