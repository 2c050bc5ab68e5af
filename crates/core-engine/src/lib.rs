//! Parse/transpile contract for the slow path.
//!
//! The engine is external and opaque. `Engine` fixes the three calls the
//! playground makes; `ProcessEngine` implements them by running the engine as
//! a child process. `run_update` performs one full update cycle
//! (lex -> parse -> transpile) and folds any failure into an `UpdateReport`
//! so the display always receives a consistent payload.

mod format;
mod process;

pub use format::{Format, MapperRef, TranspileRequest};
pub use process::ProcessEngine;

use core_lexer::{LexError, Token};
use serde_json::{Value, json};
use std::future::Future;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine ran and reported a problem with the document.
    #[error("{0}")]
    Diagnostic(String),
    #[error("failed to start engine `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("engine i/o failed")]
    Io(#[from] std::io::Error),
    #[error("engine output is not UTF-8")]
    NotUtf8,
    #[error("engine returned an invalid token stream")]
    Tokens(#[from] LexError),
    #[error("engine returned an invalid syntax tree")]
    Ast(#[source] serde_json::Error),
}

impl EngineError {
    /// User-facing message: the diagnostic itself, or the error chain.
    pub fn message(&self) -> String {
        match self {
            EngineError::Diagnostic(msg) => msg.clone(),
            other => {
                let mut msg = other.to_string();
                let mut source = std::error::Error::source(other);
                while let Some(cause) = source {
                    msg.push_str(": ");
                    msg.push_str(&cause.to_string());
                    source = cause.source();
                }
                msg
            }
        }
    }
}

/// Asynchronous engine calls. Results may complete in any order relative to
/// other calls; callers guard against stale results themselves.
pub trait Engine: Send + Sync {
    fn lex(&self, source: &str) -> impl Future<Output = Result<Vec<Token>, EngineError>> + Send;
    fn parse(&self, source: &str) -> impl Future<Output = Result<Value, EngineError>> + Send;
    fn transpile(
        &self,
        request: &TranspileRequest,
    ) -> impl Future<Output = Result<String, EngineError>> + Send;
}

/// Result of one update cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    pub source: String,
    pub format: Format,
    pub outcome: UpdateOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Success {
        transpiled: String,
        ast: Value,
        tokens: Vec<Token>,
    },
    Failure {
        message: String,
    },
}

impl UpdateReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, UpdateOutcome::Failure { .. })
    }

    /// AST view payload; `{"error": message}` on failure.
    pub fn ast(&self) -> Value {
        match &self.outcome {
            UpdateOutcome::Success { ast, .. } => ast.clone(),
            UpdateOutcome::Failure { message } => json!({ "error": message }),
        }
    }

    /// Token view payload; empty on failure.
    pub fn tokens(&self) -> &[Token] {
        match &self.outcome {
            UpdateOutcome::Success { tokens, .. } => tokens,
            UpdateOutcome::Failure { .. } => &[],
        }
    }
}

/// Run lex, parse and transpile for `source`. Never fails: the first error
/// ends the cycle and becomes `UpdateOutcome::Failure`.
pub async fn run_update<E: Engine + ?Sized>(engine: &E, source: &str, format: Format) -> UpdateReport {
    let started = Instant::now();
    let outcome = match cycle(engine, source, format).await {
        Ok(outcome) => outcome,
        Err(err) => {
            debug!(target: "engine.update", error = %err, "update_failed");
            UpdateOutcome::Failure {
                message: err.message(),
            }
        }
    };
    info!(
        target: "engine.update",
        format = format.as_tag(),
        source_len = source.len(),
        failed = matches!(outcome, UpdateOutcome::Failure { .. }),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "update_cycle_finished"
    );
    UpdateReport {
        source: source.to_string(),
        format,
        outcome,
    }
}

async fn cycle<E: Engine + ?Sized>(
    engine: &E,
    source: &str,
    format: Format,
) -> Result<UpdateOutcome, EngineError> {
    let tokens = engine.lex(source).await?;
    let ast = engine.parse(source).await?;
    let transpiled = engine
        .transpile(&TranspileRequest::new(source, format))
        .await?;
    Ok(UpdateOutcome::Success {
        transpiled,
        ast,
        tokens,
    })
}
