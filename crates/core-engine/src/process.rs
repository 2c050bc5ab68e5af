//! External engine invoked as a child process.
//!
//! Command line: `<program> [args...] <subcommand> [flags]`, source on stdin.
//! * `lex`                                        -> JSON token array
//! * `parse`                                      -> JSON AST
//! * `transpile --format <tag> [--mapper <NAME>]` -> markup
//!
//! A non-zero exit is an engine diagnostic; its stderr (or the exit status
//! when stderr is empty) becomes the message. stdin is written concurrently
//! with reading the output so large documents cannot deadlock on full pipes.

use crate::{Engine, EngineError, TranspileRequest};
use core_lexer::{LexError, Lexer, Token, decode_tokens};
use std::io::Write;
use std::process::{Output, Stdio};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
}

impl ProcessEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command_args<'a>(&'a self, subcommand: &'a str, flags: &'a [String]) -> Vec<&'a str> {
        self.args
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(subcommand))
            .chain(flags.iter().map(String::as_str))
            .collect()
    }

    async fn run(&self, subcommand: &str, flags: &[String], input: &str) -> Result<String, EngineError> {
        let started = Instant::now();
        let mut child = tokio::process::Command::new(&self.program)
            .args(self.command_args(subcommand, flags))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        let stdin = child.stdin.take();
        let write = async move {
            if let Some(mut stdin) = stdin {
                ignore_broken_pipe(stdin.write_all(input.as_bytes()).await)?;
                ignore_broken_pipe(stdin.shutdown().await)?;
            }
            Ok::<_, std::io::Error>(())
        };
        let ((), output) = tokio::try_join!(write, child.wait_with_output())?;
        debug!(
            target: "engine.process",
            subcommand,
            status = output.status.code().unwrap_or(-1),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "engine_call_finished"
        );
        interpret(output)
    }

    fn run_blocking(&self, subcommand: &str, input: &str) -> Result<Output, std::io::Error> {
        let mut child = std::process::Command::new(&self.program)
            .args(self.command_args(subcommand, &[]))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take();
        std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => ignore_broken_pipe(stdin.write_all(input.as_bytes())),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            written.and(output)
        })
    }
}

fn ignore_broken_pipe(result: std::io::Result<()>) -> std::io::Result<()> {
    match result {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn diagnostic(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim_end();
    if trimmed.is_empty() {
        format!("engine exited with {}", output.status)
    } else {
        trimmed.to_string()
    }
}

fn interpret(output: Output) -> Result<String, EngineError> {
    if !output.status.success() {
        return Err(EngineError::Diagnostic(diagnostic(&output)));
    }
    String::from_utf8(output.stdout).map_err(|_| EngineError::NotUtf8)
}

impl Engine for ProcessEngine {
    async fn lex(&self, source: &str) -> Result<Vec<Token>, EngineError> {
        let out = self.run("lex", &[], source).await?;
        Ok(decode_tokens(&out)?)
    }

    async fn parse(&self, source: &str) -> Result<serde_json::Value, EngineError> {
        let out = self.run("parse", &[], source).await?;
        serde_json::from_str(&out).map_err(EngineError::Ast)
    }

    async fn transpile(&self, request: &TranspileRequest) -> Result<String, EngineError> {
        let mut flags = vec!["--format".to_string(), request.format.as_tag().to_string()];
        if let Some(mapper) = request.mapper {
            flags.push("--mapper".to_string());
            flags.push(mapper.as_tag().to_string());
        }
        self.run("transpile", &flags, &request.source).await
    }
}

/// Blocking lexer for the per-keystroke highlight pass.
impl Lexer for ProcessEngine {
    fn lex(&self, source: &str) -> Result<Vec<Token>, LexError> {
        let output = self.run_blocking("lex", source).map_err(LexError::Unavailable)?;
        if !output.status.success() {
            return Err(LexError::Rejected(diagnostic(&output)));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        decode_tokens(&text)
    }
}
