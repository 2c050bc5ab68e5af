//! Line-oriented control surface: format selector and quit.
//!
//! Grammar (one command per line, surrounding whitespace ignored):
//! * `:format <html|markdown|mdx|text>` (alias `:f`)
//! * `:quit` (alias `:q`)
//!
//! Blank lines are ignored. Anything else is reported and skipped; the reader
//! keeps going.

use core_engine::Format;
use core_events::{
    AsyncEventSource, CHANNEL_SEND_FAILURES, COMMANDS_RECEIVED, CommandEvent, Event,
};
use std::sync::atomic::Ordering;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("unknown format `{0}` (expected html, markdown, mdx or text)")]
    UnknownFormat(String),
    #[error("`:format` needs a format tag")]
    MissingFormat,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
}

/// Parse one input line. `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<CommandEvent>, CommandParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    match head {
        ":q" | ":quit" => Ok(Some(CommandEvent::Quit)),
        ":f" | ":format" => {
            let tag = words.next().ok_or(CommandParseError::MissingFormat)?;
            Format::try_from_tag(&tag.to_ascii_lowercase())
                .map(|f| Some(CommandEvent::SetFormat(f)))
                .ok_or_else(|| CommandParseError::UnknownFormat(tag.to_string()))
        }
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Reads commands from any buffered async reader (stdin in the binary).
pub struct CommandSource<R> {
    reader: R,
}

impl CommandSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> CommandSource<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R> AsyncEventSource for CommandSource<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    fn name(&self) -> &'static str {
        "commands"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let mut lines = self.reader.lines();
        tokio::spawn(async move {
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        debug!(target: "input.commands", "command_stream_ended");
                        break;
                    }
                    Err(e) => {
                        warn!(target: "input.commands", error = %e, "command_read_failed");
                        break;
                    }
                };
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!(target: "input.commands", error = %e, "command_rejected");
                        continue;
                    }
                };
                COMMANDS_RECEIVED.fetch_add(1, Ordering::Relaxed);
                debug!(target: "input.commands", ?command, "command_received");
                if tx.send(Event::Command(command)).await.is_err() {
                    CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                    break;
                }
                if command == CommandEvent::Quit {
                    break;
                }
            }
        })
    }
}
