//! Event sources feeding the playground runtime.
//!
//! * `SourceFileWatcher`: emits `InputEvent::SourceChanged` with the full file
//!   text whenever the watched source changes on disk.
//! * `CommandSource`: reads `:format <tag>` / `:quit` lines (stdin in the
//!   binary) and emits `CommandEvent`s.
//!
//! Both implement `core_events::AsyncEventSource` and stop when the runtime
//! channel closes. Logs never carry source text, only lengths.

mod commands;
mod watch;

pub use commands::{CommandParseError, CommandSource, parse_command};
pub use watch::{ChangeFilter, SourceFileWatcher, is_relevant};
