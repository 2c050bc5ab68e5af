//! Diagnostic block shown in place of the preview when an update fails.
//!
//! Engine messages may carry terminal color sequences. Those are stripped,
//! then the text is escaped once and wrapped in `<div class="error-container">`.

use core_render::escape;
use regex::Regex;
use std::sync::LazyLock;

// CSI sequences (ESC [ params final) and OSC sequences terminated by BEL/ST.
static ANSI_SEQUENCE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)").ok()
});

/// Remove ANSI escape sequences from `message`.
pub fn strip_ansi(message: &str) -> String {
    match ANSI_SEQUENCE.as_ref() {
        Some(re) => re.replace_all(message, "").into_owned(),
        None => message.to_string(),
    }
}

pub fn diagnostic_block(message: &str) -> String {
    format!(
        "<div class=\"error-container\">{}</div>",
        escape(&strip_ansi(message))
    )
}
