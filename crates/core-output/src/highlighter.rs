//! Generic highlighter for finalized, read-only panes.
//!
//! Class-based HTML via syntect: spans carry `hl-` prefixed scope classes and
//! colors live in a stylesheet. The syntax set is loaded once and shared.
//! Any highlighting failure returns the escaped text for that pane only.

use core_render::escape;
use std::sync::atomic::{AtomicU64, Ordering};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::debug;

/// Panes that fell back to escaped text.
pub static STATIC_HIGHLIGHT_FALLBACKS: AtomicU64 = AtomicU64::new(0);

pub const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneLanguage {
    Html,
    Markdown,
    Json,
    PlainText,
}

impl PaneLanguage {
    fn syntax_token(self) -> &'static str {
        match self {
            PaneLanguage::Html => "html",
            PaneLanguage::Markdown => "md",
            PaneLanguage::Json => "json",
            PaneLanguage::PlainText => "txt",
        }
    }
}

pub struct StaticHighlighter {
    syntaxes: SyntaxSet,
}

impl Default for StaticHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticHighlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Highlight `text` as `language`. Never fails.
    pub fn highlight(&self, text: &str, language: PaneLanguage) -> String {
        let Some(syntax) = self.syntaxes.find_syntax_by_token(language.syntax_token()) else {
            return fallback(text, language, "syntax_missing");
        };
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(text) {
            if generator
                .parse_html_for_line_which_includes_newline(line)
                .is_err()
            {
                return fallback(text, language, "parse_failed");
            }
        }
        generator.finalize()
    }
}

fn fallback(text: &str, language: PaneLanguage, reason: &'static str) -> String {
    STATIC_HIGHLIGHT_FALLBACKS.fetch_add(1, Ordering::Relaxed);
    debug!(target: "output.highlight", ?language, reason, "static_highlight_fallback");
    escape(text)
}
