//! Output region of the playground.
//!
//! * `highlighter`: generic class-based highlighter for read-only panes.
//! * `diagnostic`: ANSI stripping and the `error-container` block.
//! * `panel`: preview per format and the transpiled / AST / tokens views.
//! * `sink`: `DisplaySink` targets (directory of HTML files, memory).
//!
//! Every pane degrades independently: a highlighting failure only affects the
//! pane being highlighted.

pub mod diagnostic;
pub mod highlighter;
pub mod panel;
pub mod sink;

pub use diagnostic::{diagnostic_block, strip_ansi};
pub use highlighter::{PaneLanguage, StaticHighlighter};
pub use panel::{OutputPanel, PanelDocuments, editor_document, preview_document};
pub use sink::{DirectorySink, DisplaySink, MemorySink, Pane};

use std::io;

/// Write all four result documents to `sink`.
pub fn show_panel<S: DisplaySink + ?Sized>(sink: &mut S, docs: &PanelDocuments) -> io::Result<()> {
    sink.show(Pane::Preview, &docs.preview)?;
    sink.show(Pane::Transpiled, &docs.transpiled)?;
    sink.show(Pane::Ast, &docs.ast)?;
    sink.show(Pane::Tokens, &docs.tokens)?;
    Ok(())
}
