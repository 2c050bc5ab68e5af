//! Fast-path highlight: lex, then reconcile, with the unstyled fallback.
//!
//! A lexer failure or an empty token stream bypasses the reconciler and yields
//! the escaped source. Neither case is an error for the caller.

use crate::escape::escape;
use crate::reconcile::Reconciler;
use crate::style::StyleMap;
use crate::timing::record_last_reconcile_ns;
use core_lexer::Lexer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::debug;

/// Passes that fell back to unstyled text (lex error or no tokens).
pub static HIGHLIGHT_FALLBACKS: AtomicU64 = AtomicU64::new(0);

/// Highlight `source` into markup. Never fails.
pub fn highlight<L: Lexer + ?Sized>(source: &str, lexer: &L, styles: &StyleMap) -> String {
    let started = Instant::now();
    let markup = match lexer.lex(source) {
        Ok(tokens) if !tokens.is_empty() => Reconciler::new(styles).reconcile(source, &tokens),
        Ok(_) => {
            HIGHLIGHT_FALLBACKS.fetch_add(1, Ordering::Relaxed);
            debug!(target: "render.highlight", source_len = source.len(), "empty_token_stream");
            escape(source)
        }
        Err(err) => {
            HIGHLIGHT_FALLBACKS.fetch_add(1, Ordering::Relaxed);
            debug!(target: "render.highlight", error = %err, source_len = source.len(), "lex_failed");
            escape(source)
        }
    };
    record_last_reconcile_ns(started.elapsed().as_nanos() as u64);
    markup
}
