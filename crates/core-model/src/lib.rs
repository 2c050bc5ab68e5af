//! Editor adapter: binds a live text surface to the highlight fast path.
//!
//! On every content change the adapter, synchronously and in this order:
//! 1. reads the surface's plain text,
//! 2. lexes and reconciles it (`core_render::highlight`, which owns the
//!    unstyled fallback),
//! 3. writes the markup back through `TextSurface::set_markup`,
//! 4. notifies subscribed handlers with a single `ContentChanged` payload.
//!
//! Invariants:
//! * The adapter never writes plain text. Markup is never read back as text.
//! * Handlers run after the surface is updated, in subscription order.
//! * The style table is shared immutably (`Arc<StyleMap>`) and built once.

use core_lexer::Lexer;
use core_render::{StyleMap, highlight};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

mod surface;
pub use surface::{BufferSurface, TextSurface};

/// Payload delivered to change handlers: the current plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChanged {
    pub text: String,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&ContentChanged) + Send>;

pub struct EditorAdapter<L> {
    lexer: L,
    styles: Arc<StyleMap>,
    handlers: Vec<(SubscriptionId, Handler)>,
    next_id: u64,
    changes: AtomicU64,
}

impl<L: Lexer> EditorAdapter<L> {
    pub fn new(lexer: L, styles: Arc<StyleMap>) -> Self {
        Self {
            lexer,
            styles,
            handlers: Vec::new(),
            next_id: 0,
            changes: AtomicU64::new(0),
        }
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&ContentChanged) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    /// Re-render `surface` without notifying handlers (initial paint).
    pub fn render<S: TextSurface + ?Sized>(&self, surface: &mut S) {
        let markup = highlight(surface.plain_text(), &self.lexer, &self.styles);
        surface.set_markup(markup);
    }

    /// Content-change entry point. See module docs for the ordering.
    pub fn handle_change<S: TextSurface + ?Sized>(&mut self, surface: &mut S) -> ContentChanged {
        self.render(surface);
        let change = ContentChanged {
            text: surface.plain_text().to_string(),
        };
        self.changes.fetch_add(1, Ordering::Relaxed);
        trace!(
            target: "model.adapter",
            text_len = change.text.len(),
            handlers = self.handlers.len(),
            "content_changed"
        );
        for (_, handler) in self.handlers.iter_mut() {
            handler(&change);
        }
        change
    }

    pub fn changes_handled(&self) -> u64 {
        self.changes.load(Ordering::Relaxed)
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }
}
