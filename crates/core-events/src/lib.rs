//! Core event types and channel helpers for the playground runtime.

use core_engine::{Format, UpdateReport};
use core_state::Generation;
use std::sync::atomic::AtomicU64;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// The event loop consumes a bounded mpsc channel sized by `EVENT_CHANNEL_CAP`. Producers await
// `send`, so a slow loop applies backpressure instead of dropping edits. Pipeline tasks send their
// completion through the same channel; their ordering relative to input events is arbitrary and
// the generation gate decides what is applied.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters, inspected in tests or logged at shutdown.
// -------------------------------------------------------------------------------------------------
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static SOURCE_CHANGES: AtomicU64 = AtomicU64::new(0); // SourceChanged events emitted
pub static COMMANDS_RECEIVED: AtomicU64 = AtomicU64::new(0); // parsed command lines

/// Top-level event enum consumed by the central event loop.
#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    Command(CommandEvent),
    /// An asynchronous update cycle completed. Applied only if `generation`
    /// is newer than the last applied one.
    PipelineFinished {
        generation: Generation,
        report: UpdateReport,
    },
    Shutdown,
}

/// Changes of the live text surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Full current text of the surface (never logged verbatim).
    SourceChanged(String),
}

/// User commands from the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandEvent {
    /// Format selector changed; runs an update immediately.
    SetFormat(Format),
    Quit,
}

// -------------------------------------------------------------------------------------------------
// Async Event Sources
// -------------------------------------------------------------------------------------------------
// Each producer (file watcher, command reader) owns one background task. On send failure
// (consumer dropped) it must terminate promptly.

/// Trait implemented by any async event producer. Implementors usually hold configuration and
/// spawn one background task that pushes `Event`s into the shared channel.
pub trait AsyncEventSource: Send + 'static {
    /// Human-readable stable identifier (used for logging / diagnostics).
    fn name(&self) -> &'static str;
    /// Consume self and spawn the background task, returning a JoinHandle. Implementors should
    /// stop when `tx.send(..).await` returns Err (channel closed) or on their own internal stop
    /// condition.
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Registry of event sources, spawned together at startup.
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl Default for EventSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Spawn all registered sources, returning their JoinHandles. The supplied `Sender`
    /// reference stays owned by the caller; each source receives its own clone.
    ///
    /// During shutdown the caller should drop its final `Sender` clone before awaiting the
    /// returned handles so the sources observe the closed channel and exit cooperatively.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        // Drain so a second call cannot spawn duplicates.
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning event source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}
