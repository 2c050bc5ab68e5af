//! Playground state: persisted session and the stale-result guard.
//!
//! Persisted keys (stable across releases):
//! * `sommark-code`   - last edited source text
//! * `sommark-format` - last selected format tag
//!
//! The session is read once at startup. When no source was ever stored, the
//! built-in sample document is used. Writes happen whenever an update result
//! is applied.

mod generation;
mod store;

pub use generation::{Generation, GenerationGate};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};

use tracing::{debug, warn};

pub const SOURCE_KEY: &str = "sommark-code";
pub const FORMAT_KEY: &str = "sommark-format";

/// Document shown on first launch.
pub const SAMPLE_SOURCE: &str = include_str!("sample.sml");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub source: String,
    /// Raw persisted tag; parsing/defaulting is up to the caller.
    pub format: Option<String>,
}

impl Session {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let source = store.get(SOURCE_KEY);
        let from_sample = source.is_none();
        let session = Self {
            source: source.unwrap_or_else(|| SAMPLE_SOURCE.to_string()),
            format: store.get(FORMAT_KEY),
        };
        debug!(
            target: "state.session",
            source_len = session.source.len(),
            from_sample,
            format = session.format.as_deref().unwrap_or("-"),
            "session_loaded"
        );
        session
    }

    pub fn save<S: KeyValueStore + ?Sized>(
        store: &mut S,
        source: &str,
        format: &str,
    ) -> Result<(), StoreError> {
        store.set(SOURCE_KEY, source)?;
        store.set(FORMAT_KEY, format)?;
        Ok(())
    }

    /// `save` that logs instead of failing; persistence never blocks updates.
    pub fn save_or_warn<S: KeyValueStore + ?Sized>(store: &mut S, source: &str, format: &str) {
        if let Err(e) = Self::save(store, source, format) {
            warn!(target: "state.session", error = %e, "session_save_failed");
        }
    }
}
