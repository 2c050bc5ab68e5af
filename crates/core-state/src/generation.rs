//! Stale-result guard for asynchronous pipeline runs.
//!
//! Every pipeline invocation takes a fresh generation from `issue`. When its
//! result arrives, `accept` admits it only if it is newer than the last
//! applied generation; otherwise the result is discarded. Completion order is
//! irrelevant: once generation N+1 is applied, a late N is always rejected.
//! In-flight work is never cancelled, only ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Monotonic invocation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

#[derive(Debug, Default)]
pub struct GenerationGate {
    issued: u64,
    applied: u64,
    discarded: AtomicU64,
}

impl GenerationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next generation; strictly greater than any issued before.
    pub fn issue(&mut self) -> Generation {
        self.issued += 1;
        Generation(self.issued)
    }

    /// Returns `true` when a result tagged `generation` should be applied.
    pub fn accept(&mut self, generation: Generation) -> bool {
        if generation.0 > self.applied {
            self.applied = generation.0;
            true
        } else {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            debug!(
                target: "state.generation",
                stale = generation.0,
                applied = self.applied,
                "stale_result_discarded"
            );
            false
        }
    }

    pub fn latest_issued(&self) -> Generation {
        Generation(self.issued)
    }

    pub fn last_applied(&self) -> Generation {
        Generation(self.applied)
    }

    /// Issued but not yet superseded by an applied result.
    pub fn in_flight(&self) -> bool {
        self.issued > self.applied
    }

    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}
