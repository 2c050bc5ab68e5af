//! Reconcile timing instrumentation.
//!
//! Captures the duration of the last completed highlight pass in nanoseconds.
use std::sync::atomic::{AtomicU64, Ordering};

/// Last-value duration cell.
#[derive(Debug, Default)]
pub struct ReconcileTimer {
    last_ns: AtomicU64,
}

impl ReconcileTimer {
    pub const fn new() -> Self {
        Self {
            last_ns: AtomicU64::new(0),
        }
    }

    pub fn record(&self, ns: u64) {
        self.last_ns.store(ns, Ordering::Relaxed);
    }

    pub fn last(&self) -> u64 {
        self.last_ns.load(Ordering::Relaxed)
    }
}

static LAST_RECONCILE: ReconcileTimer = ReconcileTimer::new();

/// Record a highlight pass duration in nanoseconds.
pub fn record_last_reconcile_ns(ns: u64) {
    LAST_RECONCILE.record(ns);
}

/// Fetch the last recorded highlight pass duration in nanoseconds.
pub fn last_reconcile_ns() -> u64 {
    LAST_RECONCILE.last()
}
