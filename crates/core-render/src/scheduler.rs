//! Update scheduler: trailing-edge debounce for the heavy pipeline.
//!
//! Producers `submit` every input event together with the time it happened.
//! Each submission replaces the pending payload and pushes the deadline to
//! `now + window`. `poll(now)` hands the payload out once `now` reaches the
//! deadline. Consequences:
//! - Only the last event of a burst fires; earlier payloads are dropped
//!   (counted as coalesced).
//! - No leading-edge call: a lone event still waits a full window.
//! - No maximum-wait ceiling: a steady stream of events faster than the window
//!   postpones the call indefinitely.
//!
//! The type holds no timer and does no I/O. The runtime sleeps until
//! `deadline()` and then calls `poll`; tests drive it with synthetic instants.
//!
//! Example (window 500ms): events at 0, 100, 150, 480 => one fire at 980 with
//! the 480 payload.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

/// Quiescence window used when configuration does not override it.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<Pending<T>>,
    metrics: DebounceMetrics,
}

#[derive(Debug)]
struct Pending<T> {
    payload: T,
    deadline: Instant,
}

/// Relaxed counters; snapshot for diagnostics and tests.
#[derive(Debug, Default)]
pub struct DebounceMetrics {
    submitted: AtomicU64,
    coalesced: AtomicU64,
    fired: AtomicU64,
    cancelled: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebounceMetricsSnapshot {
    pub submitted: u64,
    pub coalesced: u64,
    pub fired: u64,
    pub cancelled: u64,
}

impl DebounceMetrics {
    pub fn snapshot(&self) -> DebounceMetricsSnapshot {
        DebounceMetricsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            fired: self.fired.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            metrics: DebounceMetrics::default(),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record an input event. Cancels any pending payload and reschedules.
    pub fn submit(&mut self, payload: T, now: Instant) {
        self.metrics.submitted.fetch_add(1, Ordering::Relaxed);
        let deadline = now + self.window;
        if self
            .pending
            .replace(Pending { payload, deadline })
            .is_some()
        {
            self.metrics.coalesced.fetch_add(1, Ordering::Relaxed);
            trace!(target: "render.scheduler", window_ms = self.window.as_millis() as u64, "rescheduled");
        } else {
            trace!(target: "render.scheduler", window_ms = self.window.as_millis() as u64, "scheduled");
        }
    }

    /// When the pending payload becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the payload if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some(p) if now >= p.deadline => {
                self.metrics.fired.fetch_add(1, Ordering::Relaxed);
                trace!(target: "render.scheduler", "fired");
                Some(p.payload)
            }
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Drop the pending payload without firing (e.g. an immediate update
    /// superseded it).
    pub fn cancel(&mut self) -> Option<T> {
        let taken = self.pending.take().map(|p| p.payload);
        if taken.is_some() {
            self.metrics.cancelled.fetch_add(1, Ordering::Relaxed);
        }
        taken
    }

    pub fn metrics(&self) -> &DebounceMetrics {
        &self.metrics
    }
}
