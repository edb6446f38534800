//! Global atomic counters for round observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. on shutdown).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, no allocations and no locking.
pub struct Metrics {
    rounds_completed: AtomicU64,
    evaluator_failures: AtomicU64,
    negotiations_run: AtomicU64,
    judgment_fallbacks: AtomicU64,
    clarifications_attached: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            rounds_completed: AtomicU64::new(0),
            evaluator_failures: AtomicU64::new(0),
            negotiations_run: AtomicU64::new(0),
            judgment_fallbacks: AtomicU64::new(0),
            clarifications_attached: AtomicU64::new(0),
        }
    }

    pub fn inc_rounds_completed(&self) {
        self.rounds_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "rounds_completed", "counter incremented");
    }

    pub fn inc_evaluator_failures(&self) {
        self.evaluator_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "evaluator_failures", "counter incremented");
    }

    pub fn inc_negotiations(&self) {
        self.negotiations_run.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "negotiations_run", "counter incremented");
    }

    pub fn inc_judgment_fallbacks(&self) {
        self.judgment_fallbacks.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "judgment_fallbacks", "counter incremented");
    }

    pub fn inc_clarifications(&self) {
        self.clarifications_attached.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "clarifications_attached", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            rounds_completed = self.rounds_completed(),
            evaluator_failures = self.evaluator_failures(),
            negotiations_run = self.negotiations_run(),
            judgment_fallbacks = self.judgment_fallbacks(),
            clarifications_attached = self.clarifications_attached(),
        );
    }

    pub fn rounds_completed(&self) -> u64 {
        self.rounds_completed.load(Ordering::Relaxed)
    }

    pub fn evaluator_failures(&self) -> u64 {
        self.evaluator_failures.load(Ordering::Relaxed)
    }

    pub fn negotiations_run(&self) -> u64 {
        self.negotiations_run.load(Ordering::Relaxed)
    }

    pub fn judgment_fallbacks(&self) -> u64 {
        self.judgment_fallbacks.load(Ordering::Relaxed)
    }

    pub fn clarifications_attached(&self) -> u64 {
        self.clarifications_attached.load(Ordering::Relaxed)
    }
}
