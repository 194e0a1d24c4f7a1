//! Global atomic counters for triage runs.
//!
//! Counters are bumped silently at the call site. [`Metrics::flush`] emits
//! the current values as one `tracing::info!` event, typically at the end of
//! a batch.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    tickets_processed: AtomicU64,
    sink_delivered: AtomicU64,
    sink_failed: AtomicU64,
    models_trained: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            tickets_processed: AtomicU64::new(0),
            sink_delivered: AtomicU64::new(0),
            sink_failed: AtomicU64::new(0),
            models_trained: AtomicU64::new(0),
        }
    }

    pub fn inc_tickets_processed(&self) {
        self.tickets_processed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "tickets_processed", "counter incremented");
    }

    pub fn inc_sink_delivered(&self) {
        self.sink_delivered.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "sink_delivered", "counter incremented");
    }

    pub fn inc_sink_failed(&self) {
        self.sink_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "sink_failed", "counter incremented");
    }

    pub fn inc_models_trained(&self) {
        self.models_trained.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "models_trained", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            tickets_processed = self.tickets_processed(),
            sink_delivered = self.sink_delivered(),
            sink_failed = self.sink_failed(),
            models_trained = self.models_trained(),
        );
    }

    pub fn tickets_processed(&self) -> u64 {
        self.tickets_processed.load(Ordering::Relaxed)
    }

    pub fn sink_delivered(&self) -> u64 {
        self.sink_delivered.load(Ordering::Relaxed)
    }

    pub fn sink_failed(&self) -> u64 {
        self.sink_failed.load(Ordering::Relaxed)
    }

    pub fn models_trained(&self) -> u64 {
        self.models_trained.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.tickets_processed.store(0, Ordering::Relaxed);
        self.sink_delivered.store(0, Ordering::Relaxed);
        self.sink_failed.store(0, Ordering::Relaxed);
        self.models_trained.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment_independently() {
        let m = Metrics::new();
        m.inc_tickets_processed();
        m.inc_tickets_processed();
        m.inc_sink_delivered();
        m.inc_sink_failed();
        m.inc_sink_failed();
        m.inc_sink_failed();
        assert_eq!(m.tickets_processed(), 2);
        assert_eq!(m.sink_delivered(), 1);
        assert_eq!(m.sink_failed(), 3);
        assert_eq!(m.models_trained(), 0);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_tickets_processed();
        m.inc_models_trained();
        m.reset();
        assert_eq!(m.tickets_processed(), 0);
        assert_eq!(m.models_trained(), 0);
    }
}
