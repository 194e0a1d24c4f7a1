//! Structured lifecycle events for training runs and inference batches.
//!
//! Every event carries an `event` field (`training.started`,
//! `batch.finished`, ...) so JSON log output can be filtered on it.

use tracing::{info, warn};

use crate::domain::{Category, Priority};

/// RAII guard that keeps a batch-scoped span entered for its lifetime.
pub struct BatchSpan {
    _span: tracing::span::EnteredSpan,
}

impl BatchSpan {
    pub fn enter(input: &str) -> Self {
        let span = tracing::info_span!("triage.batch", input = %input);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_training_started(examples: usize, augmentation_factor: usize, seed: u64) {
    info!(
        event = "training.started",
        examples = examples,
        augmentation_factor = augmentation_factor,
        seed = seed,
    );
}

pub fn emit_training_finished(train_rows: usize, test_rows: usize, accuracy: f64, duration_ms: u64) {
    info!(
        event = "training.finished",
        train_rows = train_rows,
        test_rows = test_rows,
        accuracy = accuracy,
        duration_ms = duration_ms,
    );
}

pub fn emit_batch_started(tickets: usize) {
    info!(event = "batch.started", tickets = tickets);
}

pub fn emit_ticket_classified(ticket_id: &str, category: Category, priority: Priority) {
    tracing::debug!(
        event = "ticket.classified",
        ticket_id = %ticket_id,
        category = %category,
        priority = %priority,
    );
}

/// Sink failures are logged and never abort the batch.
pub fn emit_sink_delivery_failed(ticket_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "sink.delivery_failed", ticket_id = %ticket_id, error = %error);
}

pub fn emit_batch_finished(tickets: usize, delivered: usize, failed: usize, duration_ms: u64) {
    info!(
        event = "batch.finished",
        tickets = tickets,
        delivered = delivered,
        failed = failed,
        duration_ms = duration_ms,
    );
}
