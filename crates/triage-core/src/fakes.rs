//! In-memory sinks for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::sink::{SinkError, SinkPayload, TicketSink};

/// Accepts everything and remembers what it was sent.
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<SinkPayload>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads received so far, in delivery order.
    pub fn delivered(&self) -> Vec<SinkPayload> {
        self.delivered
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TicketSink for RecordingSink {
    async fn deliver(&self, payload: &SinkPayload) -> Result<(), SinkError> {
        self.delivered
            .lock()
            .map_err(|e| SinkError::Client(format!("lock poisoned: {e}")))?
            .push(payload.clone());
        Ok(())
    }
}

/// Rejects every payload, or only the ids listed in `fail_ids`.
#[derive(Debug, Default)]
pub struct FailingSink {
    fail_ids: Option<Vec<String>>,
    accepted: Mutex<Vec<SinkPayload>>,
}

impl FailingSink {
    /// Fails every delivery.
    pub fn always() -> Self {
        Self::default()
    }

    /// Fails only deliveries for the given ticket ids.
    pub fn for_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fail_ids: Some(ids.into_iter().map(Into::into).collect()),
            accepted: Mutex::new(Vec::new()),
        }
    }

    pub fn accepted(&self) -> Vec<SinkPayload> {
        self.accepted
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TicketSink for FailingSink {
    async fn deliver(&self, payload: &SinkPayload) -> Result<(), SinkError> {
        let fails = match &self.fail_ids {
            None => true,
            Some(ids) => ids.iter().any(|id| *id == payload.id),
        };
        if fails {
            return Err(SinkError::Status(503));
        }
        self.accepted
            .lock()
            .map_err(|e| SinkError::Client(format!("lock poisoned: {e}")))?
            .push(payload.clone());
        Ok(())
    }
}
