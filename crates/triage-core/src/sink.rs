//! Best-effort delivery of predictions to a downstream endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TriageConfig;
use crate::domain::{Category, PredictionRecord, Priority};

/// Body posted for each classified ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkPayload {
    pub id: String,
    pub categoria: Category,
    pub prioridad: Priority,
}

impl From<&PredictionRecord> for SinkPayload {
    fn from(record: &PredictionRecord) -> Self {
        SinkPayload {
            id: record.ticket_id.clone(),
            categoria: record.category,
            prioridad: record.priority,
        }
    }
}

/// Why a payload was not delivered.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("endpoint answered {0}")]
    Status(u16),

    #[error("http client setup failed: {0}")]
    Client(String),
}

/// Destination for classified tickets. Failures never abort a batch.
#[async_trait]
pub trait TicketSink: Send + Sync {
    async fn deliver(&self, payload: &SinkPayload) -> Result<(), SinkError>;
}

/// Posts each payload as JSON with a per-request timeout. No retries.
#[derive(Debug, Clone)]
pub struct HttpTicketSink {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpTicketSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ticket-triage/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Client(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &TriageConfig) -> Result<Self, SinkError> {
        Self::new(config.sink_url.clone(), config.sink_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TicketSink for HttpTicketSink {
    async fn deliver(&self, payload: &SinkPayload) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SinkError::Timeout(self.timeout)
                } else {
                    SinkError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status(status.as_u16()));
        }
        debug!(ticket_id = %payload.id, status = status.as_u16(), "payload delivered");
        Ok(())
    }
}
