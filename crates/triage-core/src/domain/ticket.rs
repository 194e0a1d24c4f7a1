//! Tickets, labelled examples and prediction records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::label::{Category, Priority};

/// One support request as read from a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Identifier from the dataset, or the 1-based row position when absent.
    pub id: String,
    /// Raw description. `None` when the cell was empty or missing.
    pub description: Option<String>,
}

impl Ticket {
    /// Build a ticket, falling back to `position` (1-based) for the id.
    pub fn new(id: Option<String>, position: usize, description: Option<String>) -> Self {
        let id = id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| position.to_string());
        Self { id, description }
    }

    /// Raw description text, empty when missing.
    pub fn text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// A normalized description paired with its rule-derived category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub normalized_text: String,
    pub category: Category,
}

impl LabeledExample {
    pub fn new(normalized_text: impl Into<String>, category: Category) -> Self {
        Self {
            normalized_text: normalized_text.into(),
            category,
        }
    }
}

/// Per-ticket inference output. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub ticket_id: String,
    #[serde(rename = "categoria_predicha")]
    pub category: Category,
    #[serde(rename = "prioridad")]
    pub priority: Priority,
    #[serde(rename = "procesado_en")]
    pub processed_at: DateTime<Utc>,
}
