//! Domain types for ticket triage.

pub mod error;
pub mod label;
pub mod ticket;

pub use error::{Result, TriageError};
pub use label::{Category, Priority};
pub use ticket::{LabeledExample, PredictionRecord, Ticket};
