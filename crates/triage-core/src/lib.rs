//! Triage-Core: Helpdesk Ticket Classification
//!
//! Labels Spanish support tickets with keyword rules, learns a TF-IDF voting
//! ensemble from those labels, and classifies new tickets in batch.
//!
//! ## Flow
//!
//! - `labeling`: raw CSV → normalized text + rule category → processed CSV
//! - `training`: processed rows → vectorizer + ensemble → evaluation → store
//! - `pipeline`: raw CSV → prediction records → sink → JSON batch

pub mod artifacts;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod fakes;
pub mod features;
pub mod labeling;
pub mod metrics;
pub mod model;
pub mod obs;
pub mod pipeline;
pub mod reporting;
pub mod rules;
pub mod sink;
pub mod telemetry;
pub mod text;
pub mod training;

pub use artifacts::{SavedArtifacts, TrainedModel};
pub use config::TriageConfig;
pub use dataset::{read_processed, ProcessedRow, TicketTable};
pub use domain::{Category, LabeledExample, PredictionRecord, Priority, Result, Ticket, TriageError};
pub use features::{SparseVector, VectorSpace};
pub use labeling::{category_counts, label_dataset, label_tickets, LabeledTicket};
pub use metrics::METRICS;
pub use model::{majority_vote, Classifier, EnsembleModel, EnsembleParams};
pub use pipeline::{process_dataset, BatchSummary, InferencePipeline};
pub use reporting::{write_predictions_json, write_training_report_json, TrainingReportArtifact};
pub use rules::{assign_category, assign_priority};
pub use sink::{HttpTicketSink, SinkError, SinkPayload, TicketSink};
pub use telemetry::init_tracing;
pub use text::{normalize, normalize_field};
pub use training::{
    clean_examples, train, train_and_persist, EvaluationReport, TrainingConfig, TrainingOutcome,
};

pub use triage_store::{ArtifactKind, FsModelStore, MemoryModelStore, ModelStore, StorageError};
