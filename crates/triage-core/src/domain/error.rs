//! Domain-level error taxonomy for ticket triage.

use std::path::PathBuf;

use triage_store::{ArtifactKind, StorageError};

/// Triage domain errors.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("no description column could be resolved among {columns:?}")]
    MissingDescriptionColumn { columns: Vec<String> },

    #[error("dataset has no usable rows")]
    EmptyDataset,

    #[error("model not trained: missing {artifact} artifact (run training first)")]
    ModelNotTrained { artifact: ArtifactKind },

    #[error(
        "model artifacts do not match: vectorizer has {vocabulary} terms but {member} expects {features} (retrain the model)"
    )]
    ArtifactMismatch {
        member: &'static str,
        vocabulary: usize,
        features: usize,
    },

    #[error("empty vocabulary: training documents contain no terms")]
    EmptyVocabulary,

    #[error("training needs at least 2 categories, found {found}")]
    InsufficientClasses { found: usize },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("unknown category label: {0}")]
    UnknownLabel(String),

    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for TriageError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { kind } => TriageError::ModelNotTrained { artifact: kind },
            other => TriageError::Storage(other),
        }
    }
}

impl TriageError {
    /// Conditions that are reported to the operator and end the current
    /// command early, rather than surfacing as internal failures.
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            TriageError::DatasetNotFound(_)
                | TriageError::MissingDescriptionColumn { .. }
                | TriageError::EmptyDataset
                | TriageError::ModelNotTrained { .. }
                | TriageError::ArtifactMismatch { .. }
        )
    }
}

/// Result type for triage domain operations.
pub type Result<T> = std::result::Result<T, TriageError>;
