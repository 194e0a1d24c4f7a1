//! Error types for triage-store

use thiserror::Error;

use crate::storage_traits::ArtifactKind;

/// Errors that can occur in the artifact persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// The artifact has never been written (model not trained yet)
    #[error("artifact not found: {kind}")]
    NotFound { kind: ArtifactKind },

    /// Stored bytes do not hash to the digest recorded at write time
    #[error("digest mismatch for {kind}: expected {expected}, got {actual}")]
    DigestMismatch {
        kind: ArtifactKind,
        expected: String,
        actual: String,
    },

    /// A digest string is not 64 hex characters
    #[error("invalid digest: {digest}")]
    InvalidDigest { digest: String },

    /// The manifest file could not be parsed or written
    #[error("manifest error: {0}")]
    Manifest(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Manifest(err.to_string())
    }
}

impl StorageError {
    /// True when the error means the artifact simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}
