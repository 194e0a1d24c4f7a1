//! Storage trait definitions for trained artifacts
//!
//! A trained triage model consists of exactly two opaque blobs: the fitted
//! vectorizer and the fitted ensemble. `ModelStore` persists them by kind so a
//! later process can load them back. In-memory fakes are provided for testing
//! via the `fakes` module.

use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// The two artifacts a training run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Fitted TF-IDF vector space
    Vectorizer,
    /// Fitted voting ensemble
    Ensemble,
}

impl ArtifactKind {
    /// All artifact kinds, in the order they are loaded.
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Vectorizer, ArtifactKind::Ensemble];

    /// File name used by filesystem-backed stores.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Vectorizer => "vectorizador.json",
            ArtifactKind::Ensemble => "modelo_entrenado.json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Vectorizer => "vectorizer",
            ArtifactKind::Ensemble => "ensemble",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ArtifactDigest
// ---------------------------------------------------------------------------

/// Content digest (SHA-256 hex string) of a stored artifact.
///
/// The inner field is private to guarantee the string is always valid
/// lowercase hex produced by `from_bytes` or validated via `TryFrom<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactDigest(String);

impl ArtifactDigest {
    /// Compute the SHA-256 digest of the given bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        use sha2::Digest;
        let mut hasher = Sha256::new();
        hasher.update(data);
        ArtifactDigest(hex::encode(hasher.finalize()))
    }

    /// Return the full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl TryFrom<String> for ArtifactDigest {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidDigest { digest: s });
        }
        Ok(ArtifactDigest(s.to_ascii_lowercase()))
    }
}

impl From<ArtifactDigest> for String {
    fn from(d: ArtifactDigest) -> Self {
        d.0
    }
}

impl std::fmt::Display for ArtifactDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ModelStore
// ---------------------------------------------------------------------------

/// Durable key → blob store for trained artifacts.
///
/// Guarantees:
/// - `put(kind, data)` returns the SHA-256 digest of `data` and replaces any
///   previous blob of the same kind.
/// - `get(kind)` returns the exact bytes last stored for `kind`, or
///   `StorageError::NotFound` when nothing was ever stored.
pub trait ModelStore: Send + Sync {
    /// Store the blob for `kind` and return its digest.
    fn put(&self, kind: ArtifactKind, data: &[u8]) -> StorageResult<ArtifactDigest>;

    /// Retrieve the blob for `kind`.
    fn get(&self, kind: ArtifactKind) -> StorageResult<Vec<u8>>;

    /// Check whether a blob for `kind` exists without reading it.
    fn contains(&self, kind: ArtifactKind) -> StorageResult<bool>;

    /// True when every artifact kind is present.
    fn is_trained(&self) -> StorageResult<bool> {
        for kind in ArtifactKind::ALL {
            if !self.contains(kind)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_64_hex_chars() {
        let d = ArtifactDigest::from_bytes(b"hello world");
        assert_eq!(d.as_str().len(), 64);
        assert_eq!(d.short().len(), 12);
    }

    #[test]
    fn digest_try_from_rejects_garbage() {
        assert!(ArtifactDigest::try_from("not-hex".to_string()).is_err());
        assert!(ArtifactDigest::try_from("abcd".to_string()).is_err());
    }

    #[test]
    fn digest_try_from_lowercases() {
        let upper = "A".repeat(64);
        let d = ArtifactDigest::try_from(upper).unwrap();
        assert_eq!(d.as_str(), "a".repeat(64));
    }

    #[test]
    fn artifact_file_names_are_distinct() {
        assert_ne!(
            ArtifactKind::Vectorizer.file_name(),
            ArtifactKind::Ensemble.file_name()
        );
    }
}
