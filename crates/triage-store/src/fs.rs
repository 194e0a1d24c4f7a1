use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::storage_traits::{ArtifactDigest, ArtifactKind, ModelStore, StorageResult};

const MANIFEST_FILE: &str = "manifest.json";

/// Filesystem-backed model store.
///
/// Layout:
/// ```text
/// <root>/vectorizador.json
/// <root>/modelo_entrenado.json
/// <root>/manifest.json        { "vectorizer": "<sha256>", "ensemble": "<sha256>" }
/// ```
///
/// Writes are atomic (temp file in the same directory, then rename). Reads are
/// checked against the digest recorded in the manifest when one exists.
pub struct FsModelStore {
    root: PathBuf,
}

impl FsModelStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Open an existing store without creating anything on disk.
    pub fn open(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path where the blob for `kind` lives.
    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    fn read_manifest(&self) -> StorageResult<BTreeMap<String, ArtifactDigest>> {
        match fs::read(self.manifest_path()) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        fs::create_dir_all(&self.root)?;
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(data)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl ModelStore for FsModelStore {
    fn put(&self, kind: ArtifactKind, data: &[u8]) -> StorageResult<ArtifactDigest> {
        let digest = ArtifactDigest::from_bytes(data);
        self.write_atomic(&self.artifact_path(kind), data)?;

        let mut manifest = self.read_manifest()?;
        manifest.insert(kind.as_str().to_string(), digest.clone());
        let encoded = serde_json::to_vec_pretty(&manifest)?;
        self.write_atomic(&self.manifest_path(), &encoded)?;

        debug!(artifact = %kind, digest = %digest.short(), "artifact stored");
        Ok(digest)
    }

    fn get(&self, kind: ArtifactKind) -> StorageResult<Vec<u8>> {
        let data = fs::read(self.artifact_path(kind)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound { kind }
            } else {
                StorageError::Io(e)
            }
        })?;

        match self.read_manifest()?.get(kind.as_str()) {
            Some(expected) => {
                let actual = ArtifactDigest::from_bytes(&data);
                if &actual != expected {
                    return Err(StorageError::DigestMismatch {
                        kind,
                        expected: expected.to_string(),
                        actual: actual.to_string(),
                    });
                }
            }
            None => warn!(artifact = %kind, "no manifest entry; skipping digest check"),
        }

        Ok(data)
    }

    fn contains(&self, kind: ArtifactKind) -> StorageResult<bool> {
        Ok(self.artifact_path(kind).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, FsModelStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsModelStore::new(dir.path().join("models")).unwrap();
        (dir, store)
    }

    #[test]
    fn blob_roundtrip() {
        let (_dir, store) = make_store();
        let data = "{\"vocabulario\": [\"vpn\"]}".as_bytes();
        store.put(ArtifactKind::Vectorizer, data).unwrap();
        assert_eq!(store.get(ArtifactKind::Vectorizer).unwrap(), data);
    }

    #[test]
    fn put_overwrites_previous_blob() {
        let (_dir, store) = make_store();
        store.put(ArtifactKind::Ensemble, b"first").unwrap();
        store.put(ArtifactKind::Ensemble, b"second").unwrap();
        assert_eq!(store.get(ArtifactKind::Ensemble).unwrap(), b"second");
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let (_dir, store) = make_store();
        match store.get(ArtifactKind::Ensemble) {
            Err(StorageError::NotFound { kind }) => assert_eq!(kind, ArtifactKind::Ensemble),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn tampered_blob_fails_digest_check() {
        let (_dir, store) = make_store();
        store.put(ArtifactKind::Vectorizer, b"original").unwrap();
        std::fs::write(store.artifact_path(ArtifactKind::Vectorizer), b"tampered").unwrap();

        let err = store.get(ArtifactKind::Vectorizer).unwrap_err();
        assert!(matches!(err, StorageError::DigestMismatch { .. }));
    }

    #[test]
    fn blob_without_manifest_entry_is_accepted() {
        let (_dir, store) = make_store();
        std::fs::write(store.artifact_path(ArtifactKind::Ensemble), b"hand placed").unwrap();
        assert_eq!(store.get(ArtifactKind::Ensemble).unwrap(), b"hand placed");
    }

    #[test]
    fn is_trained_requires_both_artifacts() {
        let (_dir, store) = make_store();
        assert!(!store.is_trained().unwrap());
        store.put(ArtifactKind::Vectorizer, b"v").unwrap();
        assert!(!store.is_trained().unwrap());
        store.put(ArtifactKind::Ensemble, b"e").unwrap();
        assert!(store.is_trained().unwrap());
    }

    #[test]
    fn open_does_not_create_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("never-created");
        let store = FsModelStore::open(&root);
        assert!(!store.contains(ArtifactKind::Vectorizer).unwrap());
        assert!(!root.exists());
    }
}
