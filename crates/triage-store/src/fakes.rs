//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryModelStore`, which satisfies the `ModelStore` contract
//! without touching the filesystem.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::storage_traits::*;

/// In-memory model store backed by a `HashMap<kind, bytes>`.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    store: Mutex<HashMap<ArtifactKind, Vec<u8>>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of artifacts currently held.
    pub fn len(&self) -> usize {
        self.store.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::Io(std::io::Error::other("memory store lock poisoned"))
}

impl ModelStore for MemoryModelStore {
    fn put(&self, kind: ArtifactKind, data: &[u8]) -> StorageResult<ArtifactDigest> {
        let digest = ArtifactDigest::from_bytes(data);
        let mut store = self.store.lock().map_err(|_| poisoned())?;
        store.insert(kind, data.to_vec());
        Ok(digest)
    }

    fn get(&self, kind: ArtifactKind) -> StorageResult<Vec<u8>> {
        let store = self.store.lock().map_err(|_| poisoned())?;
        store
            .get(&kind)
            .cloned()
            .ok_or(StorageError::NotFound { kind })
    }

    fn contains(&self, kind: ArtifactKind) -> StorageResult<bool> {
        let store = self.store.lock().map_err(|_| poisoned())?;
        Ok(store.contains_key(&kind))
    }
}
