//! Triage-Store: Artifact Persistence for Ticket Triage
//!
//! This crate provides the persistence layer for trained triage models. It
//! stores the fitted vectorizer and the fitted ensemble as opaque blobs and
//! reports a distinct "not found" condition when a model has not been
//! trained yet.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: durable, verifiable artifacts that a later process can reload.
//!
//! ## Key Components
//!
//! - `ModelStore`: key → blob persistence contract
//! - `FsModelStore`: directory-backed store with a digest manifest
//! - `MemoryModelStore`: in-memory fake for tests

mod error;
pub mod fakes;
pub mod fs;
pub mod storage_traits;

pub use error::StorageError;
pub use fakes::MemoryModelStore;
pub use fs::FsModelStore;
pub use storage_traits::{ArtifactDigest, ArtifactKind, ModelStore, StorageResult};
