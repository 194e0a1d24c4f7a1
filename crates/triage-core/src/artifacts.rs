//! The trained model pair and its persistence through a [`ModelStore`].
//!
//! Both artifacts are stored as JSON. Floats are written with full
//! round-trip precision, so a reloaded model predicts exactly like the one
//! that was saved.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use triage_store::{ArtifactDigest, ArtifactKind, ModelStore};

use crate::domain::{Category, Result, TriageError};
use crate::features::{SparseVector, VectorSpace};
use crate::model::{Classifier, EnsembleModel};

/// Fitted vectorizer plus the ensemble trained in its feature space.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    vector_space: VectorSpace,
    ensemble: EnsembleModel,
}

/// Digests of the artifacts written by [`TrainedModel::save`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedArtifacts {
    pub vectorizer: ArtifactDigest,
    pub ensemble: ArtifactDigest,
}

impl TrainedModel {
    pub fn new(vector_space: VectorSpace, ensemble: EnsembleModel) -> Self {
        Self {
            vector_space,
            ensemble,
        }
    }

    pub fn vector_space(&self) -> &VectorSpace {
        &self.vector_space
    }

    pub fn ensemble(&self) -> &EnsembleModel {
        &self.ensemble
    }

    /// Feature vector for already normalized text.
    pub fn features(&self, normalized_text: &str) -> SparseVector {
        self.vector_space.transform(normalized_text)
    }

    /// Predict the category of already normalized text.
    pub fn predict(&self, normalized_text: &str) -> Category {
        self.ensemble.predict(&self.features(normalized_text))
    }

    /// Serialize both artifacts into `store`.
    pub fn save(&self, store: &dyn ModelStore) -> Result<SavedArtifacts> {
        let vectorizer = store.put(
            ArtifactKind::Vectorizer,
            &serde_json::to_vec(&self.vector_space)?,
        )?;
        let ensemble = store.put(ArtifactKind::Ensemble, &serde_json::to_vec(&self.ensemble)?)?;
        info!(
            vectorizer = %vectorizer.short(),
            ensemble = %ensemble.short(),
            "model artifacts saved"
        );
        Ok(SavedArtifacts {
            vectorizer,
            ensemble,
        })
    }

    /// Load both artifacts from `store`.
    ///
    /// A missing artifact surfaces as [`TriageError::ModelNotTrained`](crate::TriageError::ModelNotTrained).
    /// An ensemble fitted in a different feature space than the stored
    /// vectorizer, e.g. after a save interrupted between the two writes,
    /// is rejected with [`TriageError::ArtifactMismatch`].
    pub fn load(store: &dyn ModelStore) -> Result<Self> {
        let vector_space: VectorSpace =
            serde_json::from_slice(&store.get(ArtifactKind::Vectorizer)?)?;
        let ensemble: EnsembleModel = serde_json::from_slice(&store.get(ArtifactKind::Ensemble)?)?;
        check_dimensions(&vector_space, &ensemble)?;
        debug!(
            terms = vector_space.dimension(),
            members = ensemble.members().len(),
            "model artifacts loaded"
        );
        Ok(Self::new(vector_space, ensemble))
    }
}

fn check_dimensions(vector_space: &VectorSpace, ensemble: &EnsembleModel) -> Result<()> {
    let vocabulary = vector_space.dimension();
    match ensemble
        .members()
        .iter()
        .find(|m| m.n_features() != vocabulary)
    {
        Some(member) => Err(TriageError::ArtifactMismatch {
            member: member.name(),
            vocabulary,
            features: member.n_features(),
        }),
        None => Ok(()),
    }
}
