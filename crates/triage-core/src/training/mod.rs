//! Ensemble training: clean, augment, split, vectorize, fit, evaluate.

pub mod evaluate;
pub mod split;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::artifacts::{SavedArtifacts, TrainedModel};
use crate::dataset::ProcessedRow;
use crate::domain::{Category, LabeledExample, Result, TriageError};
use crate::features::VectorSpace;
use crate::model::{Classifier, EnsembleModel, EnsembleParams};
use crate::{metrics::METRICS, obs};
use triage_store::ModelStore;

pub use evaluate::{evaluate, EvaluationReport};
pub use split::{stratified_split, SplitIndices};

/// Training run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of copies of the cleaned example set used for training.
    pub augmentation_factor: usize,
    /// Fraction of the augmented set held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the split and the SGD member.
    pub seed: u64,
    pub ensemble: EnsembleParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::with_seed(42)
    }
}

impl TrainingConfig {
    /// Defaults with `seed` threaded through to every seeded component.
    pub fn with_seed(seed: u64) -> Self {
        let mut ensemble = EnsembleParams::default();
        ensemble.sgd.seed = seed;
        Self {
            augmentation_factor: 10,
            test_fraction: 0.2,
            seed,
            ensemble,
        }
    }
}

/// Everything a finished training run produced.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub report: EvaluationReport,
    /// Distinct cleaned examples before augmentation.
    pub examples: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Keep rows with a non-empty normalized text and a known category.
///
/// Returns the usable examples and the number of rows dropped.
pub fn clean_examples(rows: &[ProcessedRow]) -> (Vec<LabeledExample>, usize) {
    let mut examples = Vec::with_capacity(rows.len());
    let mut dropped = 0;
    for (i, row) in rows.iter().enumerate() {
        let text = row
            .normalized_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let category = row.category.as_deref().map(str::parse::<Category>);
        match (text, category) {
            (Some(text), Some(Ok(category))) => examples.push(LabeledExample::new(text, category)),
            (_, Some(Err(err))) => {
                warn!(row = i + 1, error = %err, "dropping row with unknown category");
                dropped += 1;
            }
            _ => {
                debug!(row = i + 1, "dropping row without text or category");
                dropped += 1;
            }
        }
    }
    (examples, dropped)
}

/// Concatenate `factor` exact copies of `examples`.
pub fn augment(examples: &[LabeledExample], factor: usize) -> Vec<LabeledExample> {
    let mut out = Vec::with_capacity(examples.len() * factor);
    for _ in 0..factor {
        out.extend_from_slice(examples);
    }
    out
}

/// Train the vectorizer and ensemble on `examples` and score the held-out split.
///
/// The vectorizer only ever sees training-side text.
pub fn train(examples: &[LabeledExample], config: &TrainingConfig) -> Result<TrainingOutcome> {
    if examples.is_empty() {
        return Err(TriageError::EmptyDataset);
    }
    if config.augmentation_factor == 0 {
        return Err(TriageError::InsufficientData(
            "augmentation factor must be at least 1".to_string(),
        ));
    }
    let started = Instant::now();
    obs::emit_training_started(examples.len(), config.augmentation_factor, config.seed);

    let augmented = augment(examples, config.augmentation_factor);
    let labels: Vec<Category> = augmented.iter().map(|e| e.category).collect();
    let split = stratified_split(&labels, config.test_fraction, config.seed)?;

    let (train_texts, train_labels) = partition(&augmented, &split.train);
    let (test_texts, test_labels) = partition(&augmented, &split.test);

    let vector_space = VectorSpace::fit(&train_texts)?;
    debug!(terms = vector_space.dimension(), "vectorizer fitted");
    let x_train = vector_space.transform_all(&train_texts);
    let x_test = vector_space.transform_all(&test_texts);

    let ensemble = EnsembleModel::fit(&x_train, &train_labels, &config.ensemble)?;
    let predicted = ensemble.predict_all(&x_test);
    let report = evaluate(&test_labels, &predicted);

    METRICS.inc_models_trained();
    obs::emit_training_finished(
        split.train.len(),
        split.test.len(),
        report.accuracy,
        started.elapsed().as_millis() as u64,
    );

    Ok(TrainingOutcome {
        model: TrainedModel::new(vector_space, ensemble),
        report,
        examples: examples.len(),
        train_rows: split.train.len(),
        test_rows: split.test.len(),
    })
}

fn partition<'a>(examples: &'a [LabeledExample], rows: &[usize]) -> (Vec<&'a str>, Vec<Category>) {
    rows.iter()
        .map(|i| (examples[*i].normalized_text.as_str(), examples[*i].category))
        .unzip()
}

/// [`train`], then persist both artifacts through `store`.
pub fn train_and_persist(
    examples: &[LabeledExample],
    config: &TrainingConfig,
    store: &dyn ModelStore,
) -> Result<(TrainingOutcome, SavedArtifacts)> {
    let outcome = train(examples, config)?;
    let saved = outcome.model.save(store)?;
    Ok((outcome, saved))
}
