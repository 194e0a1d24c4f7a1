//! Text classifiers over TF-IDF features and their voting ensemble.
//!
//! Every classifier keeps its class list in canonical [`Category`] order and
//! resolves score ties towards the lowest ordinal, so predictions are fully
//! deterministic.

pub mod ensemble;
pub mod logistic;
pub mod naive_bayes;
pub mod sgd;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Result, TriageError};
use crate::features::SparseVector;

pub use ensemble::{majority_vote, EnsembleModel, Member};
pub use logistic::{LogisticParams, LogisticRegression};
pub use naive_bayes::{MultinomialNaiveBayes, NaiveBayesParams};
pub use sgd::{SgdClassifier, SgdParams};

/// A fitted classifier.
pub trait Classifier {
    /// Short identifier used in logs and vote breakdowns.
    fn name(&self) -> &'static str;

    /// Classes the model was fitted on, in canonical order.
    fn classes(&self) -> &[Category];

    /// Length of the feature vectors the model was fitted on.
    fn n_features(&self) -> usize;

    /// Predict the category for one feature vector.
    fn predict(&self, x: &SparseVector) -> Category;

    fn predict_all(&self, xs: &[SparseVector]) -> Vec<Category> {
        xs.iter().map(|x| self.predict(x)).collect()
    }
}

/// Hyperparameters for the three ensemble members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnsembleParams {
    pub naive_bayes: NaiveBayesParams,
    pub sgd: SgdParams,
    pub logistic: LogisticParams,
}

/// Index of the maximum score. Ties go to the lowest index.
pub fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, s) in scores.iter().enumerate().skip(1) {
        if *s > scores[best] {
            best = i;
        }
    }
    best
}

/// Distinct labels in canonical order.
pub fn sorted_classes(labels: &[Category]) -> Vec<Category> {
    labels.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Common preconditions for fitting: matching lengths, at least two classes,
/// and a consistent feature dimension. Returns the class list.
pub(crate) fn check_training_set(xs: &[SparseVector], ys: &[Category]) -> Result<Vec<Category>> {
    if xs.len() != ys.len() {
        return Err(TriageError::InsufficientData(format!(
            "{} feature rows but {} labels",
            xs.len(),
            ys.len()
        )));
    }
    if xs.is_empty() {
        return Err(TriageError::InsufficientData("no training rows".to_string()));
    }
    let dim = xs[0].dim();
    if xs.iter().any(|x| x.dim() != dim) {
        return Err(TriageError::InsufficientData(
            "feature rows have inconsistent dimensions".to_string(),
        ));
    }
    let classes = sorted_classes(ys);
    if classes.len() < 2 {
        return Err(TriageError::InsufficientClasses {
            found: classes.len(),
        });
    }
    Ok(classes)
}

/// Position of `category` in `classes`.
pub(crate) fn class_position(classes: &[Category], category: Category) -> usize {
    classes
        .binary_search(&category)
        .unwrap_or_else(|insert_at| insert_at.min(classes.len().saturating_sub(1)))
}
