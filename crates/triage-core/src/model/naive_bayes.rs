//! Multinomial naive Bayes over non-negative feature weights.

use serde::{Deserialize, Serialize};

use super::{argmax, check_training_set, class_position, Classifier};
use crate::domain::{Category, Result};
use crate::features::SparseVector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesParams {
    /// Additive (Laplace) smoothing.
    pub alpha: f64,
}

impl Default for NaiveBayesParams {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

/// Fitted multinomial naive Bayes model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    classes: Vec<Category>,
    class_log_prior: Vec<f64>,
    /// `feature_log_prob[c][j] = ln P(feature j | class c)`
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNaiveBayes {
    pub fn fit(xs: &[SparseVector], ys: &[Category], params: &NaiveBayesParams) -> Result<Self> {
        let classes = check_training_set(xs, ys)?;
        let dim = xs[0].dim();
        let k = classes.len();

        let mut class_count = vec![0.0f64; k];
        let mut feature_count = vec![vec![0.0f64; dim]; k];
        for (x, y) in xs.iter().zip(ys) {
            let c = class_position(&classes, *y);
            class_count[c] += 1.0;
            for (j, v) in x.iter() {
                feature_count[c][j] += v;
            }
        }

        let total = xs.len() as f64;
        let class_log_prior = class_count.iter().map(|n| (n / total).ln()).collect();

        let feature_log_prob = feature_count
            .into_iter()
            .map(|counts| {
                let smoothed_total: f64 =
                    counts.iter().sum::<f64>() + params.alpha * dim as f64;
                counts
                    .into_iter()
                    .map(|n| ((n + params.alpha) / smoothed_total).ln())
                    .collect()
            })
            .collect();

        Ok(Self {
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Joint log likelihood per class.
    pub fn joint_log_likelihood(&self, x: &SparseVector) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, flp)| prior + x.dot(flp))
            .collect()
    }
}

impl Classifier for MultinomialNaiveBayes {
    fn name(&self) -> &'static str {
        "nb"
    }

    fn classes(&self) -> &[Category] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }

    fn predict(&self, x: &SparseVector) -> Category {
        self.classes[argmax(&self.joint_log_likelihood(x))]
    }
}
