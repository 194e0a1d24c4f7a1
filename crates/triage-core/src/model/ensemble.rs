//! Hard-voting ensemble of the three member classifiers.
//!
//! Each member casts one vote; the category with the most votes wins. Ties
//! (for example a 1-1-1 split) go to the lowest [`Category`] ordinal, i.e.
//! the alphabetically first label.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    check_training_set, Classifier, EnsembleParams, LogisticRegression, MultinomialNaiveBayes,
    SgdClassifier,
};
use crate::domain::{Category, Result};
use crate::features::SparseVector;

/// A fitted ensemble member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Member {
    NaiveBayes(MultinomialNaiveBayes),
    Sgd(SgdClassifier),
    Logistic(LogisticRegression),
}

impl Member {
    fn as_classifier(&self) -> &dyn Classifier {
        match self {
            Member::NaiveBayes(m) => m,
            Member::Sgd(m) => m,
            Member::Logistic(m) => m,
        }
    }
}

impl Classifier for Member {
    fn name(&self) -> &'static str {
        self.as_classifier().name()
    }

    fn classes(&self) -> &[Category] {
        self.as_classifier().classes()
    }

    fn n_features(&self) -> usize {
        self.as_classifier().n_features()
    }

    fn predict(&self, x: &SparseVector) -> Category {
        self.as_classifier().predict(x)
    }
}

/// Winner of a hard vote, ties to the lowest category. `None` for no votes.
pub fn majority_vote(votes: &[Category]) -> Option<Category> {
    let mut tally: BTreeMap<Category, usize> = BTreeMap::new();
    for vote in votes {
        *tally.entry(*vote).or_insert(0) += 1;
    }
    let mut winner: Option<(Category, usize)> = None;
    // Ascending iteration; only a strictly larger count displaces the leader.
    for (category, count) in tally {
        match winner {
            Some((_, best)) if count <= best => {}
            _ => winner = Some((category, count)),
        }
    }
    winner.map(|(category, _)| category)
}

/// Fitted voting ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleModel {
    classes: Vec<Category>,
    members: Vec<Member>,
}

impl EnsembleModel {
    /// Fit naive Bayes, hinge SGD and logistic regression on the same data.
    pub fn fit(xs: &[SparseVector], ys: &[Category], params: &EnsembleParams) -> Result<Self> {
        let classes = check_training_set(xs, ys)?;

        let nb = MultinomialNaiveBayes::fit(xs, ys, &params.naive_bayes)?;
        info!(model = "nb", rows = xs.len(), "member fitted");
        let svm = SgdClassifier::fit(xs, ys, &params.sgd)?;
        info!(model = "svm", rows = xs.len(), "member fitted");
        let lr = LogisticRegression::fit(xs, ys, &params.logistic)?;
        info!(model = "lr", rows = xs.len(), iterations = lr.iterations(), "member fitted");

        Ok(Self {
            classes,
            members: vec![Member::NaiveBayes(nb), Member::Sgd(svm), Member::Logistic(lr)],
        })
    }

    /// Assemble an ensemble from already fitted members.
    pub fn from_members(members: Vec<Member>) -> Self {
        let mut classes: Vec<Category> = members
            .iter()
            .flat_map(|m| m.classes().iter().copied())
            .collect();
        classes.sort();
        classes.dedup();
        Self { classes, members }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Each member's vote, tagged with its name.
    pub fn votes(&self, x: &SparseVector) -> Vec<(&'static str, Category)> {
        self.members
            .iter()
            .map(|m| (m.name(), m.predict(x)))
            .collect()
    }
}

impl Classifier for EnsembleModel {
    fn name(&self) -> &'static str {
        "ensemble"
    }

    fn classes(&self) -> &[Category] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.members.first().map_or(0, |m| m.n_features())
    }

    fn predict(&self, x: &SparseVector) -> Category {
        let votes: Vec<Category> = self.votes(x).into_iter().map(|(_, c)| c).collect();
        majority_vote(&votes).unwrap_or(self.classes[0])
    }
}
