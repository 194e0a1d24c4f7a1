//! TF-IDF feature space over word unigrams and bigrams.
//!
//! [`VectorSpace::fit`] freezes a vocabulary and inverse-document-frequency
//! weights from a training corpus; [`VectorSpace::transform`] maps any text
//! into that fixed space. Terms outside the vocabulary are dropped, so text
//! made only of unseen words becomes an all-zero vector.
//!
//! Weighting:
//! - tokens are runs of two or more word characters
//! - `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
//! - a document vector is raw term counts times idf, then L2-normalized

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{Result, TriageError};

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

// ---------------------------------------------------------------------------
// SparseVector
// ---------------------------------------------------------------------------

/// Sparse feature vector with strictly increasing indices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// All-zero vector of dimension `dim`.
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from `(index, value)` pairs. Pairs are sorted, duplicate indices
    /// summed, and zero values dropped.
    pub fn from_pairs(dim: usize, pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut acc: BTreeMap<usize, f64> = BTreeMap::new();
        for (i, v) in pairs {
            debug_assert!(i < dim, "index {i} out of bounds for dim {dim}");
            *acc.entry(i).or_insert(0.0) += v;
        }
        let (indices, values) = acc.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        Self {
            dim,
            indices,
            values,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Dot product with a dense vector of the same dimension.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(i, v)| v * dense[i]).sum()
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.dim];
        for (i, v) in self.iter() {
            out[i] = v;
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Term extraction
// ---------------------------------------------------------------------------

/// Extract word n-grams for `n` in `min_n..=max_n`, in document order.
pub fn extract_terms(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let tokens: Vec<&str> = TOKEN.find_iter(text).map(|m| m.as_str()).collect();
    let mut terms = Vec::new();
    for n in min_n.max(1)..=max_n {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

// ---------------------------------------------------------------------------
// VectorSpace
// ---------------------------------------------------------------------------

/// Fitted vocabulary plus IDF weights. Immutable once fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSpace {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    n_documents: usize,
}

impl VectorSpace {
    /// Default n-gram range: unigrams and bigrams.
    pub const DEFAULT_NGRAM_RANGE: (usize, usize) = (1, 2);

    /// Fit a unigram + bigram space on `corpus`.
    pub fn fit<S: AsRef<str>>(corpus: &[S]) -> Result<Self> {
        Self::fit_with_ngrams(corpus, Self::DEFAULT_NGRAM_RANGE)
    }

    /// Fit with an explicit n-gram range. Every term seen in at least one
    /// document enters the vocabulary.
    pub fn fit_with_ngrams<S: AsRef<str>>(corpus: &[S], ngram_range: (usize, usize)) -> Result<Self> {
        let (min_n, max_n) = ngram_range;
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for doc in corpus {
            let unique: HashSet<String> = extract_terms(doc.as_ref(), min_n, max_n)
                .into_iter()
                .collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(TriageError::EmptyVocabulary);
        }

        let n = corpus.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        // BTreeMap iteration is lexicographic, so indices follow term order.
        for (idx, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, idx);
        }

        Ok(Self {
            vocabulary,
            idf,
            ngram_range,
            n_documents: corpus.len(),
        })
    }

    /// Map `text` into the fitted space. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let (min_n, max_n) = self.ngram_range;
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in extract_terms(text, min_n, max_n) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let weighted: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        let norm = weighted.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return SparseVector::zeros(self.dimension());
        }
        SparseVector::from_pairs(
            self.dimension(),
            weighted.into_iter().map(|(i, v)| (i, v / norm)),
        )
    }

    /// Transform a batch of documents.
    pub fn transform_all<S: AsRef<str>>(&self, docs: &[S]) -> Vec<SparseVector> {
        docs.iter().map(|d| self.transform(d.as_ref())).collect()
    }

    /// Number of features (vocabulary size).
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Column index of `term`, if it is in the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// IDF weight of `term`, if it is in the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.term_index(term).map(|i| self.idf[i])
    }
}
