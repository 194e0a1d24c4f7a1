//! Text normalization shared by training and inference.
//!
//! [`normalize`] lowercases, strips everything that is neither a letter,
//! digit, underscore nor whitespace, drops Spanish stopwords and rejoins the
//! surviving tokens with single spaces. It is a pure function of its input: the trainer
//! and the inference pipeline both call it, so the normalized text a model
//! sees at inference is byte-identical to what it was trained on.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Spanish stopwords, loaded once and shared read-only.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    include_str!("stopwords_es.txt")
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .collect()
});

// Word characters are letters, digits and underscore. Combining marks and
// connector punctuation are stripped like any other symbol.
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}_\s]").expect("punctuation pattern is valid"));

/// True if `word` (already lowercase) is a Spanish stopword.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Number of stopwords in the built-in list.
pub fn stopword_count() -> usize {
    STOPWORDS.len()
}

/// Normalize free text into a space-joined string of content tokens.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    stripped
        .split_whitespace()
        .filter(|token| !is_stopword(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a dataset field that may be missing. Missing input yields `""`.
pub fn normalize_field(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}
