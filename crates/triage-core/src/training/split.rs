//! Seeded stratified train/test split.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::domain::{Category, Result, TriageError};

/// Row indices of each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Allocate `total` draws across classes proportionally to `counts`.
///
/// Each class gets the floor of its exact share; leftover draws go to the
/// classes with the largest fractional remainder, lower ordinal first on
/// ties. No class receives more than it has.
fn allocate(counts: &[usize], total: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    let exact: Vec<f64> = counts
        .iter()
        .map(|c| *c as f64 * total as f64 / n as f64)
        .collect();
    let mut alloc: Vec<usize> = exact
        .iter()
        .zip(counts)
        .map(|(e, c)| (e.floor() as usize).min(*c))
        .collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|a, b| {
        let fa = exact[*a] - exact[*a].floor();
        let fb = exact[*b] - exact[*b].floor();
        fb.partial_cmp(&fa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(b))
    });

    let mut remaining = total.saturating_sub(alloc.iter().sum());
    while remaining > 0 {
        let before = remaining;
        for &i in &order {
            if remaining == 0 {
                break;
            }
            if alloc[i] < counts[i] {
                alloc[i] += 1;
                remaining -= 1;
            }
        }
        if remaining == before {
            break;
        }
    }
    alloc
}

/// Split rows into train and test partitions, preserving class proportions.
///
/// `ceil(test_fraction * n)` rows go to the test side. The same labels, fraction
/// and seed always produce the same partitions.
pub fn stratified_split(labels: &[Category], test_fraction: f64, seed: u64) -> Result<SplitIndices> {
    let n = labels.len();
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(TriageError::InsufficientData(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let mut by_class: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        by_class.entry(*label).or_default().push(i);
    }

    let n_test = (test_fraction * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    let n_classes = by_class.len();

    if let Some((category, rows)) = by_class.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(TriageError::InsufficientData(format!(
            "category {category} has {} row(s); stratified split needs at least 2",
            rows.len()
        )));
    }
    if n_test < n_classes || n_train < n_classes {
        return Err(TriageError::InsufficientData(format!(
            "{n} rows cannot be split {n_train}/{n_test} across {n_classes} categories"
        )));
    }

    let counts: Vec<usize> = by_class.values().map(Vec::len).collect();
    let test_alloc = allocate(&counts, n_test);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);
    for (mut rows, take) in by_class.into_values().zip(test_alloc) {
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..take]);
        train.extend_from_slice(&rows[take..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(SplitIndices { train, test })
}
