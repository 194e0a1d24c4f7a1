//! Held-out accuracy and confusion matrix.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::Category;

/// Result of scoring predictions against rule-derived labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub correct: usize,
    pub accuracy: f64,
    /// Categories present in either the truth or the predictions, in canonical order.
    pub labels: Vec<Category>,
    /// `confusion[i][j]`: rows with true label `labels[i]` predicted as `labels[j]`.
    pub confusion: Vec<Vec<usize>>,
}

impl EvaluationReport {
    pub fn is_perfect(&self) -> bool {
        self.correct == self.samples
    }

    /// Human-readable accuracy line, e.g. `Accuracy: 0.93 (93%)`.
    pub fn accuracy_line(&self) -> String {
        format!(
            "Accuracy: {:.2} ({:.0}%)",
            self.accuracy,
            self.accuracy * 100.0
        )
    }

    /// Confusion matrix as a labelled text grid.
    pub fn render_confusion(&self) -> String {
        let width = self
            .labels
            .iter()
            .map(|l| l.label().chars().count())
            .max()
            .unwrap_or(0)
            .max(
                self.confusion
                    .iter()
                    .flatten()
                    .map(|n| n.to_string().len())
                    .max()
                    .unwrap_or(1),
            );

        let mut out = format!("{:width$}", "", width = width);
        for label in &self.labels {
            out.push_str(&format!("  {:>width$}", label.label(), width = width));
        }
        out.push('\n');
        for (label, row) in self.labels.iter().zip(&self.confusion) {
            out.push_str(&format!("{:<width$}", label.label(), width = width));
            for n in row {
                out.push_str(&format!("  {:>width$}", n, width = width));
            }
            out.push('\n');
        }
        out
    }

    /// Accuracy line, followed by the confusion matrix unless every
    /// prediction was correct.
    pub fn render(&self) -> String {
        let mut out = self.accuracy_line();
        out.push('\n');
        if !self.is_perfect() {
            out.push_str("\nConfusion matrix (rows = true, columns = predicted):\n");
            out.push_str(&self.render_confusion());
        }
        out
    }
}

/// Score `predicted` against `truth` (same length, same row order).
pub fn evaluate(truth: &[Category], predicted: &[Category]) -> EvaluationReport {
    let labels: Vec<Category> = truth
        .iter()
        .chain(predicted)
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let position = |c: Category| labels.iter().position(|l| *l == c).unwrap_or(0);

    let mut confusion = vec![vec![0usize; labels.len()]; labels.len()];
    let mut correct = 0;
    for (t, p) in truth.iter().zip(predicted) {
        confusion[position(*t)][position(*p)] += 1;
        if t == p {
            correct += 1;
        }
    }

    let samples = truth.len().min(predicted.len());
    let accuracy = if samples == 0 {
        0.0
    } else {
        correct as f64 / samples as f64
    };

    EvaluationReport {
        samples,
        correct,
        accuracy,
        labels,
        confusion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let truth = [Category::Ti, Category::Rrhh];
        let report = evaluate(&truth, &truth);
        assert!(report.is_perfect());
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.render(), "Accuracy: 1.00 (100%)\n");
    }

    #[test]
    fn confusion_rows_are_truth_columns_are_predictions() {
        let truth = [Category::Ti, Category::Ti, Category::Finanzas, Category::Rrhh];
        let pred = [Category::Ti, Category::Finanzas, Category::Finanzas, Category::Ti];
        let report = evaluate(&truth, &pred);

        assert_eq!(report.labels, vec![Category::Finanzas, Category::Rrhh, Category::Ti]);
        assert_eq!(
            report.confusion,
            vec![vec![1, 0, 0], vec![0, 0, 1], vec![1, 0, 1]]
        );
        assert_eq!(report.correct, 2);
        assert_eq!(report.accuracy_line(), "Accuracy: 0.50 (50%)");
    }

    #[test]
    fn render_includes_matrix_when_imperfect() {
        let truth = [Category::Ti, Category::SoporteGeneral];
        let pred = [Category::Ti, Category::Ti];
        let rendered = evaluate(&truth, &pred).render();
        assert!(rendered.contains("Confusion matrix"));
        assert!(rendered.contains("Soporte General"));
    }

    #[test]
    fn empty_input_has_zero_accuracy() {
        let report = evaluate(&[], &[]);
        assert_eq!(report.samples, 0);
        assert_eq!(report.accuracy, 0.0);
        assert!(report.labels.is_empty());
    }
}
