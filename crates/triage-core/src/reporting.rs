//! JSON artifacts written at the end of a run: the prediction batch and the
//! training report.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifacts::SavedArtifacts;
use crate::domain::{PredictionRecord, Result};
use crate::training::{EvaluationReport, TrainingConfig, TrainingOutcome};

pub const TRAINING_REPORT_SCHEMA: &str = "1.0";

/// Persisted summary of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReportArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    /// Cleaned, distinct examples before augmentation.
    pub examples: usize,
    /// Rows dropped for missing text or category.
    pub dropped: usize,
    pub augmentation_factor: usize,
    pub seed: u64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub vocabulary_size: usize,
    pub evaluation: EvaluationReport,
    pub artifacts: SavedArtifacts,
}

impl TrainingReportArtifact {
    pub fn new(
        outcome: &TrainingOutcome,
        saved: &SavedArtifacts,
        config: &TrainingConfig,
        dropped: usize,
    ) -> Self {
        Self {
            schema_version: TRAINING_REPORT_SCHEMA.to_string(),
            generated_at: Utc::now(),
            examples: outcome.examples,
            dropped,
            augmentation_factor: config.augmentation_factor,
            seed: config.seed,
            train_rows: outcome.train_rows,
            test_rows: outcome.test_rows,
            vocabulary_size: outcome.model.vector_space().dimension(),
            evaluation: outcome.report.clone(),
            artifacts: saved.clone(),
        }
    }
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}

/// Write the prediction batch as a pretty-printed JSON array. Non-ASCII
/// text is written as UTF-8, not escaped.
pub fn write_predictions_json(path: &Path, records: &[PredictionRecord]) -> Result<()> {
    write_pretty(path, records)
}

pub fn write_training_report_json(path: &Path, report: &TrainingReportArtifact) -> Result<()> {
    write_pretty(path, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Priority};

    fn record(id: &str) -> PredictionRecord {
        PredictionRecord {
            ticket_id: id.to_string(),
            category: Category::SoporteGeneral,
            priority: Priority::Media,
            processed_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("parse RFC3339")
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn predictions_file_is_a_pretty_array_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("resultado.json");
        write_predictions_json(&path, &[record("b"), record("a")]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n"));
        let parsed: Vec<PredictionRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].ticket_id, "b");
        assert_eq!(parsed[1].ticket_id, "a");
    }

    #[test]
    fn accented_text_is_not_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        write_predictions_json(&path, &[record("atención-1")]).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("atención-1"));
        assert!(!raw.contains("\\u00f3"));
    }

    #[test]
    fn empty_batch_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        write_predictions_json(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
    }
}
