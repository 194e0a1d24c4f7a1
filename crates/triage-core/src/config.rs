//! Runtime configuration with environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_MODEL_DIR: &str = "TRIAGE_MODEL_DIR";
pub const ENV_OUTPUT: &str = "TRIAGE_OUTPUT";
pub const ENV_SINK_URL: &str = "TRIAGE_SINK_URL";
pub const ENV_SINK_TIMEOUT_MS: &str = "TRIAGE_SINK_TIMEOUT_MS";

pub const DEFAULT_MODEL_DIR: &str = "models";
pub const DEFAULT_OUTPUT: &str = "output/resultado.json";
pub const DEFAULT_SINK_URL: &str = "https://jsonplaceholder.typicode.com/posts";
pub const DEFAULT_SINK_TIMEOUT_MS: u64 = 2000;

/// Where artifacts live and where predictions go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Directory holding the vectorizer and ensemble artifacts.
    pub model_dir: PathBuf,
    /// JSON file receiving the prediction batch.
    pub output_path: PathBuf,
    /// Endpoint each prediction is posted to.
    pub sink_url: String,
    pub sink_timeout_ms: u64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        TriageConfig {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            sink_url: DEFAULT_SINK_URL.to_string(),
            sink_timeout_ms: DEFAULT_SINK_TIMEOUT_MS,
        }
    }
}

impl TriageConfig {
    /// Defaults overridden by `TRIAGE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Blank values and
    /// unparsable timeouts are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        TriageConfig {
            model_dir: get(ENV_MODEL_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            output_path: get(ENV_OUTPUT)
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            sink_url: get(ENV_SINK_URL).unwrap_or(defaults.sink_url),
            sink_timeout_ms: get(ENV_SINK_TIMEOUT_MS)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.sink_timeout_ms),
        }
    }

    pub fn sink_timeout(&self) -> Duration {
        Duration::from_millis(self.sink_timeout_ms)
    }

    /// Location of the persisted training report.
    pub fn training_report_path(&self) -> PathBuf {
        self.model_dir.join("training_report.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = TriageConfig::default();
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert_eq!(config.output_path, PathBuf::from("output/resultado.json"));
        assert_eq!(config.sink_timeout(), Duration::from_secs(2));
        assert!(config.sink_url.starts_with("https://"));
    }

    #[test]
    fn lookup_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            (ENV_MODEL_DIR, "/tmp/models"),
            (ENV_SINK_TIMEOUT_MS, "500"),
            (ENV_OUTPUT, "   "),
        ]
        .into_iter()
        .collect();
        let config = TriageConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.model_dir, PathBuf::from("/tmp/models"));
        assert_eq!(config.sink_timeout_ms, 500);
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(
            config.training_report_path(),
            PathBuf::from("/tmp/models/training_report.json")
        );
    }

    #[test]
    fn bad_timeout_falls_back() {
        let config = TriageConfig::from_lookup(|k| {
            (k == ENV_SINK_TIMEOUT_MS).then(|| "soon".to_string())
        });
        assert_eq!(config.sink_timeout_ms, DEFAULT_SINK_TIMEOUT_MS);
    }
}
