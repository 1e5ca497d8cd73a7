use std::path::PathBuf;

use serde::Deserialize;

use crate::engine::EngineError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Capacity of the path queue between the walker and the dispatcher.
    pub queue_capacity: usize,
    /// Upper bound accepted for the worker count passed to `start`.
    pub max_workers: usize,
    /// Results at or above this score are forwarded to the front end.
    pub similarity_threshold: f64,
    /// File name suffixes that make a non-empty file eligible.
    pub extensions: Vec<String>,
    /// Append-only comparison log.
    pub log_path: PathBuf,
    /// Largest LCS table a single comparison may allocate, in cells of five
    /// bytes. Pairs above it are logged as errors instead of compared.
    pub max_table_cells: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 50,
            max_workers: 10,
            similarity_threshold: 0.50,
            extensions: vec![
                ".txt".to_string(),
                ".md".to_string(),
                ".java".to_string(),
                ".cs".to_string(),
                ".csv".to_string(),
            ],
            log_path: PathBuf::from("FileSimilarities.csv"),
            // About 500 MB, enough for two 10 KiB files.
            max_table_cells: 100_000_000,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.queue_capacity == 0 {
            return Err(EngineError::InvalidSettings(
                "queue capacity must be positive".into(),
            ));
        }
        if self.max_workers == 0 {
            return Err(EngineError::InvalidSettings(
                "max workers must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(EngineError::InvalidSettings(format!(
                "similarity threshold {} outside [0, 1]",
                self.similarity_threshold
            )));
        }
        if self.max_table_cells == 0 {
            return Err(EngineError::InvalidSettings(
                "max table cells must be positive".into(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(EngineError::InvalidSettings(
                "at least one file extension is required".into(),
            ));
        }
        Ok(())
    }

    /// Eligibility is decided on the full path text, matching the suffix case-sensitively.
    pub(crate) fn is_eligible(&self, path_text: &str, len: u64) -> bool {
        len > 0 && self.extensions.iter().any(|ext| path_text.ends_with(ext.as_str()))
    }
}
