//! Reconciliation settings loaded from JSON

use crate::analyzer::AnalyzeOptions;
use crate::comparator::{ChunkStrategy, CompareOptions};
use crate::error::{ReconError, Result};
use crate::{
    DEFAULT_CHUNK_SIZE, DEFAULT_KEY_BATCH_SIZE, DEFAULT_MAX_SOURCE_ONLY, DEFAULT_MAX_TARGET_ONLY,
    DEFAULT_MAX_VALUE_MISMATCHES, DEFAULT_THRESHOLD_FRACTION,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file contents. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub chunk_size: usize,
    pub key_batch_size: usize,
    pub chunk_strategy: ChunkStrategy,
    pub parallel: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chunk_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_key_fanout: Option<usize>,
    pub max_value_mismatches: usize,
    pub max_source_only: usize,
    pub max_target_only: usize,
    pub threshold_fraction: f64,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            key_batch_size: DEFAULT_KEY_BATCH_SIZE,
            chunk_strategy: ChunkStrategy::default(),
            parallel: false,
            max_chunk_rows: None,
            max_key_fanout: None,
            max_value_mismatches: DEFAULT_MAX_VALUE_MISMATCHES,
            max_source_only: DEFAULT_MAX_SOURCE_ONLY,
            max_target_only: DEFAULT_MAX_TARGET_ONLY,
            threshold_fraction: DEFAULT_THRESHOLD_FRACTION,
        }
    }
}

impl ReconConfig {
    /// Read and validate a JSON settings file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: ReconConfig = serde_json::from_str(&text)
            .map_err(|e| ReconError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ReconError::config("chunk_size must be greater than 0"));
        }
        if self.key_batch_size == 0 {
            return Err(ReconError::config("key_batch_size must be greater than 0"));
        }
        if matches!(self.max_chunk_rows, Some(0)) || matches!(self.max_key_fanout, Some(0)) {
            return Err(ReconError::config("resource ceilings must be greater than 0"));
        }
        if !self.threshold_fraction.is_finite() || self.threshold_fraction < 0.0 {
            return Err(ReconError::config(format!(
                "threshold_fraction must be a non-negative number, got {}",
                self.threshold_fraction
            )));
        }
        Ok(())
    }

    pub fn compare_options(&self, key_columns: &[String]) -> CompareOptions {
        CompareOptions {
            key_columns: key_columns.to_vec(),
            chunk_size: self.chunk_size,
            key_batch_size: self.key_batch_size,
            strategy: self.chunk_strategy,
            parallel: self.parallel,
            max_chunk_rows: self.max_chunk_rows,
            max_key_fanout: self.max_key_fanout,
        }
    }

    pub fn analyze_options(&self, key_columns: &[String]) -> AnalyzeOptions {
        AnalyzeOptions {
            key_columns: key_columns.to_vec(),
            max_value_mismatches: self.max_value_mismatches,
            max_source_only: self.max_source_only,
            max_target_only: self.max_target_only,
        }
    }
}
