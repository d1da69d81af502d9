//! Command-line interface for tabrecon

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabrecon")]
#[command(about = "Reconcile two versions of a tabular dataset")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare two datasets row by row
    Compare {
        /// Source file (csv, tsv, json, jsonl)
        source: PathBuf,

        /// Target file (csv, tsv, json, jsonl)
        target: PathBuf,

        /// Key columns, comma separated; omit for whole-row hashing
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,

        /// Rows per processing window (must be > 0)
        #[arg(long, value_parser = validate_positive)]
        chunk_size: Option<usize>,

        /// Windowing strategy: "partitioned" or "positional"
        #[arg(long)]
        strategy: Option<String>,

        /// Process windows in parallel
        #[arg(long)]
        parallel: bool,

        /// JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Maximum value-mismatch keys in the output
        #[arg(long)]
        max_value_mismatches: Option<usize>,

        /// Maximum source-only rows in the output
        #[arg(long)]
        max_source_only: Option<usize>,

        /// Maximum target-only rows in the output
        #[arg(long)]
        max_target_only: Option<usize>,

        /// Write the report layout as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Compare the column sets of two datasets
    Structure {
        source: PathBuf,
        target: PathBuf,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// List rows that share a key
    Duplicates {
        /// Input file
        input: PathBuf,

        /// Key columns, comma separated; omit to compare whole rows
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Check whether two row counts are within tolerance
    Threshold {
        source_count: u64,
        target_count: u64,

        /// Allowed difference as a fraction of the target count [default: 0.05]
        #[arg(long)]
        fraction: Option<f64>,

        /// JSON settings file; `threshold_fraction` applies unless --fraction is given
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },
}

/// Parse output format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Validate that a size argument is greater than 0
fn validate_positive(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("Invalid size: '{}'. Must be a positive integer.", s))?;

    if value == 0 {
        return Err("Size must be greater than 0".to_string());
    }

    Ok(value)
}
