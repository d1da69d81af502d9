//! # tabrecon
//!
//! Reconciles two versions of a tabular dataset and reports row-level and
//! cell-level differences under bounded memory.
//!
//! ```no_run
//! use tabrecon::{analyze, compare, AnalyzeOptions, CompareOptions, Dataset};
//!
//! # fn run(source: Dataset, target: Dataset) -> tabrecon::Result<()> {
//! let comparison = compare(&source, &target, &CompareOptions::default().with_keys(["id"]))?;
//! let analysis = analyze(
//!     &comparison.diff_rows,
//!     &AnalyzeOptions::default().with_keys(comparison.key_columns.clone()),
//!     Some(&comparison.summary),
//! )?;
//! println!("{}", analysis.summary.result);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod columns;
pub mod commands;
pub mod comparator;
pub mod config;
pub mod data;
pub mod dataset;
pub mod diff;
pub mod duplicates;
pub mod error;
pub mod fingerprint;
pub mod matcher;
pub mod normalize;
pub mod output;
pub mod pairing;
pub mod progress;
pub mod report;
pub mod threshold;
pub mod value;

pub use analyzer::{analyze, Analysis, AnalysisSummary, AnalyzeOptions};
pub use columns::{compare_structure, shared_columns, StructureComparison};
pub use comparator::{compare, compare_with_progress, ChunkStrategy, CompareOptions, Comparison};
pub use config::ReconConfig;
pub use dataset::{Dataset, Row};
pub use diff::{ComparisonResult, ComparisonSummary, DiffRow, MismatchDetail, MismatchType, Side};
pub use duplicates::{find_duplicates, DuplicateReport};
pub use error::{ErrorKind, ReconError, Result};
pub use normalize::{normalize, resolve_key_columns, CompositeKey};
pub use threshold::{within_threshold, ThresholdCheck, ThresholdReason};
pub use value::Value;

/// Default rows per processing window
pub const DEFAULT_CHUNK_SIZE: usize = 500_000;

/// Default common keys matched per batch
pub const DEFAULT_KEY_BATCH_SIZE: usize = 50_000;

/// Default output caps
pub const DEFAULT_MAX_VALUE_MISMATCHES: usize = 1000;
pub const DEFAULT_MAX_SOURCE_ONLY: usize = 250;
pub const DEFAULT_MAX_TARGET_ONLY: usize = 250;

/// Default allowed row-count difference, as a fraction of the target count
pub const DEFAULT_THRESHOLD_FRACTION: f64 = 0.05;
