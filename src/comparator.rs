//! Chunked comparison driver and aggregation

use crate::columns::{shared_columns, SharedColumns};
use crate::dataset::Dataset;
use crate::diff::{ComparisonSummary, DiffRow, MismatchDetails, MismatchType, Side};
use crate::error::{ReconError, ResourceError, Result};
use crate::fingerprint::{bucket_of, compare_row_hashes, digest_parts, Fingerprinter};
use crate::matcher::{KeyMatcher, MatchOutcome};
use crate::normalize::resolve_key_columns;
use crate::{DEFAULT_CHUNK_SIZE, DEFAULT_KEY_BATCH_SIZE};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::str::FromStr;

/// How rows are assigned to processing windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Fixed position ranges; rows of one key may land in different windows
    Positional,
    /// Rows routed by a hash of their key, so every key sits in one window
    #[default]
    KeyPartitioned,
}

impl ChunkStrategy {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "positional" => Ok(Self::Positional),
            "partitioned" | "key_partitioned" | "key-partitioned" => Ok(Self::KeyPartitioned),
            _ => Err(ReconError::invalid_input(format!("Invalid chunk strategy: {}", s))),
        }
    }
}

impl FromStr for ChunkStrategy {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Options for a single comparison
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Requested key columns; empty selects hash mode
    pub key_columns: Vec<String>,
    pub chunk_size: usize,
    pub key_batch_size: usize,
    pub strategy: ChunkStrategy,
    pub parallel: bool,
    pub max_chunk_rows: Option<usize>,
    pub max_key_fanout: Option<usize>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            key_columns: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            key_batch_size: DEFAULT_KEY_BATCH_SIZE,
            strategy: ChunkStrategy::default(),
            parallel: false,
            max_chunk_rows: None,
            max_key_fanout: None,
        }
    }
}

impl CompareOptions {
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_strategy(mut self, strategy: ChunkStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ReconError::config("chunk_size must be greater than 0"));
        }
        if self.key_batch_size == 0 {
            return Err(ReconError::config("key_batch_size must be greater than 0"));
        }
        if self.max_chunk_rows == Some(0) {
            return Err(ReconError::config("max_chunk_rows must be greater than 0"));
        }
        if self.max_key_fanout == Some(0) {
            return Err(ReconError::config("max_key_fanout must be greater than 0"));
        }
        Ok(())
    }
}

/// Everything one comparison produces
#[derive(Debug, Clone)]
pub struct Comparison {
    pub diff_rows: Vec<DiffRow>,
    pub summary: ComparisonSummary,
    pub mismatch_details: MismatchDetails,
    /// Resolved source-side key columns; empty in hash mode
    pub key_columns: Vec<String>,
    pub shared_columns: SharedColumns,
    pub windows: usize,
}

impl Comparison {
    pub fn is_key_mode(&self) -> bool {
        !self.key_columns.is_empty()
    }
}

/// Progress hook: `(windows folded, total windows)`
pub type ProgressFn<'a> = &'a dyn Fn(u64, u64);

/// Compare two datasets
pub fn compare(source: &Dataset, target: &Dataset, options: &CompareOptions) -> Result<Comparison> {
    compare_with_progress(source, target, options, None)
}

/// Compare two datasets, reporting each folded window to `progress`
pub fn compare_with_progress(
    source: &Dataset,
    target: &Dataset,
    options: &CompareOptions,
    progress: Option<ProgressFn<'_>>,
) -> Result<Comparison> {
    options.validate()?;
    source.check_unambiguous_columns("source")?;
    target.check_unambiguous_columns("target")?;

    let shared = shared_columns(&source.columns(), &target.columns())?;

    let (mode, key_columns) = if options.key_columns.is_empty() {
        let mode = Mode::Hash {
            source: Fingerprinter::new(shared.source_names()),
            target: Fingerprinter::new(shared.target_names()),
        };
        (mode, Vec::new())
    } else {
        let keys = resolve_key_columns(&shared.source_names(), &options.key_columns)?;
        let (key_pairs, value_pairs) = shared.split_keys(&keys);
        let matcher = KeyMatcher::new(&key_pairs, &value_pairs, options.key_batch_size)
            .with_max_key_fanout(options.max_key_fanout);
        (Mode::Key(matcher), keys)
    };

    log::info!(
        "Comparing {} source rows against {} target rows ({} shared columns, {})",
        source.len(),
        target.len(),
        shared.len(),
        if key_columns.is_empty() {
            "hash mode".to_string()
        } else {
            format!("keys {:?}", key_columns)
        }
    );

    let windows = plan_windows(source, target, &mode, options);
    let total = windows.len() as u64;
    log::debug!("Planned {} windows ({:?})", total, options.strategy);

    let mut outcome = MatchOutcome::default();
    let mut fold = |done: u64, result: MatchOutcome| {
        outcome.extend(result);
        if let Some(report) = progress {
            report(done, total);
        }
    };

    if options.parallel {
        let results: Vec<Result<MatchOutcome>> = windows
            .par_iter()
            .map(|window| process_window(window, source, target, &mode, options))
            .collect();
        for (i, result) in results.into_iter().enumerate() {
            fold(i as u64 + 1, result?);
        }
    } else {
        for (i, window) in windows.iter().enumerate() {
            let result = process_window(window, source, target, &mode, options)?;
            fold(i as u64 + 1, result);
        }
    }

    let summary = ComparisonSummary::from_diff_rows(source.len(), target.len(), &outcome.diff_rows);
    log::info!(
        "Comparison finished: {} only in source, {} only in target, {} value mismatches ({})",
        summary.rows_only_in_source,
        summary.rows_only_in_target,
        summary.value_mismatches,
        summary.result
    );

    Ok(Comparison {
        diff_rows: outcome.diff_rows,
        summary,
        mismatch_details: outcome.mismatch_details,
        key_columns,
        shared_columns: shared,
        windows: windows.len(),
    })
}

enum Mode {
    Key(KeyMatcher),
    Hash {
        source: Fingerprinter,
        target: Fingerprinter,
    },
}

/// Rows of both sides assigned to one window
#[derive(Debug)]
struct Window {
    index: usize,
    /// Row range reported on failure
    rows: Range<usize>,
    source: Vec<usize>,
    target: Vec<usize>,
}

fn plan_windows(source: &Dataset, target: &Dataset, mode: &Mode, options: &CompareOptions) -> Vec<Window> {
    let longest = source.len().max(target.len());
    let count = longest.div_ceil(options.chunk_size);

    match options.strategy {
        ChunkStrategy::Positional => (0..count)
            .map(|index| {
                let start = index * options.chunk_size;
                let end = (start + options.chunk_size).min(longest);
                Window {
                    index,
                    rows: start..end,
                    source: (start.min(source.len())..end.min(source.len())).collect(),
                    target: (start.min(target.len())..end.min(target.len())).collect(),
                }
            })
            .collect(),
        ChunkStrategy::KeyPartitioned => {
            let mut windows: Vec<Window> = (0..count)
                .map(|index| Window {
                    index,
                    rows: 0..0,
                    source: Vec::new(),
                    target: Vec::new(),
                })
                .collect();
            for (idx, row) in source.rows.iter().enumerate() {
                let parts = match mode {
                    Mode::Key(matcher) => matcher.source_key(row).0,
                    Mode::Hash { source, .. } => source.fingerprint(row).0,
                };
                windows[bucket_of(&digest_parts(&parts), count)].source.push(idx);
            }
            for (idx, row) in target.rows.iter().enumerate() {
                let parts = match mode {
                    Mode::Key(matcher) => matcher.target_key(row).0,
                    Mode::Hash { target, .. } => target.fingerprint(row).0,
                };
                windows[bucket_of(&digest_parts(&parts), count)].target.push(idx);
            }
            for window in &mut windows {
                window.rows = 0..window.source.len() + window.target.len();
            }
            windows
        }
    }
}

fn process_window(
    window: &Window,
    source: &Dataset,
    target: &Dataset,
    mode: &Mode,
    options: &CompareOptions,
) -> Result<MatchOutcome> {
    log::debug!(
        "Window {}: {} source rows, {} target rows",
        window.index,
        window.source.len(),
        window.target.len()
    );
    compare_window(window, source, target, mode, options)
        .map_err(|e| ReconError::chunk_failed(window.index, window.rows.clone(), e))
}

fn compare_window(
    window: &Window,
    source: &Dataset,
    target: &Dataset,
    mode: &Mode,
    options: &CompareOptions,
) -> Result<MatchOutcome> {
    let rows = window.source.len() + window.target.len();
    if let Some(limit) = options.max_chunk_rows {
        if rows > limit {
            return Err(ResourceError::ChunkTooLarge { rows, limit }.into());
        }
    }

    match mode {
        Mode::Key(matcher) => matcher.match_rows(&source.rows, &window.source, &target.rows, &window.target),
        Mode::Hash {
            source: src_fp,
            target: tgt_fp,
        } => {
            let src_hashes = src_fp.hash_rows(&source.rows, &window.source);
            let tgt_hashes = tgt_fp.hash_rows(&target.rows, &window.target);
            let comparison = compare_row_hashes(&src_hashes, &tgt_hashes);

            if comparison.hash_quality.has_significant_repeats() {
                log::debug!(
                    "Window {} has repeated rows (source {:.1}%, target {:.1}%); repeats are not counted",
                    window.index,
                    comparison.hash_quality.source_repeat_rate() * 100.0,
                    comparison.hash_quality.target_repeat_rate() * 100.0
                );
            }

            let mut diff_rows = Vec::with_capacity(comparison.total_changes());
            for idx in comparison.source_only {
                diff_rows.push(DiffRow::new(
                    Side::Source,
                    MismatchType::SourceOnly,
                    idx,
                    source.rows[idx].clone(),
                ));
            }
            for idx in comparison.target_only {
                diff_rows.push(DiffRow::new(
                    Side::Target,
                    MismatchType::TargetOnly,
                    idx,
                    target.rows[idx].clone(),
                ));
            }
            Ok(MatchOutcome {
                diff_rows,
                mismatch_details: MismatchDetails::new(),
            })
        }
    }
}
