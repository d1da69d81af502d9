//! Categorize, cap and summarize a raw diff set for presentation
//!
//! The analyzer trusts nothing upstream beyond the rows themselves: keys are
//! re-derived from row values, tags are checked against the row's side, and
//! counts are recomputed before the caps are applied.

use crate::dataset::{cell_ignore_case, Row};
use crate::diff::{
    CategoryCounts, ComparisonResult, ComparisonSummary, DiffRow, MismatchDetail, MismatchDetails,
    MismatchType, Side,
};
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::normalize::{normalize, resolve_key_columns, CompositeKey};
use crate::pairing::pair_fingerprints;
use crate::{DEFAULT_MAX_SOURCE_ONLY, DEFAULT_MAX_TARGET_ONLY, DEFAULT_MAX_VALUE_MISMATCHES};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Caps and key selection for an analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Requested key columns; empty means every column
    pub key_columns: Vec<String>,
    /// Counted in keys, not rows
    pub max_value_mismatches: usize,
    pub max_source_only: usize,
    pub max_target_only: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            key_columns: Vec::new(),
            max_value_mismatches: DEFAULT_MAX_VALUE_MISMATCHES,
            max_source_only: DEFAULT_MAX_SOURCE_ONLY,
            max_target_only: DEFAULT_MAX_TARGET_ONLY,
        }
    }
}

impl AnalyzeOptions {
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_caps(mut self, value_mismatches: usize, source_only: usize, target_only: usize) -> Self {
        self.max_value_mismatches = value_mismatches;
        self.max_source_only = source_only;
        self.max_target_only = target_only;
        self
    }
}

/// Reconciled counts for an analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_source_rows: usize,
    pub total_target_rows: usize,
    pub rows_only_in_source: usize,
    pub rows_only_in_target: usize,
    pub value_mismatches: usize,
    pub total_differences: usize,
    pub result: ComparisonResult,
    /// ValueMismatch rows kept after capping
    pub value_mismatches_in_output: usize,
    pub source_only_in_output: usize,
    pub target_only_in_output: usize,
    pub records_in_input: usize,
    pub records_in_output: usize,
}

impl AnalysisSummary {
    /// Metric rows in display order
    pub fn metrics(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Source Rows", self.total_source_rows.to_string()),
            ("Total Target Rows", self.total_target_rows.to_string()),
            ("Rows Only in Source", self.rows_only_in_source.to_string()),
            ("Rows Only in Target", self.rows_only_in_target.to_string()),
            ("Value Mismatches", self.value_mismatches.to_string()),
            ("Total Differences", self.total_differences.to_string()),
            ("Comparison Result", self.result.to_string()),
            ("Value Mismatches in Output", self.value_mismatches_in_output.to_string()),
            ("Source-only in Output", self.source_only_in_output.to_string()),
            ("Target-only in Output", self.target_only_in_output.to_string()),
            ("Records in Input", self.records_in_input.to_string()),
            ("Records in Output", self.records_in_output.to_string()),
        ]
    }

    pub fn has_differences(&self) -> bool {
        self.result == ComparisonResult::DifferencesFound
    }
}

/// Categorized, capped diff rows
#[derive(Debug, Clone)]
pub struct Analysis {
    pub value_mismatches: Vec<DiffRow>,
    pub source_only: Vec<DiffRow>,
    pub target_only: Vec<DiffRow>,
    pub mismatch_details: MismatchDetails,
    pub key_columns: Vec<String>,
    pub summary: AnalysisSummary,
    /// Rows whose tag was missing or contradicted their side
    pub recategorized: usize,
}

impl Analysis {
    /// Output rows: value mismatches, then source-only, then target-only
    pub fn rows(&self) -> impl Iterator<Item = &DiffRow> {
        self.value_mismatches
            .iter()
            .chain(self.source_only.iter())
            .chain(self.target_only.iter())
    }

    pub fn len(&self) -> usize {
        self.value_mismatches.len() + self.source_only.len() + self.target_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A diff row with its re-derived key and final tag
struct Keyed<'a> {
    key: CompositeKey,
    tag: MismatchType,
    row: &'a DiffRow,
}

/// Categorize and cap a diff set.
///
/// When `upstream` is given, its counts are used wherever the freshly
/// observed count is zero.
pub fn analyze(
    diff_rows: &[DiffRow],
    options: &AnalyzeOptions,
    upstream: Option<&ComparisonSummary>,
) -> Result<Analysis> {
    log::info!("Analyzing {} diff rows", diff_rows.len());

    let key_columns = if diff_rows.is_empty() {
        Vec::new()
    } else {
        let available = diff_columns(diff_rows);
        if options.key_columns.is_empty() {
            available
        } else {
            resolve_key_columns(&available, &options.key_columns)?
        }
    };

    let keys: Vec<CompositeKey> = diff_rows.iter().map(|r| row_key(&r.values, &key_columns)).collect();
    let mut keys_by_side: [HashSet<&CompositeKey>; 2] = [HashSet::new(), HashSet::new()];
    for (row, key) in diff_rows.iter().zip(&keys) {
        keys_by_side[side_slot(row.side)].insert(key);
    }

    let mut recategorized = 0;
    let keyed: Vec<Keyed<'_>> = diff_rows
        .iter()
        .zip(&keys)
        .map(|(row, key)| {
            let tag = match row.mismatch_type {
                Some(tag) if tag.is_consistent_with(row.side) => tag,
                _ => {
                    recategorized += 1;
                    if keys_by_side[side_slot(row.side.opposite())].contains(key) {
                        MismatchType::ValueMismatch
                    } else {
                        MismatchType::only_in(row.side)
                    }
                }
            };
            Keyed {
                key: key.clone(),
                tag,
                row,
            }
        })
        .collect();
    if recategorized > 0 {
        log::warn!(
            "{} diff rows had a missing or inconsistent mismatch type and were re-categorized",
            recategorized
        );
    }

    let mut value_rows: Vec<&Keyed<'_>> = keyed.iter().filter(|k| k.tag == MismatchType::ValueMismatch).collect();
    let mut source_rows: Vec<&Keyed<'_>> = keyed.iter().filter(|k| k.tag == MismatchType::SourceOnly).collect();
    let mut target_rows: Vec<&Keyed<'_>> = keyed.iter().filter(|k| k.tag == MismatchType::TargetOnly).collect();

    let fresh = CategoryCounts {
        source_only: source_rows.len(),
        target_only: target_rows.len(),
        value_mismatch_rows: value_rows.len(),
    };

    // Stable: equal keys keep row order
    value_rows.sort_by(|a, b| (&a.key, a.row.side, a.row.row_index).cmp(&(&b.key, b.row.side, b.row.row_index)));
    source_rows.sort_by(|a, b| (&a.key, a.row.row_index).cmp(&(&b.key, b.row.row_index)));
    target_rows.sort_by(|a, b| (&a.key, a.row.row_index).cmp(&(&b.key, b.row.row_index)));

    let kept_keys: BTreeSet<&CompositeKey> = value_rows
        .iter()
        .map(|k| &k.key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(options.max_value_mismatches)
        .collect();
    let value_rows: Vec<&Keyed<'_>> = value_rows.into_iter().filter(|k| kept_keys.contains(&k.key)).collect();
    source_rows.truncate(options.max_source_only);
    target_rows.truncate(options.max_target_only);

    let value_columns: Vec<String> = diff_columns(diff_rows)
        .into_iter()
        .filter(|c| !key_columns.iter().any(|k| k.to_lowercase() == c.to_lowercase()))
        .collect();
    let mismatch_details = attribute_columns(&value_rows, &value_columns);

    let retag = |rows: Vec<&Keyed<'_>>| -> Vec<DiffRow> {
        rows.into_iter()
            .map(|k| DiffRow {
                mismatch_type: Some(k.tag),
                ..k.row.clone()
            })
            .collect()
    };
    let value_mismatches = retag(value_rows);
    let source_only = retag(source_rows);
    let target_only = retag(target_rows);

    let summary = reconcile_summary(
        diff_rows,
        fresh,
        upstream,
        [value_mismatches.len(), source_only.len(), target_only.len()],
    );
    log::info!(
        "Analysis complete. {} records in final output ({})",
        summary.records_in_output,
        summary.result
    );

    Ok(Analysis {
        value_mismatches,
        source_only,
        target_only,
        mismatch_details,
        key_columns,
        summary,
        recategorized,
    })
}

fn side_slot(side: Side) -> usize {
    match side {
        Side::Source => 0,
        Side::Target => 1,
    }
}

/// Column names across diff rows, first-seen, one per lowercase name
fn diff_columns(rows: &[DiffRow]) -> Vec<String> {
    let mut seen: IndexMap<String, String> = IndexMap::new();
    for row in rows {
        for name in row.values.keys() {
            seen.entry(name.to_lowercase()).or_insert_with(|| name.clone());
        }
    }
    seen.into_values().collect()
}

/// Composite key of a row, looking columns up case-insensitively
pub fn row_key(row: &Row, key_columns: &[String]) -> CompositeKey {
    CompositeKey(
        key_columns
            .iter()
            .map(|col| normalize(cell_ignore_case(row, col)))
            .collect(),
    )
}

/// Pair each kept key's source and target rows and record the columns
/// whose values do not match
fn attribute_columns(rows: &[&Keyed<'_>], value_columns: &[String]) -> MismatchDetails {
    let mut by_key: BTreeMap<&CompositeKey, (Vec<&Row>, Vec<&Row>)> = BTreeMap::new();
    for k in rows {
        let entry = by_key.entry(&k.key).or_default();
        match k.row.side {
            Side::Source => entry.0.push(&k.row.values),
            Side::Target => entry.1.push(&k.row.values),
        }
    }

    let fingerprint = |row: &Row| {
        Fingerprint(
            value_columns
                .iter()
                .map(|c| normalize(cell_ignore_case(row, c)))
                .collect(),
        )
    };

    let mut details = MismatchDetails::new();
    for (key, (src, tgt)) in by_key {
        let src_fps: Vec<Fingerprint> = src.iter().map(|&r| fingerprint(r)).collect();
        let tgt_fps: Vec<Fingerprint> = tgt.iter().map(|&r| fingerprint(r)).collect();
        let pairing = pair_fingerprints(&src_fps, &tgt_fps);

        let mut columns = BTreeSet::new();
        for (i, j) in pairing.pairs {
            for col in value_columns {
                if !cell_ignore_case(src[i], col).matches(cell_ignore_case(tgt[j], col)) {
                    columns.insert(col.clone());
                }
            }
        }
        details.insert(
            key.clone(),
            MismatchDetail {
                columns,
                ambiguous: src.len() > 1 || tgt.len() > 1,
            },
        );
    }
    details
}

fn reconcile_summary(
    diff_rows: &[DiffRow],
    fresh: CategoryCounts,
    upstream: Option<&ComparisonSummary>,
    in_output: [usize; 3],
) -> AnalysisSummary {
    let prefer = |fresh: usize, upstream: Option<usize>| {
        if fresh > 0 {
            fresh
        } else {
            upstream.unwrap_or(0)
        }
    };

    let side_count = |side: Side| diff_rows.iter().filter(|r| r.side == side).count();
    let total_source_rows = upstream.map_or_else(|| side_count(Side::Source), |u| u.total_source_rows);
    let total_target_rows = upstream.map_or_else(|| side_count(Side::Target), |u| u.total_target_rows);

    let rows_only_in_source = prefer(fresh.source_only, upstream.map(|u| u.rows_only_in_source));
    let rows_only_in_target = prefer(fresh.target_only, upstream.map(|u| u.rows_only_in_target));
    let value_mismatches = prefer(fresh.value_mismatch_rows / 2, upstream.map(|u| u.value_mismatches));
    let total_differences = rows_only_in_source + rows_only_in_target + value_mismatches;

    let [value_out, source_out, target_out] = in_output;
    AnalysisSummary {
        total_source_rows,
        total_target_rows,
        rows_only_in_source,
        rows_only_in_target,
        value_mismatches,
        total_differences,
        result: ComparisonResult::from_total(total_differences),
        value_mismatches_in_output: value_out,
        source_only_in_output: source_out,
        target_only_in_output: target_out,
        records_in_input: diff_rows.len(),
        records_in_output: value_out + source_out + target_out,
    }
}
