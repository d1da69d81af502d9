//! Diff rows, mismatch details and comparison summaries

use crate::dataset::Row;
use crate::normalize::CompositeKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which dataset a diff row was copied from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Source => Side::Target,
            Side::Target => Side::Source,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a diff row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MismatchType {
    SourceOnly,
    TargetOnly,
    ValueMismatch,
}

impl MismatchType {
    /// The one-sided category for rows from `side`
    pub fn only_in(side: Side) -> Self {
        match side {
            Side::Source => MismatchType::SourceOnly,
            Side::Target => MismatchType::TargetOnly,
        }
    }

    /// Whether a row from `side` may carry this tag
    pub fn is_consistent_with(self, side: Side) -> bool {
        match self {
            MismatchType::ValueMismatch => true,
            MismatchType::SourceOnly => side == Side::Source,
            MismatchType::TargetOnly => side == Side::Target,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MismatchType::SourceOnly => "Source Only",
            MismatchType::TargetOnly => "Target Only",
            MismatchType::ValueMismatch => "Value Mismatch",
        }
    }
}

impl fmt::Display for MismatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row copied out of one dataset and tagged with how it differs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRow {
    pub side: Side,
    pub mismatch_type: Option<MismatchType>,
    /// Position of the row in its originating dataset
    pub row_index: usize,
    pub values: Row,
}

impl DiffRow {
    pub fn new(side: Side, mismatch_type: MismatchType, row_index: usize, values: Row) -> Self {
        Self {
            side,
            mismatch_type: Some(mismatch_type),
            row_index,
            values,
        }
    }

    pub fn is(&self, mismatch_type: MismatchType) -> bool {
        self.mismatch_type == Some(mismatch_type)
    }
}

/// Columns found to differ under one composite key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchDetail {
    pub columns: BTreeSet<String>,
    /// Set when either side carried more than one distinct value set for the
    /// key, so the columns depend on how rows were paired
    pub ambiguous: bool,
}

impl MismatchDetail {
    pub fn merge(&mut self, other: MismatchDetail) {
        self.columns.extend(other.columns);
        self.ambiguous |= other.ambiguous;
    }
}

pub type MismatchDetails = BTreeMap<CompositeKey, MismatchDetail>;

/// Overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonResult {
    Identical,
    DifferencesFound,
}

impl ComparisonResult {
    pub fn from_total(total_differences: usize) -> Self {
        if total_differences == 0 {
            ComparisonResult::Identical
        } else {
            ComparisonResult::DifferencesFound
        }
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonResult::Identical => f.write_str("Identical"),
            ComparisonResult::DifferencesFound => f.write_str("Differences found"),
        }
    }
}

/// Counts for one comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub total_source_rows: usize,
    pub total_target_rows: usize,
    pub rows_only_in_source: usize,
    pub rows_only_in_target: usize,
    pub value_mismatches: usize,
    pub total_differences: usize,
    pub result: ComparisonResult,
}

impl ComparisonSummary {
    pub fn new(
        total_source_rows: usize,
        total_target_rows: usize,
        rows_only_in_source: usize,
        rows_only_in_target: usize,
        value_mismatches: usize,
    ) -> Self {
        let total_differences = rows_only_in_source + rows_only_in_target + value_mismatches;
        Self {
            total_source_rows,
            total_target_rows,
            rows_only_in_source,
            rows_only_in_target,
            value_mismatches,
            total_differences,
            result: ComparisonResult::from_total(total_differences),
        }
    }

    /// Tally a diff set. Value mismatches count pairs, not rows.
    pub fn from_diff_rows(total_source_rows: usize, total_target_rows: usize, rows: &[DiffRow]) -> Self {
        let counts = CategoryCounts::tally(rows);
        Self::new(
            total_source_rows,
            total_target_rows,
            counts.source_only,
            counts.target_only,
            counts.value_mismatch_rows / 2,
        )
    }

    pub fn has_differences(&self) -> bool {
        self.result == ComparisonResult::DifferencesFound
    }

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
        ]
    }
}

/// Row counts per tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub source_only: usize,
    pub target_only: usize,
    pub value_mismatch_rows: usize,
}

impl CategoryCounts {
    pub fn tally(rows: &[DiffRow]) -> Self {
        let mut counts = Self::default();
        for row in rows {
            match row.mismatch_type {
                Some(MismatchType::SourceOnly) => counts.source_only += 1,
                Some(MismatchType::TargetOnly) => counts.target_only += 1,
                Some(MismatchType::ValueMismatch) => counts.value_mismatch_rows += 1,
                None => {}
            }
        }
        counts
    }
}
