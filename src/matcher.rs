//! Key-based row matching with duplicate-key handling

use crate::columns::ColumnPair;
use crate::dataset::Row;
use crate::diff::{DiffRow, MismatchDetail, MismatchDetails, MismatchType, Side};
use crate::error::{ResourceError, Result};
use crate::fingerprint::{group_by_fingerprint, Fingerprint, Fingerprinter};
use crate::normalize::CompositeKey;
use crate::pairing::pair_fingerprints;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Diff rows and column attribution produced for one row subset
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub diff_rows: Vec<DiffRow>,
    pub mismatch_details: MismatchDetails,
}

impl MatchOutcome {
    pub fn extend(&mut self, other: MatchOutcome) {
        self.diff_rows.extend(other.diff_rows);
        for (key, detail) in other.mismatch_details {
            self.mismatch_details.entry(key).or_default().merge(detail);
        }
    }
}

/// Matches rows of two datasets by composite key
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    source_keys: Vec<String>,
    target_keys: Vec<String>,
    source_values: Fingerprinter,
    target_values: Fingerprinter,
    /// Source-side names of the value columns, by fingerprint position
    value_names: Vec<String>,
    key_batch_size: usize,
    max_key_fanout: Option<usize>,
}

impl KeyMatcher {
    /// `key_pairs` in key order; `value_pairs` are the remaining shared columns.
    pub fn new(key_pairs: &[ColumnPair], value_pairs: &[ColumnPair], key_batch_size: usize) -> Self {
        Self {
            source_keys: key_pairs.iter().map(|p| p.source.clone()).collect(),
            target_keys: key_pairs.iter().map(|p| p.target.clone()).collect(),
            source_values: Fingerprinter::new(value_pairs.iter().map(|p| p.source.clone()).collect()),
            target_values: Fingerprinter::new(value_pairs.iter().map(|p| p.target.clone()).collect()),
            value_names: value_pairs.iter().map(|p| p.source.clone()).collect(),
            key_batch_size: key_batch_size.max(1),
            max_key_fanout: None,
        }
    }

    pub fn with_max_key_fanout(mut self, limit: Option<usize>) -> Self {
        self.max_key_fanout = limit;
        self
    }

    pub fn source_key(&self, row: &Row) -> CompositeKey {
        CompositeKey::from_row(row, &self.source_keys)
    }

    pub fn target_key(&self, row: &Row) -> CompositeKey {
        CompositeKey::from_row(row, &self.target_keys)
    }

    /// Match the given row subsets. Indices refer to the full datasets.
    ///
    /// Key groups hold row indices for the whole window, so memory is bounded
    /// by the window size. `key_batch_size` only sets how often progress is
    /// logged; per-key memory is bounded by `max_key_fanout`.
    pub fn match_rows(
        &self,
        source: &[Row],
        source_indices: &[usize],
        target: &[Row],
        target_indices: &[usize],
    ) -> Result<MatchOutcome> {
        let source_groups = group_by_key(source_indices, |i| self.source_key(&source[i]));
        let target_groups = group_by_key(target_indices, |i| self.target_key(&target[i]));

        let mut outcome = MatchOutcome::default();

        for (key, rows) in &source_groups {
            if !target_groups.contains_key(key) {
                let idx = rows[0];
                outcome.diff_rows.push(DiffRow::new(
                    Side::Source,
                    MismatchType::SourceOnly,
                    idx,
                    source[idx].clone(),
                ));
            }
        }
        for (key, rows) in &target_groups {
            if !source_groups.contains_key(key) {
                let idx = rows[0];
                outcome.diff_rows.push(DiffRow::new(
                    Side::Target,
                    MismatchType::TargetOnly,
                    idx,
                    target[idx].clone(),
                ));
            }
        }

        let common: Vec<&CompositeKey> = source_groups
            .keys()
            .filter(|k| target_groups.contains_key(*k))
            .collect();
        let batches = common.len().div_ceil(self.key_batch_size);

        for (batch_index, batch) in common.chunks(self.key_batch_size).enumerate() {
            log::debug!(
                "Processing key batch {}/{} ({} keys)",
                batch_index + 1,
                batches,
                batch.len()
            );
            for key in batch {
                let src_rows = &source_groups[*key];
                let tgt_rows = &target_groups[*key];
                self.check_fanout(key, src_rows.len().max(tgt_rows.len()))?;
                self.match_key(key, source, src_rows, target, tgt_rows, &mut outcome);
            }
        }

        Ok(outcome)
    }

    fn check_fanout(&self, key: &CompositeKey, rows: usize) -> Result<()> {
        match self.max_key_fanout {
            Some(limit) if rows > limit => Err(ResourceError::KeyFanoutTooLarge {
                key: key.to_string(),
                rows,
                limit,
            }
            .into()),
            _ => Ok(()),
        }
    }

    fn match_key(
        &self,
        key: &CompositeKey,
        source: &[Row],
        src_rows: &[usize],
        target: &[Row],
        tgt_rows: &[usize],
        outcome: &mut MatchOutcome,
    ) {
        let src_groups = group_by_fingerprint(&self.source_values, source, src_rows);
        let tgt_groups = group_by_fingerprint(&self.target_values, target, tgt_rows);

        let src_set: HashSet<&Fingerprint> = src_groups.iter().map(|(fp, _)| fp).collect();
        let tgt_set: HashSet<&Fingerprint> = tgt_groups.iter().map(|(fp, _)| fp).collect();

        // First row of each fingerprint the other side lacks
        let src_unmatched: Vec<(&Fingerprint, usize)> = src_groups
            .iter()
            .filter(|(fp, _)| !tgt_set.contains(fp))
            .map(|(fp, rows)| (fp, rows[0]))
            .collect();
        let tgt_unmatched: Vec<(&Fingerprint, usize)> = tgt_groups
            .iter()
            .filter(|(fp, _)| !src_set.contains(fp))
            .map(|(fp, rows)| (fp, rows[0]))
            .collect();

        if src_unmatched.is_empty() && tgt_unmatched.is_empty() {
            return;
        }

        let src_fps: Vec<Fingerprint> = src_unmatched.iter().map(|(fp, _)| (*fp).clone()).collect();
        let tgt_fps: Vec<Fingerprint> = tgt_unmatched.iter().map(|(fp, _)| (*fp).clone()).collect();
        let pairing = pair_fingerprints(&src_fps, &tgt_fps);

        let mut columns = BTreeSet::new();
        for &(i, j) in &pairing.pairs {
            let (_, src_idx) = src_unmatched[i];
            let (_, tgt_idx) = tgt_unmatched[j];
            for pos in src_fps[i].differing_positions(&tgt_fps[j]) {
                columns.insert(self.value_names[pos].clone());
            }
            outcome.diff_rows.push(DiffRow::new(
                Side::Source,
                MismatchType::ValueMismatch,
                src_idx,
                source[src_idx].clone(),
            ));
            outcome.diff_rows.push(DiffRow::new(
                Side::Target,
                MismatchType::ValueMismatch,
                tgt_idx,
                target[tgt_idx].clone(),
            ));
        }

        for &i in &pairing.unpaired_source {
            let (_, idx) = src_unmatched[i];
            outcome.diff_rows.push(DiffRow::new(
                Side::Source,
                MismatchType::SourceOnly,
                idx,
                source[idx].clone(),
            ));
        }
        for &j in &pairing.unpaired_target {
            let (_, idx) = tgt_unmatched[j];
            outcome.diff_rows.push(DiffRow::new(
                Side::Target,
                MismatchType::TargetOnly,
                idx,
                target[idx].clone(),
            ));
        }

        if !pairing.pairs.is_empty() {
            outcome.mismatch_details.insert(
                key.clone(),
                MismatchDetail {
                    columns,
                    ambiguous: src_groups.len() > 1 || tgt_groups.len() > 1,
                },
            );
        }
    }
}

/// Group indices by key, keeping each group's indices in input order
pub fn group_by_key<F>(indices: &[usize], key_of: F) -> BTreeMap<CompositeKey, Vec<usize>>
where
    F: Fn(usize) -> CompositeKey,
{
    let mut groups: BTreeMap<CompositeKey, Vec<usize>> = BTreeMap::new();
    for &idx in indices {
        groups.entry(key_of(idx)).or_default().push(idx);
    }
    groups
}
