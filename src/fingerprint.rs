//! Row fingerprints and whole-row hashing

use crate::dataset::{cell, Row};
use crate::normalize::normalize;
use blake3::Hasher;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A row digest: BLAKE3 over the length-prefixed normalized values
pub type RowDigest = blake3::Hash;

/// Ordered normalized values over a fixed column subset
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub Vec<String>);

impl Fingerprint {
    pub fn digest(&self) -> RowDigest {
        digest_parts(&self.0)
    }

    /// Positions where the two fingerprints disagree
    pub fn differing_positions(&self, other: &Fingerprint) -> Vec<usize> {
        self.0
            .iter()
            .zip(other.0.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of differing positions
    pub fn distance(&self, other: &Fingerprint) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .filter(|(a, b)| a != b)
            .count()
    }
}

/// Hash a sequence of normalized values
pub fn digest_parts(parts: &[String]) -> RowDigest {
    let mut hasher = Hasher::new();
    for part in parts {
        // Length prefix keeps ("ab", "c") apart from ("a", "bc")
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hasher.finalize()
}

/// Stable bucket for a digest, used for key-partitioned windows
pub fn bucket_of(digest: &RowDigest, buckets: usize) -> usize {
    if buckets <= 1 {
        return 0;
    }
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    (u64::from_le_bytes(head) % buckets as u64) as usize
}

/// Row hash with its position in the originating dataset
#[derive(Debug, Clone)]
pub struct RowHash {
    pub row_index: usize,
    pub digest: RowDigest,
}

/// Computes fingerprints over a fixed, ordered column list
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    columns: Vec<String>,
}

impl Fingerprinter {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn fingerprint(&self, row: &Row) -> Fingerprint {
        Fingerprint(
            self.columns
                .iter()
                .map(|col| normalize(cell(row, col)))
                .collect(),
        )
    }

    pub fn digest(&self, row: &Row) -> RowDigest {
        self.fingerprint(row).digest()
    }

    /// Hash the given rows in parallel, tagging each with its dataset index
    pub fn hash_rows(&self, rows: &[Row], indices: &[usize]) -> Vec<RowHash> {
        indices
            .par_iter()
            .map(|&idx| RowHash {
                row_index: idx,
                digest: self.digest(&rows[idx]),
            })
            .collect()
    }
}

/// Result of a whole-row hash comparison
#[derive(Debug, Clone)]
pub struct RowHashComparison {
    /// Source row indices whose digest never occurs in the target
    pub source_only: Vec<usize>,
    /// Target row indices whose digest never occurs in the source
    pub target_only: Vec<usize>,
    pub hash_quality: HashQualityMetrics,
}

impl RowHashComparison {
    pub fn has_changes(&self) -> bool {
        !self.source_only.is_empty() || !self.target_only.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.source_only.len() + self.target_only.len()
    }
}

/// Repeated-digest statistics for a hash comparison
#[derive(Debug, Clone, Default)]
pub struct HashQualityMetrics {
    pub total_source_hashes: u64,
    pub unique_source_hashes: u64,
    pub total_target_hashes: u64,
    pub unique_target_hashes: u64,
}

impl HashQualityMetrics {
    pub fn source_repeat_rate(&self) -> f64 {
        repeat_rate(self.total_source_hashes, self.unique_source_hashes)
    }

    pub fn target_repeat_rate(&self) -> f64 {
        repeat_rate(self.total_target_hashes, self.unique_target_hashes)
    }

    /// Repeated rows are invisible to set-based hash comparison
    pub fn has_significant_repeats(&self) -> bool {
        self.source_repeat_rate() > 0.01 || self.target_repeat_rate() > 0.01
    }
}

fn repeat_rate(total: u64, unique: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        total.saturating_sub(unique) as f64 / total as f64
    }
}

/// Symmetric difference of two digest sets, mapped back to row indices.
/// Output indices keep input order.
pub fn compare_row_hashes(source: &[RowHash], target: &[RowHash]) -> RowHashComparison {
    let source_set: HashSet<&RowDigest> = source.iter().map(|rh| &rh.digest).collect();
    let target_set: HashSet<&RowDigest> = target.iter().map(|rh| &rh.digest).collect();

    let hash_quality = HashQualityMetrics {
        total_source_hashes: source.len() as u64,
        unique_source_hashes: source_set.len() as u64,
        total_target_hashes: target.len() as u64,
        unique_target_hashes: target_set.len() as u64,
    };

    let source_only = source
        .iter()
        .filter(|rh| !target_set.contains(&rh.digest))
        .map(|rh| rh.row_index)
        .collect();
    let target_only = target
        .iter()
        .filter(|rh| !source_set.contains(&rh.digest))
        .map(|rh| rh.row_index)
        .collect();

    RowHashComparison {
        source_only,
        target_only,
        hash_quality,
    }
}

/// Group row indices by fingerprint, keeping first-seen order of fingerprints
pub fn group_by_fingerprint(
    fingerprinter: &Fingerprinter,
    rows: &[Row],
    indices: &[usize],
) -> Vec<(Fingerprint, Vec<usize>)> {
    let mut order: Vec<(Fingerprint, Vec<usize>)> = Vec::new();
    let mut position: HashMap<Fingerprint, usize> = HashMap::new();
    for &idx in indices {
        let fp = fingerprinter.fingerprint(&rows[idx]);
        match position.get(&fp) {
            Some(&pos) => order[pos].1.push(idx),
            None => {
                position.insert(fp.clone(), order.len());
                order.push((fp, vec![idx]));
            }
        }
    }
    order
}
