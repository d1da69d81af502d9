//! Column set reconciliation between source and target

use crate::error::{ReconError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One column present on both sides, matched by lowercase name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub key: String,
    pub source: String,
    pub target: String,
}

/// Case-insensitive intersection, ordered by lowercase name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedColumns {
    pairs: Vec<ColumnPair>,
}

impl SharedColumns {
    pub fn pairs(&self) -> &[ColumnPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn source_names(&self) -> Vec<String> {
        self.pairs.iter().map(|p| p.source.clone()).collect()
    }

    pub fn target_names(&self) -> Vec<String> {
        self.pairs.iter().map(|p| p.target.clone()).collect()
    }

    /// Pair whose source-side name is `name`
    pub fn by_source(&self, name: &str) -> Option<&ColumnPair> {
        self.pairs.iter().find(|p| p.source == name)
    }

    /// Split into (key pairs in key order, remaining pairs in shared order)
    pub fn split_keys(&self, source_keys: &[String]) -> (Vec<ColumnPair>, Vec<ColumnPair>) {
        let keys: Vec<ColumnPair> = source_keys
            .iter()
            .filter_map(|k| self.by_source(k).cloned())
            .collect();
        let rest = self
            .pairs
            .iter()
            .filter(|p| !source_keys.contains(&p.source))
            .cloned()
            .collect();
        (keys, rest)
    }
}

/// Columns shared by both sides, matched case-insensitively
pub fn shared_columns(source_cols: &[String], target_cols: &[String]) -> Result<SharedColumns> {
    let mut src_map: BTreeMap<String, &String> = BTreeMap::new();
    for col in source_cols {
        src_map.entry(col.to_lowercase()).or_insert(col);
    }
    let mut tgt_map: BTreeMap<String, &String> = BTreeMap::new();
    for col in target_cols {
        tgt_map.entry(col.to_lowercase()).or_insert(col);
    }

    let pairs: Vec<ColumnPair> = src_map
        .iter()
        .filter_map(|(key, src)| {
            tgt_map.get(key).map(|tgt| ColumnPair {
                key: key.clone(),
                source: (*src).clone(),
                target: (*tgt).clone(),
            })
        })
        .collect();

    if pairs.is_empty() {
        log::error!(
            "No columns in common. Source columns: {:?}, target columns: {:?}",
            source_cols,
            target_cols
        );
        return Err(ReconError::NoCommonColumns {
            source_columns: source_cols.to_vec(),
            target_columns: target_cols.to_vec(),
        });
    }

    Ok(SharedColumns { pairs })
}

/// Result of comparing two column lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureComparison {
    /// True when both sides have the same number of columns. This is a
    /// count check, not set equality.
    pub columns_match: bool,
    pub source_only: BTreeSet<String>,
    pub target_only: BTreeSet<String>,
}

/// Compare the column structure of two datasets.
///
/// `source_only` / `target_only` are exact-name differences. Fails with
/// `NoCommonColumns` when the sides share no column even case-insensitively.
pub fn compare_structure(source_cols: &[String], target_cols: &[String]) -> Result<StructureComparison> {
    shared_columns(source_cols, target_cols)?;

    let src: BTreeSet<String> = source_cols.iter().cloned().collect();
    let tgt: BTreeSet<String> = target_cols.iter().cloned().collect();

    Ok(StructureComparison {
        columns_match: source_cols.len() == target_cols.len(),
        source_only: src.difference(&tgt).cloned().collect(),
        target_only: tgt.difference(&src).cloned().collect(),
    })
}
