//! Duplicate detection within a single dataset

use crate::dataset::{Dataset, Row};
use crate::error::Result;
use crate::matcher::group_by_key;
use crate::normalize::{resolve_key_columns, CompositeKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A row sharing its key with at least one other row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRow {
    pub row_index: usize,
    pub duplicate_group: usize,
    pub values: Row,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub key_columns: Vec<String>,
    /// Every row of every duplicated key, in dataset order
    pub rows: Vec<DuplicateRow>,
    pub groups: usize,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Find rows whose normalized key occurs more than once.
///
/// Without key columns the whole row is the key. Group ids follow sorted
/// key order and start at 0.
pub fn find_duplicates(dataset: &Dataset, key_columns: Option<&[String]>) -> Result<DuplicateReport> {
    if dataset.is_empty() {
        return Ok(DuplicateReport::default());
    }

    let columns = dataset.columns();
    let key_columns = match key_columns {
        Some(requested) if !requested.is_empty() => resolve_key_columns(&columns, requested)?,
        _ => columns,
    };

    let indices: Vec<usize> = (0..dataset.len()).collect();
    let groups = group_by_key(&indices, |i| CompositeKey::from_row(&dataset.rows[i], &key_columns));

    let mut group_of: HashMap<usize, usize> = HashMap::new();
    let mut next_group = 0;
    for rows in groups.values().filter(|rows| rows.len() > 1) {
        for &idx in rows {
            group_of.insert(idx, next_group);
        }
        next_group += 1;
    }

    let rows: Vec<DuplicateRow> = indices
        .into_iter()
        .filter_map(|idx| {
            group_of.get(&idx).map(|&group| DuplicateRow {
                row_index: idx,
                duplicate_group: group,
                values: dataset.rows[idx].clone(),
            })
        })
        .collect();

    log::info!(
        "Found {} duplicate rows in {} groups over {:?}",
        rows.len(),
        next_group,
        key_columns
    );

    Ok(DuplicateReport {
        key_columns,
        rows,
        groups: next_group,
    })
}
