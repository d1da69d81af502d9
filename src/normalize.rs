//! Key normalization and key-column resolution

use crate::dataset::{cell, Row};
use crate::error::{ReconError, Result};
use crate::value::{Value, NULL_SENTINEL};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonicalize a value into a comparison key. Total: never fails.
pub fn normalize(value: &Value) -> String {
    if value.is_null() {
        return NULL_SENTINEL.to_string();
    }
    normalize_str(&value.canonical())
}

/// Lowercase and drop every whitespace and underscore character
pub fn normalize_str(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect()
}

/// Ordered tuple of normalized key values
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeKey(pub Vec<String>);

impl CompositeKey {
    pub fn from_row(row: &Row, key_columns: &[String]) -> Self {
        Self(
            key_columns
                .iter()
                .map(|col| normalize(cell(row, col)))
                .collect(),
        )
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.0.join(", "))?;
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// Map requested key names onto actual column names.
///
/// Each name is tried as an exact match, then case-insensitively, then with
/// underscores and whitespace removed on both sides. Names that match
/// nothing are dropped with a warning; an empty result is an error.
pub fn resolve_key_columns(available: &[String], requested: &[String]) -> Result<Vec<String>> {
    let mut resolved: IndexSet<String> = IndexSet::new();

    for name in requested {
        let found = available
            .iter()
            .find(|col| *col == name)
            .or_else(|| {
                let lower = name.to_lowercase();
                available.iter().find(|col| col.to_lowercase() == lower)
            })
            .or_else(|| {
                let compact = normalize_str(name);
                available.iter().find(|col| normalize_str(col) == compact)
            });

        match found {
            Some(col) => {
                resolved.insert(col.clone());
            }
            None => log::warn!("Could not find column matching '{}'; dropping it from the key", name),
        }
    }

    if resolved.is_empty() {
        return Err(ReconError::KeyColumnsNotFound {
            requested: requested.to_vec(),
        });
    }

    Ok(resolved.into_iter().collect())
}
