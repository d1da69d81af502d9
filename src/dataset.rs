//! In-memory tabular data handed to the engine

use crate::error::{DataError, Result};
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One record: column name to value, in insertion order
pub type Row = IndexMap<String, Value>;

static NULL: Value = Value::Null;

/// Look up a column, treating a missing column as null
pub fn cell<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&NULL)
}

/// Like [`cell`], falling back to a case-insensitive name match
pub fn cell_ignore_case<'a>(row: &'a Row, column: &str) -> &'a Value {
    if let Some(value) = row.get(column) {
        return value;
    }
    let lower = column.to_lowercase();
    row.iter()
        .find(|(name, _)| name.to_lowercase() == lower)
        .map(|(_, value)| value)
        .unwrap_or(&NULL)
}

/// An ordered sequence of rows. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub rows: Vec<Row>,
    /// Columns known up front, e.g. a file header; kept when there are no rows
    #[serde(skip)]
    declared_columns: Vec<String>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            declared_columns: Vec::new(),
        }
    }

    /// Rows with a column list that holds even when `rows` is empty
    pub fn with_columns<S: Into<String>>(columns: impl IntoIterator<Item = S>, rows: Vec<Row>) -> Self {
        Self {
            rows,
            declared_columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Declared columns, then any further names found in rows, in first-seen order
    pub fn columns(&self) -> Vec<String> {
        let mut seen: IndexSet<&str> = self.declared_columns.iter().map(String::as_str).collect();
        for row in &self.rows {
            for name in row.keys() {
                seen.insert(name.as_str());
            }
        }
        seen.into_iter().map(str::to_string).collect()
    }

    /// Reject column sets where two names differ only by case
    pub fn check_unambiguous_columns(&self, side: &str) -> Result<()> {
        let mut by_lower: HashMap<String, String> = HashMap::new();
        for name in self.columns() {
            if let Some(first) = by_lower.insert(name.to_lowercase(), name.clone()) {
                return Err(DataError::AmbiguousColumn {
                    side: side.to_string(),
                    first,
                    second: name,
                }
                .into());
            }
        }
        Ok(())
    }
}

impl FromIterator<Row> for Dataset {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::from_rows(iter.into_iter().collect())
    }
}

/// Build a row from `(column, value)` pairs
pub fn row<K, V, I>(pairs: I) -> Row
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
