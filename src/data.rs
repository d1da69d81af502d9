//! File loading for the command line: CSV, TSV, JSON and JSON Lines

use crate::dataset::{Dataset, Row};
use crate::error::{ReconError, Result};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Tsv,
    Json,
    JsonLines,
}

impl DataFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension().and_then(|s| s.to_str())?;
        match extension.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Check if file format is supported
pub fn is_supported_format(path: &Path) -> bool {
    DataFormat::from_path(path).is_some()
}

/// Load a whole file into memory
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    if !path.is_file() {
        return Err(ReconError::invalid_input(format!(
            "File not found: {}",
            path.display()
        )));
    }
    let format = DataFormat::from_path(path).ok_or_else(|| {
        ReconError::invalid_input(format!("Unsupported file format: {}", path.display()))
    })?;

    let file = File::open(path)?;
    let dataset = match format {
        DataFormat::Csv => read_delimited(file, b',')?,
        DataFormat::Tsv => read_delimited(file, b'\t')?,
        DataFormat::Json => read_json(file)?,
        DataFormat::JsonLines => read_json_lines(BufReader::new(file))?,
    };

    log::debug!(
        "Loaded {} rows and {} columns from {}",
        dataset.len(),
        dataset.columns().len(),
        path.display()
    );
    Ok(dataset)
}

/// Parse delimited text with a header row
pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut dataset = Dataset::with_columns(headers.iter().cloned(), Vec::new());
    for record in reader.records() {
        let record = record?;
        // Short records leave trailing columns missing, which reads as null
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, field)| (name.clone(), infer_value(field)))
            .collect();
        dataset.push(row);
    }
    Ok(dataset)
}

/// Parse a JSON array of objects
pub fn read_json<R: Read>(reader: R) -> Result<Dataset> {
    let rows: Vec<Row> = serde_json::from_reader(reader)?;
    Ok(Dataset::from_rows(rows))
}

/// Parse one JSON object per non-blank line
pub fn read_json_lines<R: BufRead>(reader: R) -> Result<Dataset> {
    let mut dataset = Dataset::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        dataset.push(serde_json::from_str(&line)?);
    }
    Ok(dataset)
}

/// Infer a typed value from a text field
pub fn infer_value(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if is_integer_literal(trimmed) {
        // Beyond 2^53 an f64 would merge neighbouring ids, so keep the digits
        return match trimmed.parse::<i64>() {
            Ok(n) => Value::from_i64(n),
            Err(_) => Value::Text(trimmed.to_string()),
        };
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        // "nan" and "inf" stay text
        if n.is_finite() {
            return Value::Number(n);
        }
    }
    match trimmed.to_lowercase().as_str() {
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Value::Timestamp(ts);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(ts) = date.and_hms_opt(0, 0, 0) {
            return Value::Timestamp(ts);
        }
    }
    Value::Text(field.to_string())
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
