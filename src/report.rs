//! Report layout: what a renderer must show and highlight

use crate::analyzer::{row_key, Analysis, AnalyzeOptions};
use crate::dataset::cell_ignore_case;
use crate::diff::{DiffRow, MismatchType, Side};
use crate::error::Result;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SOURCE_COLUMN: &str = "__source";
pub const MISMATCH_TYPE_COLUMN: &str = "__mismatch_type";
/// Rows between the header row and the legend: the data rows plus this gap
pub const LEGEND_OFFSET_ROWS: usize = 5;

/// Cell highlight in the data sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    None,
    MismatchedCell,
    SourceOnlyRow,
    TargetOnlyRow,
}

impl Highlight {
    /// RGB fill colour
    pub fn color(self) -> Option<&'static str> {
        match self {
            Highlight::None => None,
            Highlight::MismatchedCell => Some("FFFF00"),
            Highlight::SourceOnlyRow => Some("FFCCCB"),
            Highlight::TargetOnlyRow => Some("CCEEFF"),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Highlight::None => "",
            Highlight::MismatchedCell => "Value mismatch (only the differing cells)",
            Highlight::SourceOnlyRow => "Row present only in source",
            Highlight::TargetOnlyRow => "Row present only in target",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCell {
    pub value: Value,
    pub highlight: Highlight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub highlight: Highlight,
    pub color: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub section: String,
    pub metric: String,
    pub value: String,
}

/// Everything a renderer needs to produce the two-sheet workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPlan {
    pub data_sheet: DataSheet,
    /// Zero-based sheet row where the legend starts
    pub legend_row: usize,
    pub legend: Vec<LegendEntry>,
    pub summary_sheet: Vec<SummaryLine>,
}

impl ReportPlan {
    pub fn build(analysis: &Analysis, options: &AnalyzeOptions) -> Self {
        let columns = data_columns(analysis);
        let rows: Vec<Vec<ReportCell>> = analysis
            .rows()
            .map(|row| plan_row(row, &columns, analysis))
            .collect();

        let mut header = columns;
        header.push(SOURCE_COLUMN.to_string());
        header.push(MISMATCH_TYPE_COLUMN.to_string());

        let legend = [
            Highlight::MismatchedCell,
            Highlight::SourceOnlyRow,
            Highlight::TargetOnlyRow,
        ]
        .into_iter()
        .map(|h| LegendEntry {
            highlight: h,
            color: h.color().unwrap_or_default().to_string(),
            description: h.description().to_string(),
        })
        .collect();

        Self {
            legend_row: rows.len() + LEGEND_OFFSET_ROWS,
            data_sheet: DataSheet { columns: header, rows },
            legend,
            summary_sheet: summary_lines(analysis, options),
        }
    }

    /// Cells carrying the given highlight, as `(row, column)` positions
    pub fn highlighted(&self, highlight: Highlight) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        for (r, cells) in self.data_sheet.rows.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                if cell.highlight == highlight {
                    found.push((r, c));
                }
            }
        }
        found
    }
}

/// Union of row columns, one per lowercase name, first-seen
fn data_columns(analysis: &Analysis) -> Vec<String> {
    let mut seen: IndexMap<String, String> = IndexMap::new();
    for row in analysis.rows() {
        for name in row.values.keys() {
            seen.entry(name.to_lowercase()).or_insert_with(|| name.clone());
        }
    }
    seen.into_values().collect()
}

fn plan_row(row: &DiffRow, columns: &[String], analysis: &Analysis) -> Vec<ReportCell> {
    let tag = row.mismatch_type.unwrap_or(MismatchType::only_in(row.side));
    let row_highlight = match tag {
        MismatchType::SourceOnly => Highlight::SourceOnlyRow,
        MismatchType::TargetOnly => Highlight::TargetOnlyRow,
        MismatchType::ValueMismatch => Highlight::None,
    };

    let mismatched: HashSet<String> = if tag == MismatchType::ValueMismatch {
        let key = row_key(&row.values, &analysis.key_columns);
        analysis
            .mismatch_details
            .get(&key)
            .map(|d| d.columns.iter().map(|c| c.to_lowercase()).collect())
            .unwrap_or_default()
    } else {
        HashSet::new()
    };

    let mut cells: Vec<ReportCell> = columns
        .iter()
        .map(|col| ReportCell {
            value: cell_ignore_case(&row.values, col).clone(),
            highlight: if mismatched.contains(&col.to_lowercase()) {
                Highlight::MismatchedCell
            } else {
                row_highlight
            },
        })
        .collect();

    let side = match row.side {
        Side::Source => "Source",
        Side::Target => "Target",
    };
    cells.push(ReportCell {
        value: Value::from(side),
        highlight: row_highlight,
    });
    cells.push(ReportCell {
        value: Value::from(tag.as_str()),
        highlight: row_highlight,
    });
    cells
}

fn summary_lines(analysis: &Analysis, options: &AnalyzeOptions) -> Vec<SummaryLine> {
    let line = |section: &str, metric: &str, value: String| SummaryLine {
        section: section.to_string(),
        metric: metric.to_string(),
        value,
    };

    let mut lines: Vec<SummaryLine> = analysis
        .summary
        .metrics()
        .into_iter()
        .map(|(metric, value)| {
            let section = if metric.ends_with("in Output") || metric.starts_with("Records") {
                "Output"
            } else {
                "Comparison Summary"
            };
            line(section, metric, value)
        })
        .collect();

    lines.push(line(
        "Configuration",
        "Key Columns",
        if analysis.key_columns.is_empty() {
            "(none)".to_string()
        } else {
            analysis.key_columns.join(", ")
        },
    ));
    lines.push(line(
        "Notes",
        "Sample Data",
        format!(
            "Output is limited to {} value-mismatch keys, {} source-only rows and {} target-only rows",
            options.max_value_mismatches, options.max_source_only, options.max_target_only
        ),
    ));
    lines
}

/// Produces a report from a plan
pub trait ReportRenderer {
    fn render(&self, plan: &ReportPlan) -> Result<()>;
}

/// Writes the plan as pretty JSON
#[derive(Debug, Clone)]
pub struct JsonReportRenderer {
    path: PathBuf,
}

impl JsonReportRenderer {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportRenderer for JsonReportRenderer {
    fn render(&self, plan: &ReportPlan) -> Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, plan)?;
        writer.flush()?;
        log::info!("Report written to {}", self.path.display());
        Ok(())
    }
}
