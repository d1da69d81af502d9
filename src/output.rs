//! Output formatting utilities

use crate::analyzer::Analysis;
use crate::columns::StructureComparison;
use crate::comparator::Comparison;
use crate::diff::DiffRow;
use crate::duplicates::DuplicateReport;
use crate::error::Result;
use crate::threshold::ThresholdCheck;

/// Rows listed per category in pretty output
const SAMPLE_ROWS: usize = 5;

/// Pretty printer for tabrecon output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print comparison and analysis results
    pub fn print_compare_results(comparison: &Comparison, analysis: &Analysis) {
        let s = &analysis.summary;
        let mode = if comparison.is_key_mode() {
            format!("keys {}", comparison.key_columns.join(", "))
        } else {
            "whole-row hash".to_string()
        };
        println!("🔍 Comparison ({}, {} windows)", mode, comparison.windows);
        println!("├─ Source rows: {}", s.total_source_rows);
        println!("├─ Target rows: {}", s.total_target_rows);

        print_category("Only in source", s.rows_only_in_source, &analysis.source_only);
        print_category("Only in target", s.rows_only_in_target, &analysis.target_only);

        if s.value_mismatches > 0 {
            println!("├─ ❌ Value mismatches: {}", s.value_mismatches);
            let details: Vec<_> = analysis.mismatch_details.iter().take(SAMPLE_ROWS).collect();
            for (i, (key, detail)) in details.iter().enumerate() {
                let prefix = if i == details.len() - 1 { "│  └─" } else { "│  ├─" };
                let columns: Vec<&str> = detail.columns.iter().map(String::as_str).collect();
                let marker = if detail.ambiguous { " (ambiguous)" } else { "" };
                println!("{} {}: {}{}", prefix, key, columns.join(", "), marker);
            }
        } else {
            println!("├─ ✅ Value mismatches: none");
        }

        if s.records_in_output < s.records_in_input {
            println!(
                "├─ Output capped: {} of {} diff rows shown",
                s.records_in_output, s.records_in_input
            );
        }

        if s.has_differences() {
            println!("└─ ❌ {} ({} total differences)", s.result, s.total_differences);
        } else {
            println!("└─ ✅ {}", s.result);
        }
    }

    /// Print column structure comparison
    pub fn print_structure(structure: &StructureComparison) {
        println!("📋 Column Structure");
        if structure.columns_match {
            println!("├─ ✅ Column counts match");
        } else {
            println!("├─ ❌ Column counts differ");
        }
        print_names("Only in source", &structure.source_only);
        println!("└─ Only in target: {}", join_or_none(&structure.target_only));
    }

    /// Print duplicate rows
    pub fn print_duplicates(report: &DuplicateReport) {
        if report.is_empty() {
            println!("✅ No duplicates over {}", report.key_columns.join(", "));
            return;
        }

        println!(
            "❌ {} duplicate rows in {} groups over {}",
            report.rows.len(),
            report.groups,
            report.key_columns.join(", ")
        );
        for (i, row) in report.rows.iter().enumerate() {
            let prefix = if i == report.rows.len() - 1 { "└─" } else { "├─" };
            println!(
                "{} group {} row {}: {}",
                prefix,
                row.duplicate_group,
                row.row_index,
                format_values(&row.values)
            );
        }
    }

    /// Print row-count tolerance result
    pub fn print_threshold(check: &ThresholdCheck) {
        let icon = if check.passed { "✅" } else { "❌" };
        println!("{} Row counts: {}", icon, check.reason);
        println!("├─ Source: {}", check.source_count);
        println!("├─ Target: {}", check.target_count);
        println!("└─ Allowed difference: {:.1}%", check.fraction * 100.0);
    }
}

fn print_category(label: &str, count: usize, rows: &[DiffRow]) {
    if count == 0 {
        println!("├─ ✅ {}: none", label);
        return;
    }
    println!("├─ ❌ {}: {}", label, count);
    let shown = rows.len().min(SAMPLE_ROWS);
    for (i, row) in rows.iter().take(shown).enumerate() {
        let prefix = if i == shown - 1 { "│  └─" } else { "│  ├─" };
        println!("{} row {}: {}", prefix, row.row_index, format_values(&row.values));
    }
}

fn print_names(label: &str, names: &std::collections::BTreeSet<String>) {
    println!("├─ {}: {}", label, join_or_none(names));
}

fn join_or_none(names: &std::collections::BTreeSet<String>) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn format_values(values: &crate::dataset::Row) -> String {
    values
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format comparison and analysis results as JSON
    pub fn format_compare_results(comparison: &Comparison, analysis: &Analysis) -> Result<String> {
        let details: Vec<_> = analysis
            .mismatch_details
            .iter()
            .map(|(key, detail)| {
                serde_json::json!({
                    "key": key,
                    "columns": detail.columns,
                    "ambiguous": detail.ambiguous,
                })
            })
            .collect();

        let json = serde_json::json!({
            "key_columns": comparison.key_columns,
            "windows": comparison.windows,
            "comparison": comparison.summary,
            "summary": analysis.summary,
            "mismatch_details": details,
            "rows": analysis.rows().collect::<Vec<_>>(),
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}
