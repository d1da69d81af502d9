//! End-to-end reconciliation scenarios

use crate::common::{dataset, sample_data};
use serde_json::json;
use tabrecon::{
    compare, compare_structure, find_duplicates, within_threshold, CompareOptions, CompositeKey, MismatchType,
    ReconError, Side, ThresholdReason, Value,
};

#[test]
fn test_key_mode_case_insensitive_values() {
    let source = sample_data::people_source();
    let target = sample_data::people_target();

    let comparison = compare(&source, &target, &CompareOptions::default().with_keys(["id"])).unwrap();

    let source_only: Vec<_> = comparison
        .diff_rows
        .iter()
        .filter(|r| r.is(MismatchType::SourceOnly))
        .collect();
    let target_only: Vec<_> = comparison
        .diff_rows
        .iter()
        .filter(|r| r.is(MismatchType::TargetOnly))
        .collect();

    assert_eq!(source_only.len(), 1);
    assert_eq!(source_only[0].values["id"], Value::Number(2.0));
    assert_eq!(source_only[0].side, Side::Source);
    assert_eq!(target_only.len(), 1);
    assert_eq!(target_only[0].values["id"], Value::Number(3.0));
    assert_eq!(target_only[0].side, Side::Target);
    assert!(!comparison.diff_rows.iter().any(|r| r.is(MismatchType::ValueMismatch)));

    assert_eq!(comparison.summary.rows_only_in_source, 1);
    assert_eq!(comparison.summary.rows_only_in_target, 1);
    assert_eq!(comparison.summary.value_mismatches, 0);
    assert_eq!(comparison.summary.total_differences, 2);
}

#[test]
fn test_value_mismatch_detail() {
    let source = dataset(json!([{"id": 1, "amt": 100}]));
    let target = dataset(json!([{"id": 1, "amt": 200}]));

    let comparison = compare(&source, &target, &CompareOptions::default().with_keys(["id"])).unwrap();

    assert_eq!(comparison.diff_rows.len(), 2);
    assert!(comparison
        .diff_rows
        .iter()
        .all(|r| r.is(MismatchType::ValueMismatch)));
    let sides: Vec<Side> = comparison.diff_rows.iter().map(|r| r.side).collect();
    assert!(sides.contains(&Side::Source));
    assert!(sides.contains(&Side::Target));

    let key = CompositeKey(vec!["1".to_string()]);
    assert_eq!(key.to_string(), "(1,)");
    let detail = comparison.mismatch_details.get(&key).expect("detail for key (1,)");
    assert!(detail.columns.contains("amt"));
    assert!(!detail.ambiguous);
    assert_eq!(comparison.summary.value_mismatches, 1);
}

#[test]
fn test_threshold_scenarios() {
    let check = within_threshold(95, 100, 0.05);
    assert!(check.passed);
    assert_eq!(check.reason, ThresholdReason::WithinThreshold);
    assert_eq!(check.reason.to_string(), "within threshold");

    let check = within_threshold(80, 100, 0.05);
    assert!(!check.passed);
    assert_eq!(check.reason.to_string(), "count mismatch");

    let check = within_threshold(100, 100, 0.0);
    assert!(check.passed);
    assert_eq!(check.reason, ThresholdReason::ExactMatch);
}

#[test]
fn test_duplicates_scenario() {
    let data = dataset(json!([
        {"id": 1, "v": "a"},
        {"id": 1, "v": "b"},
        {"id": 2, "v": "c"}
    ]));

    let report = find_duplicates(&data, Some(&["id".to_string()][..])).unwrap();

    assert_eq!(report.groups, 1);
    assert_eq!(report.rows.len(), 2);
    let indices: Vec<usize> = report.rows.iter().map(|r| r.row_index).collect();
    assert_eq!(indices, vec![0, 1]);
    assert!(report.rows.iter().all(|r| r.duplicate_group == 0));
    assert!(report
        .rows
        .iter()
        .all(|r| r.values["id"] == Value::Number(1.0)));
}

#[test]
fn test_no_common_columns() {
    let source_cols = vec!["a".to_string(), "b".to_string()];
    let target_cols = vec!["x".to_string(), "y".to_string()];

    let err = compare_structure(&source_cols, &target_cols).unwrap_err();
    assert!(matches!(err, ReconError::NoCommonColumns { .. }));

    let source = dataset(json!([{"a": 1, "b": 2}]));
    let target = dataset(json!([{"x": 1, "y": 2}]));
    let err = compare(&source, &target, &CompareOptions::default()).unwrap_err();
    assert!(matches!(err, ReconError::NoCommonColumns { .. }));
    assert!(err.is_configuration());
}

#[test]
fn test_identical_inputs_have_no_differences() {
    let data = sample_data::orders();

    for options in [
        CompareOptions::default(),
        CompareOptions::default().with_keys(["order_id"]),
        CompareOptions::default().with_keys(["region"]).with_chunk_size(2),
    ] {
        let comparison = compare(&data, &data, &options).unwrap();
        assert!(comparison.diff_rows.is_empty(), "options: {:?}", options);
        assert!(!comparison.summary.has_differences());
        assert_eq!(comparison.summary.result.to_string(), "Identical");
    }
}

#[test]
fn test_hash_mode_reports_changed_rows_on_both_sides() {
    let source = dataset(json!([
        {"id": 1, "name": "Alice"},
        {"id": 2, "name": "Bob"}
    ]));
    let target = dataset(json!([
        {"id": 1, "name": "ALICE "},
        {"id": 2, "name": "Robert"}
    ]));

    let comparison = compare(&source, &target, &CompareOptions::default()).unwrap();

    assert!(!comparison.is_key_mode());
    assert_eq!(comparison.summary.rows_only_in_source, 1);
    assert_eq!(comparison.summary.rows_only_in_target, 1);
    assert_eq!(comparison.summary.value_mismatches, 0);
}
