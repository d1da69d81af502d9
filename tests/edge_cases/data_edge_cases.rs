//! Edge case tests for data-related scenarios

use crate::common::{dataset, CliTestRunner, TestFixture};
use serde_json::json;
use tabrecon::data::{load_dataset, read_delimited};
use tabrecon::error::{DataError, ResourceError};
use tabrecon::{
    analyze, compare, find_duplicates, AnalyzeOptions, CompareOptions, Dataset, ErrorKind, MismatchType, ReconError,
    Value,
};

#[test]
fn test_malformed_json_file() {
    let runner = CliTestRunner::new().unwrap();
    let good = runner
        .fixture()
        .create_csv_raw("good.csv", "id,name\n1,a\n")
        .unwrap();
    let bad = runner
        .fixture()
        .create_csv_raw("bad.json", r#"[{"id": 1, "name": "a"}, {"id": 2,"#)
        .unwrap();

    let err = runner.expect_failure(&["compare", &good.to_string_lossy(), &bad.to_string_lossy()]);
    assert_eq!(err.kind(), ErrorKind::Data);
}

#[test]
fn test_invalid_utf8_csv() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.root().join("latin1.csv");
    std::fs::write(&path, b"id,name\n1,caf\xe9\n").unwrap();

    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(err, ReconError::Csv(_)));
}

#[test]
fn test_unsupported_extension() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv_raw("data.parquet", "id\n1\n").unwrap();

    let err = load_dataset(&path).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("Unsupported file format"));
}

#[test]
fn test_ragged_rows_read_as_null() {
    let fixture = TestFixture::new().unwrap();
    let source = fixture
        .create_csv_raw("source.csv", "id,name,price\n1,A,19.99\n2,B\n3,C,5,extra\n")
        .unwrap();
    let target = fixture
        .create_csv_raw("target.csv", "id,name,price\n1,A,19.99\n2,B,\n3,C,5\n")
        .unwrap();

    let source = load_dataset(&source).unwrap();
    let target = load_dataset(&target).unwrap();
    assert!(source.rows[1].get("price").is_none());
    assert_eq!(target.rows[1]["price"], Value::Null);
    assert_eq!(source.rows[2].len(), 3);

    for keys in [vec![], vec!["id"]] {
        let comparison = compare(&source, &target, &CompareOptions::default().with_keys(keys)).unwrap();
        assert!(comparison.diff_rows.is_empty());
    }
}

#[test]
fn test_nan_and_null_are_equal() {
    let source = Dataset::from_rows(vec![tabrecon::dataset::row([
        ("id", Value::from(1)),
        ("amt", Value::Number(f64::NAN)),
    ])]);
    let target = dataset(json!([{"id": 1, "amt": null}]));

    let comparison = compare(&source, &target, &CompareOptions::default().with_keys(["id"])).unwrap();
    assert!(comparison.diff_rows.is_empty());

    let comparison = compare(&source, &target, &CompareOptions::default()).unwrap();
    assert!(comparison.diff_rows.is_empty());
}

#[test]
fn test_null_keys_match_each_other() {
    let source = dataset(json!([{"id": null, "v": "a"}, {"id": 2, "v": "b"}]));
    let target = dataset(json!([{"id": null, "v": "z"}, {"id": 2, "v": "b"}]));

    let comparison = compare(&source, &target, &CompareOptions::default().with_keys(["id"])).unwrap();
    assert_eq!(comparison.summary.value_mismatches, 1);
    assert!(comparison
        .mismatch_details
        .keys()
        .any(|k| k.to_string() == "(NA,)"));
}

#[test]
fn test_duplicate_keys_pair_closest_rows() {
    let source = dataset(json!([
        {"id": 1, "a": "x", "b": "p"},
        {"id": 1, "a": "y", "b": "q"}
    ]));
    let target = dataset(json!([
        {"id": 1, "a": "x", "b": "p"},
        {"id": 1, "a": "y", "b": "r"}
    ]));

    let comparison = compare(&source, &target, &CompareOptions::default().with_keys(["id"])).unwrap();

    assert_eq!(comparison.summary.value_mismatches, 1);
    assert_eq!(comparison.summary.rows_only_in_source, 0);
    let indices: Vec<usize> = comparison.diff_rows.iter().map(|r| r.row_index).collect();
    assert_eq!(indices, vec![1, 1]);

    let detail = comparison.mismatch_details.values().next().unwrap();
    assert!(detail.ambiguous);
    assert_eq!(detail.columns.iter().collect::<Vec<_>>(), vec!["b"]);
}

#[test]
fn test_duplicate_key_surplus_is_one_sided() {
    let source = dataset(json!([
        {"id": 1, "v": "a"},
        {"id": 1, "v": "b"},
        {"id": 1, "v": "c"}
    ]));
    let target = dataset(json!([{"id": 1, "v": "z"}]));

    let comparison = compare(&source, &target, &CompareOptions::default().with_keys(["id"])).unwrap();
    assert_eq!(comparison.summary.value_mismatches, 1);
    assert_eq!(comparison.summary.rows_only_in_source, 2);
    assert_eq!(comparison.summary.rows_only_in_target, 0);
}

#[test]
fn test_empty_side() {
    let empty = Dataset::new();
    let data = dataset(json!([{"id": 1}]));

    let err = compare(&empty, &data, &CompareOptions::default()).unwrap_err();
    assert!(matches!(err, ReconError::NoCommonColumns { .. }));

    let report = find_duplicates(&empty, None).unwrap();
    assert!(report.is_empty());

    let analysis = analyze(&[], &AnalyzeOptions::default(), None).unwrap();
    assert!(analysis.is_empty());
    assert!(!analysis.summary.has_differences());
}

#[test]
fn test_header_only_inputs_are_identical() {
    let empty = read_delimited("id,amt\n".as_bytes(), b',').unwrap();

    for options in [
        CompareOptions::default(),
        CompareOptions::default().with_keys(["id"]),
    ] {
        let comparison = compare(&empty, &empty.clone(), &options).unwrap();
        assert!(comparison.diff_rows.is_empty());
        assert!(!comparison.summary.has_differences());
        assert_eq!(comparison.summary.result.to_string(), "Identical");
    }

    let populated = read_delimited("id,amt\n1,10\n2,20\n".as_bytes(), b',').unwrap();
    let comparison = compare(&empty, &populated, &CompareOptions::default().with_keys(["id"])).unwrap();
    assert_eq!(comparison.summary.rows_only_in_target, 2);
    assert_eq!(comparison.summary.rows_only_in_source, 0);
}

#[test]
fn test_ids_beyond_exact_float_range_stay_distinct() {
    let source = read_delimited("id,amt\n9007199254740993,1\n".as_bytes(), b',').unwrap();
    let target = read_delimited("id,amt\n9007199254740992,1\n".as_bytes(), b',').unwrap();

    let comparison = compare(&source, &target, &CompareOptions::default().with_keys(["id"])).unwrap();
    assert_eq!(comparison.summary.rows_only_in_source, 1);
    assert_eq!(comparison.summary.rows_only_in_target, 1);
    assert_eq!(comparison.summary.total_differences, 2);
    let source_only = comparison
        .diff_rows
        .iter()
        .find(|r| r.is(MismatchType::SourceOnly))
        .unwrap();
    assert_eq!(source_only.values["id"], Value::from("9007199254740993"));
}

#[test]
fn test_key_fanout_ceiling() {
    let source = dataset(json!([{"id": 1, "v": "a"}, {"id": 1, "v": "b"}, {"id": 1, "v": "c"}]));
    let target = dataset(json!([{"id": 1, "v": "a"}]));

    let mut options = CompareOptions::default().with_keys(["id"]);
    options.max_key_fanout = Some(2);

    let err = compare(&source, &target, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    match err {
        ReconError::ChunkFailed { source, .. } => assert!(matches!(
            *source,
            ReconError::Resource(ResourceError::KeyFanoutTooLarge { rows: 3, limit: 2, .. })
        )),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_chunk_row_ceiling() {
    let source = dataset(json!([{"id": 1}, {"id": 2}, {"id": 3}]));
    let target = dataset(json!([{"id": 1}, {"id": 2}, {"id": 3}]));

    let mut options = CompareOptions::default().with_keys(["id"]);
    options.max_chunk_rows = Some(4);

    let err = compare(&source, &target, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert!(err.to_string().contains("ceiling is 4"));
}

#[test]
fn test_case_colliding_columns_rejected() {
    let source = dataset(json!([{"id": 1, "ID": 2}]));
    let target = dataset(json!([{"id": 1}]));

    let err = compare(&source, &target, &CompareOptions::default()).unwrap_err();
    assert!(matches!(err, ReconError::Data(DataError::AmbiguousColumn { .. })));
    assert_eq!(err.kind(), ErrorKind::Data);
}

#[test]
fn test_case_differing_columns_between_sides() {
    let source = dataset(json!([{"Id": 1, "Name": "Ann"}, {"Id": 2, "Name": "Bo"}]));
    let target = dataset(json!([{"id": 1, "name": "ann"}, {"id": 2, "name": "Bob"}]));

    let comparison = compare(&source, &target, &CompareOptions::default().with_keys(["ID"])).unwrap();
    assert_eq!(comparison.key_columns, vec!["Id"]);
    assert_eq!(comparison.summary.value_mismatches, 1);

    let analysis = analyze(
        &comparison.diff_rows,
        &AnalyzeOptions::default().with_keys(comparison.key_columns.clone()),
        Some(&comparison.summary),
    )
    .unwrap();
    assert_eq!(analysis.value_mismatches.len(), 2);
    assert!(analysis
        .value_mismatches
        .iter()
        .all(|r| r.is(MismatchType::ValueMismatch)));
    let detail = analysis.mismatch_details.values().next().unwrap();
    assert_eq!(detail.columns.iter().collect::<Vec<_>>(), vec!["Name"]);
}

#[test]
fn test_untagged_rows_are_recategorized() {
    let mut rows = compare(
        &dataset(json!([{"id": 1, "v": "a"}, {"id": 2, "v": "b"}])),
        &dataset(json!([{"id": 1, "v": "z"}])),
        &CompareOptions::default().with_keys(["id"]),
    )
    .unwrap()
    .diff_rows;
    for row in &mut rows {
        row.mismatch_type = None;
    }

    let analysis = analyze(&rows, &AnalyzeOptions::default().with_keys(["id"]), None).unwrap();
    assert_eq!(analysis.recategorized, 3);
    assert_eq!(analysis.value_mismatches.len(), 2);
    assert_eq!(analysis.source_only.len(), 1);
    assert_eq!(analysis.summary.value_mismatches, 1);
}
