//! Unit tests for CLI commands

use crate::common::{sample_data, CliTestRunner};
use tabrecon::ErrorKind;

fn runner_with_csvs() -> CliTestRunner {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_csv("source.csv", &sample_data::source_csv_data())
        .unwrap();
    runner
        .fixture()
        .create_csv("target.csv", &sample_data::target_csv_data())
        .unwrap();
    runner
}

#[test]
fn test_compare_command_with_keys() {
    let runner = runner_with_csvs();
    let source = runner.fixture().path_str("source.csv");
    let target = runner.fixture().path_str("target.csv");

    runner.expect_success(&["compare", &source, &target, "--keys", "id"]);
}

#[test]
fn test_compare_command_hash_mode_json() {
    let runner = runner_with_csvs();
    let source = runner.fixture().path_str("source.csv");
    let target = runner.fixture().path_str("target.csv");

    runner.expect_success(&["compare", &source, &target, "--format", "json"]);
}

#[test]
fn test_compare_command_all_options() {
    let runner = runner_with_csvs();
    let source = runner.fixture().path_str("source.csv");
    let target = runner.fixture().path_str("target.csv");
    let report = runner.fixture().path_str("report.json");

    runner.expect_success(&[
        "compare",
        &source,
        &target,
        "--keys",
        "id",
        "--chunk-size",
        "2",
        "--strategy",
        "positional",
        "--parallel",
        "--max-value-mismatches",
        "10",
        "--max-source-only",
        "1",
        "--max-target-only",
        "1",
        "--report",
        &report,
        "--format",
        "json",
    ]);

    let text = std::fs::read_to_string(&report).unwrap();
    let plan: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(plan["data_sheet"]["columns"].as_array().is_some());
    assert_eq!(plan["legend"].as_array().map(|l| l.len()), Some(3));
}

#[test]
fn test_compare_command_with_config_file() {
    let runner = runner_with_csvs();
    let source = runner.fixture().path_str("source.csv");
    let target = runner.fixture().path_str("target.csv");
    let config = runner
        .fixture()
        .create_json(
            "recon.json",
            &serde_json::json!({"chunk_size": 1, "chunk_strategy": "positional", "max_source_only": 5}),
        )
        .unwrap();

    runner.expect_success(&[
        "compare",
        &source,
        &target,
        "--keys",
        "id",
        "--config",
        &config.to_string_lossy(),
    ]);
}

#[test]
fn test_compare_command_zero_chunk_size_rejected() {
    let runner = runner_with_csvs();
    let source = runner.fixture().path_str("source.csv");
    let target = runner.fixture().path_str("target.csv");

    let err = runner.expect_failure(&["compare", &source, &target, "--chunk-size", "0"]);
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_compare_command_unknown_key() {
    let runner = runner_with_csvs();
    let source = runner.fixture().path_str("source.csv");
    let target = runner.fixture().path_str("target.csv");

    let err = runner.expect_failure(&["compare", &source, &target, "--keys", "nope"]);
    assert!(err.is_configuration());
}

#[test]
fn test_compare_command_missing_file() {
    let runner = runner_with_csvs();
    let source = runner.fixture().path_str("source.csv");
    let missing = runner.fixture().path_str("missing.csv");

    let err = runner.expect_failure(&["compare", &source, &missing]);
    assert!(err.to_string().contains("Failed to load target"));
    assert!(err.is_configuration());
}

#[test]
fn test_compare_command_bad_format() {
    let runner = runner_with_csvs();
    let source = runner.fixture().path_str("source.csv");
    let target = runner.fixture().path_str("target.csv");

    runner.expect_failure(&["compare", &source, &target, "--format", "xml"]);
}

#[test]
fn test_structure_command() {
    let runner = runner_with_csvs();
    let source = runner.fixture().path_str("source.csv");
    let target = runner.fixture().path_str("target.csv");

    runner.expect_success(&["structure", &source, &target]);
    runner.expect_success(&["structure", &source, &target, "--format", "json"]);
}

#[test]
fn test_structure_command_no_common_columns() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner
        .fixture()
        .create_csv_raw("a.csv", "a,b\n1,2\n")
        .unwrap();
    let c = runner
        .fixture()
        .create_csv_raw("c.csv", "c,d\n1,2\n")
        .unwrap();

    let err = runner.expect_failure(&["structure", &a.to_string_lossy(), &c.to_string_lossy()]);
    assert!(err.is_configuration());
}

#[test]
fn test_duplicates_command() {
    let runner = CliTestRunner::new().unwrap();
    let input = runner
        .fixture()
        .create_csv_raw("dups.csv", "id,v\n1,a\n1,b\n2,c\n")
        .unwrap();
    let input = input.to_string_lossy();

    runner.expect_success(&["duplicates", &input, "--keys", "id"]);
    runner.expect_success(&["duplicates", &input, "--format", "json"]);
}

#[test]
fn test_threshold_command() {
    let runner = CliTestRunner::new().unwrap();

    runner.expect_success(&["threshold", "95", "100"]);
    runner.expect_success(&["threshold", "80", "100", "--fraction", "0.05", "--format", "json"]);
}

#[test]
fn test_threshold_command_reads_config_fraction() {
    let runner = CliTestRunner::new().unwrap();
    let config = runner
        .fixture()
        .create_json("recon.json", &serde_json::json!({"threshold_fraction": 0.25}))
        .unwrap();
    let config = config.to_string_lossy();

    runner.expect_success(&["threshold", "80", "100", "--config", &config]);
    runner.expect_success(&["threshold", "80", "100", "--config", &config, "--fraction", "0.01"]);

    let bad = runner
        .fixture()
        .create_json("bad.json", &serde_json::json!({"threshold_fraction": -1.0}))
        .unwrap();
    let err = runner.expect_failure(&["threshold", "80", "100", "--config", &bad.to_string_lossy()]);
    assert!(err.is_configuration());
}

#[test]
fn test_threshold_command_negative_fraction() {
    let runner = CliTestRunner::new().unwrap();

    let err = runner.expect_failure(&["threshold", "95", "100", "--fraction=-0.1"]);
    assert!(err.is_configuration());
}

#[test]
fn test_unknown_subcommand() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_failure(&["frobnicate", "data.csv"]);
}
