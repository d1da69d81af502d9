//! Common test utilities and helpers

use std::fs;
use std::path::{Path, PathBuf};
use tabrecon::{Dataset, Result};
use tempfile::TempDir;

/// Temporary directory for files a test writes
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a test CSV file with sample data
    pub fn create_csv(&self, name: &str, data: &[Vec<&str>]) -> Result<PathBuf> {
        let path = self.root().join(name);
        let mut content = String::new();

        for row in data {
            content.push_str(&row.join(","));
            content.push('\n');
        }

        fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a test CSV file with raw string content
    pub fn create_csv_raw(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a test JSON file with sample data
    pub fn create_json(&self, name: &str, data: &serde_json::Value) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, serde_json::to_string_pretty(data)?)?;
        Ok(path)
    }

    pub fn path_str(&self, name: &str) -> String {
        self.root().join(name).to_string_lossy().into_owned()
    }
}

/// Drives the CLI in-process
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Run a tabrecon command and return the result
    pub fn run_command(&self, args: &[&str]) -> Result<()> {
        use clap::Parser;
        use tabrecon::cli::Cli;
        use tabrecon::commands::execute_command;

        let mut cmd_args = vec!["tabrecon"];
        cmd_args.extend(args);

        let cli = Cli::try_parse_from(cmd_args)
            .map_err(|e| tabrecon::ReconError::invalid_input(e.to_string()))?;
        execute_command(cli.command)
    }

    /// Run a command and expect it to succeed
    pub fn expect_success(&self, args: &[&str]) {
        self.run_command(args).expect("Command should succeed");
    }

    /// Run a command and expect it to fail
    pub fn expect_failure(&self, args: &[&str]) -> tabrecon::ReconError {
        self.run_command(args).expect_err("Command should fail")
    }
}

/// Build a dataset from a JSON array of objects
pub fn dataset(value: serde_json::Value) -> Dataset {
    serde_json::from_value(value).expect("valid dataset JSON")
}

pub mod sample_data {
    use super::dataset;
    use serde_json::json;
    use tabrecon::Dataset;

    pub fn people_source() -> Dataset {
        dataset(json!([
            {"id": 1, "name": "Alice"},
            {"id": 2, "name": "Bob"}
        ]))
    }

    pub fn people_target() -> Dataset {
        dataset(json!([
            {"id": 1, "name": "alice"},
            {"id": 3, "name": "Carol"}
        ]))
    }

    pub fn orders() -> Dataset {
        dataset(json!([
            {"order_id": 100, "region": "north", "amount": 10.5, "status": "open"},
            {"order_id": 101, "region": "south", "amount": 20.0, "status": "closed"},
            {"order_id": 102, "region": "north", "amount": 7.25, "status": "open"},
            {"order_id": 103, "region": "east", "amount": 99.0, "status": null},
            {"order_id": 104, "region": "west", "amount": 0.0, "status": "open"},
            {"order_id": 105, "region": "south", "amount": 12.0, "status": "open"}
        ]))
    }

    pub fn source_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "amount"],
            vec!["1", "Alice", "100"],
            vec!["2", "Bob", "200"],
            vec!["3", "Charlie", "300"],
        ]
    }

    pub fn target_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["ID", "Name", "Amount"],
            vec!["1", "alice", "100"],
            vec!["3", "Charlie", "350"],
            vec!["4", "Dana", "400"],
        ]
    }
}
