//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for the compare command
#[derive(Debug)]
pub struct ProgressReporter {
    pub load_pb: Option<ProgressBar>,
    pub windows_pb: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create progress reporter for a comparison
    pub fn new_for_compare() -> Self {
        Self {
            load_pb: Some(create_spinner("Loading datasets...")),
            windows_pb: None,
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            load_pb: None,
            windows_pb: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.load_pb.is_some() || self.windows_pb.is_some()
    }

    /// Finish loading and prepare the window bar
    pub fn finish_loading(&mut self, message: &str) {
        if let Some(pb) = self.load_pb.take() {
            pb.finish_with_message(message.to_string());
            self.windows_pb = Some(create_progress_bar(0, "Comparing windows"));
        }
    }

    /// Report `done` of `total` windows folded
    pub fn update_windows(&self, done: u64, total: u64) {
        if let Some(pb) = &self.windows_pb {
            pb.set_length(total);
            pb.set_position(done);
        }
    }

    pub fn finish_windows(&mut self, message: &str) {
        if let Some(pb) = self.windows_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.load_pb.take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = self.windows_pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} windows {msg}")
            .expect("Invalid progress template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
