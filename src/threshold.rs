//! Row-count tolerance check

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdReason {
    ExactMatch,
    WithinThreshold,
    CountMismatch,
}

impl fmt::Display for ThresholdReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThresholdReason::ExactMatch => "exact match",
            ThresholdReason::WithinThreshold => "within threshold",
            ThresholdReason::CountMismatch => "count mismatch",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCheck {
    pub source_count: u64,
    pub target_count: u64,
    pub fraction: f64,
    pub passed: bool,
    pub reason: ThresholdReason,
}

/// Passes when the counts are equal, or differ by at most `fraction` of
/// the target count.
pub fn within_threshold(source_count: u64, target_count: u64, fraction: f64) -> ThresholdCheck {
    let (passed, reason) = if source_count == target_count {
        (true, ThresholdReason::ExactMatch)
    } else {
        let diff = source_count.abs_diff(target_count) as f64;
        if diff <= (target_count as f64 * fraction).abs() {
            (true, ThresholdReason::WithinThreshold)
        } else {
            (false, ThresholdReason::CountMismatch)
        }
    };

    ThresholdCheck {
        source_count,
        target_count,
        fraction,
        passed,
        reason,
    }
}
