//! Score accumulation and pass/fail classification.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::path::PathEntry;

/// Fraction of the perfect score needed to pass when neither the scenario nor
/// the configuration says otherwise.
pub const DEFAULT_PASS_RATIO: f64 = 0.7;

/// Absorbs representation error in thresholds like `0.7 * 20`.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Sum of the scores along a path.
///
/// The engine keeps no separate running total; every reported score is
/// derived from the recorded path with this function. Saturates at the `i64`
/// bounds; paths through a validated [`Scenario`](crate::graph::Scenario)
/// never reach them.
pub fn accumulate(path: &[PathEntry]) -> i64 {
    path.iter()
        .fold(0i64, |total, entry| total.saturating_add(entry.score))
}

/// Check that a pass ratio lies within `[0.0, 1.0]`.
pub fn validate_pass_ratio(ratio: f64) -> Result<f64, ConfigurationError> {
    if ratio.is_finite() && (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(ConfigurationError::InvalidPassRatio(ratio))
    }
}

/// Final outcome of one attempt, handed to the hosting quiz controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub passed: bool,
    pub total_score: i64,
    pub perfect_score: i64,
}

impl Verdict {
    /// Total as a fraction of the perfect score. Unclamped; `None` when the
    /// perfect score is zero.
    pub fn ratio(&self) -> Option<f64> {
        if self.perfect_score == 0 {
            None
        } else {
            Some(self.total_score as f64 / self.perfect_score as f64)
        }
    }
}

/// Threshold classifier: `passed = total >= perfect * pass_ratio`.
///
/// No clamping is applied; totals above the perfect score or below zero are
/// compared as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultClassifier {
    pass_ratio: f64,
}

impl Default for ResultClassifier {
    fn default() -> Self {
        Self {
            pass_ratio: DEFAULT_PASS_RATIO,
        }
    }
}

impl ResultClassifier {
    pub fn new(pass_ratio: f64) -> Result<Self, ConfigurationError> {
        Ok(Self {
            pass_ratio: validate_pass_ratio(pass_ratio)?,
        })
    }

    pub fn pass_ratio(&self) -> f64 {
        self.pass_ratio
    }

    /// Minimum total needed to pass for a given perfect score.
    pub fn threshold(&self, perfect_score: i64) -> f64 {
        perfect_score as f64 * self.pass_ratio
    }

    pub fn classify(&self, total_score: i64, perfect_score: i64) -> Verdict {
        let passed = total_score as f64 + THRESHOLD_EPSILON >= self.threshold(perfect_score);
        Verdict {
            passed,
            total_score,
            perfect_score,
        }
    }
}
