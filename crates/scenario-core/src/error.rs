//! Error types for scenario loading and traversal.
//!
//! `ConfigurationError` is raised once, at load time, when authored content is
//! structurally unusable. `EngineError` covers misuse of a running
//! [`DecisionEngine`](crate::engine::DecisionEngine): both are caller bugs, not
//! learner-facing failures.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural problems in an authored scenario graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// `start_step_id` does not name any step.
    #[error("missing start step: '{0}'")]
    MissingStartStep(String),

    /// An option points at a step id that does not exist.
    #[error("dangling step reference: option '{option_id}' of step '{step_id}' leads to unknown step '{target}'")]
    DanglingStepReference {
        step_id: String,
        option_id: String,
        target: String,
    },

    /// A step offers no options at all.
    #[error("dead-end step: '{0}' has no options")]
    DeadEndStep(String),

    /// Two steps share an id.
    #[error("duplicate step id: '{0}'")]
    DuplicateStep(String),

    /// Two options within the same step share an id.
    #[error("duplicate option id: '{option_id}' in step '{step_id}'")]
    DuplicateOption { step_id: String, option_id: String },

    /// Following `next_step_id` links can return to a step already on the path.
    #[error("cycle detected: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    /// Pass ratio outside `[0.0, 1.0]`.
    #[error("invalid pass ratio: {0} (expected a value between 0.0 and 1.0)")]
    InvalidPassRatio(f64),

    /// The option scores are large enough that a running total could
    /// overflow `i64`.
    #[error("score overflow: option scores in step '{0}' push the possible total past the i64 range")]
    ScoreOverflow(String),
}

/// The engine operation that was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Select,
    Confirm,
    Advance,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Select => write!(f, "select an option"),
            Action::Confirm => write!(f, "confirm a choice"),
            Action::Advance => write!(f, "advance"),
        }
    }
}

/// Errors returned by engine transitions. State is never mutated when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The option id does not belong to the current step.
    #[error("invalid selection: option '{option_id}' does not belong to step '{step_id}'")]
    InvalidSelection { step_id: String, option_id: String },

    /// Confirm was called before any option was selected.
    #[error("sequencing error: cannot confirm a choice before selecting an option")]
    NothingSelected,

    /// Confirm was called again while the consequence is still displayed.
    #[error("sequencing error: choice already confirmed at step '{0}'")]
    AlreadyConfirmed(String),

    /// Advance was called while no consequence is displayed.
    #[error("sequencing error: cannot advance before confirming a choice")]
    NotConfirmed,

    /// Any action after the attempt has finished.
    #[error("sequencing error: cannot {0} after the attempt has finished")]
    AttemptFinished(Action),
}

impl EngineError {
    /// Returns `true` if the call arrived in the wrong order, as opposed to
    /// naming an option the current step does not offer.
    pub fn is_sequencing(&self) -> bool {
        !matches!(self, EngineError::InvalidSelection { .. })
    }
}
