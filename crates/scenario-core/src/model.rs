//! Authored scenario content.
//!
//! These types mirror the scenario payload embedded in lesson documents
//! (camelCase JSON). They carry no validation of their own; wrap a
//! [`ScenarioGraph`] in a [`Scenario`](crate::graph::Scenario) before
//! presenting it to a learner.

use serde::{Deserialize, Serialize};

/// A complete branching scenario as produced by the course builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioGraph {
    /// Title shown above the first situation.
    pub title: String,
    /// Short introduction to the scenario.
    #[serde(default)]
    pub description: String,
    /// All decision points, in authoring order.
    pub steps: Vec<Step>,
    /// Id of the step the learner starts at.
    pub start_step_id: String,
    /// Score reachable on the optimal path, as declared by the author.
    pub perfect_score: i64,
    /// Fraction of `perfect_score` needed to pass. Falls back to the
    /// configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_ratio: Option<f64>,
}

/// A single situation the learner has to respond to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Unique id within the scenario.
    pub id: String,
    /// The situation text.
    pub situation: String,
    /// Optional background shown alongside the situation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Responses the learner can pick from.
    pub options: Vec<ResponseOption>,
}

impl Step {
    /// Look up an option of this step by id.
    pub fn option(&self, option_id: &str) -> Option<&ResponseOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// A step is terminal when none of its options leads anywhere.
    pub fn is_terminal(&self) -> bool {
        self.options.iter().all(|o| o.next_step_id.is_none())
    }
}

/// One selectable response at a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseOption {
    /// Unique id within the owning step.
    pub id: String,
    /// The response as shown to the learner.
    pub text: String,
    /// Narrative shown once the response is confirmed.
    #[serde(default)]
    pub consequence: String,
    /// Whether the author considers this the right call.
    #[serde(default)]
    pub is_correct: bool,
    /// Signed score; penalties are negative.
    #[serde(default)]
    pub score: i64,
    /// Step reached after this response; `None` ends the scenario.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_id: Option<String>,
}
