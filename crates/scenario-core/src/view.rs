//! Read-only projection of an engine for the presentation layer.

use serde::Serialize;

use crate::engine::EngineState;
use crate::path::PathEntry;
use crate::scoring::Verdict;

/// Everything a renderer needs, borrowed from the engine.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineView<'a> {
    pub title: &'a str,
    pub state: EngineState,
    pub step_id: &'a str,
    pub situation: &'a str,
    pub context: Option<&'a str>,
    /// Options of the current step. Scores and correctness stay hidden until
    /// a choice is confirmed.
    pub options: Vec<OptionView<'a>>,
    pub selected_option_id: Option<&'a str>,
    /// The confirmed option's consequence, while it is on screen.
    pub revealed: Option<RevealedConsequence<'a>>,
    pub total_score: i64,
    pub path: &'a [PathEntry],
    pub verdict: Option<Verdict>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView<'a> {
    pub id: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealedConsequence<'a> {
    pub option_id: &'a str,
    pub consequence: &'a str,
    pub is_correct: bool,
    pub score: i64,
    /// No further step follows this choice.
    pub ends_scenario: bool,
}

impl EngineView<'_> {
    pub fn is_finished(&self) -> bool {
        self.state == EngineState::Finished
    }
}
