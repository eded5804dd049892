//! Drive an engine through a scripted list of choices.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::engine::DecisionEngine;
use crate::graph::Scenario;
use crate::report::AttemptReport;
use crate::scoring::ResultClassifier;

/// Play `choices` (option ids, one per step) against a fresh engine and
/// return the finished attempt.
///
/// Fails if a choice is not offered at the step it lands on, if the script
/// runs out before a terminal option, or if choices remain after the end.
pub fn replay<S: AsRef<str>>(
    scenario: Arc<Scenario>,
    classifier: ResultClassifier,
    choices: &[S],
) -> Result<AttemptReport> {
    let mut engine = DecisionEngine::new(scenario).with_classifier(classifier);

    for (n, choice) in choices.iter().enumerate() {
        let choice = choice.as_ref();
        if engine.is_finished() {
            anyhow::bail!(
                "scenario finished after {} choice(s); {} left over",
                n,
                choices.len() - n
            );
        }
        let step = engine.current_step().id.clone();
        engine
            .choose(choice)
            .with_context(|| format!("choice {} ('{choice}') at step '{step}'", n + 1))?;
    }

    if !engine.is_finished() {
        anyhow::bail!(
            "script ended at step '{}' before the scenario finished",
            engine.current_step().id
        );
    }

    AttemptReport::from_engine(&engine).context("finished attempt produced no report")
}
