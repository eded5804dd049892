//! The decision engine: one learner's walk through a scenario graph.
//!
//! ```text
//! AwaitingSelection --select--> Selected --confirm--> ConsequenceShown
//!        ^                  (select again)                  |
//!        |                                               advance
//!        +------------- next step exists <------------------+
//!                                                           |
//!                               terminal option --> Finished (verdict emitted once)
//! ```
//!
//! Every transition either succeeds and returns the events it emitted, or
//! fails with an [`EngineError`] and leaves the engine untouched.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Action, EngineError};
use crate::graph::Scenario;
use crate::model::{ResponseOption, Step};
use crate::path::{PathEntry, PathRecorder};
use crate::scoring::{ResultClassifier, Verdict};
use crate::view::{EngineView, OptionView, RevealedConsequence};

/// Where the engine is in the select → confirm → advance cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Waiting for the learner to pick an option at the current step.
    AwaitingSelection,
    /// An option is picked but not yet confirmed; it may still change.
    Selected,
    /// The choice is confirmed and its consequence is on screen.
    ConsequenceShown,
    /// A terminal option was confirmed and the verdict has been emitted.
    Finished,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::AwaitingSelection => write!(f, "awaiting selection"),
            EngineState::Selected => write!(f, "selected"),
            EngineState::ConsequenceShown => write!(f, "consequence shown"),
            EngineState::Finished => write!(f, "finished"),
        }
    }
}

/// Something that happened as the result of a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    OptionSelected {
        step_id: String,
        option_id: String,
    },
    ChoiceConfirmed {
        step_id: String,
        option_id: String,
        score: i64,
        total_score: i64,
    },
    StepEntered {
        step_id: String,
    },
    Completed(Verdict),
}

/// Receiver of the single terminal result of an attempt.
///
/// Closures taking `&Verdict` implement this trait.
pub trait CompletionSink {
    fn on_complete(&self, verdict: &Verdict);
}

impl<F: Fn(&Verdict)> CompletionSink for F {
    fn on_complete(&self, verdict: &Verdict) {
        self(verdict)
    }
}

/// Sink that discards the result; callers read it from the events instead.
pub struct NoopSink;

impl CompletionSink for NoopSink {
    fn on_complete(&self, _: &Verdict) {}
}

/// State machine for one attempt at a [`Scenario`].
pub struct DecisionEngine {
    scenario: Arc<Scenario>,
    classifier: ResultClassifier,
    sink: Box<dyn CompletionSink>,
    state: EngineState,
    current: usize,
    selected: Option<usize>,
    path: PathRecorder,
    verdict: Option<Verdict>,
}

impl fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("scenario", &self.scenario.title())
            .field("classifier", &self.classifier)
            .field("state", &self.state)
            .field("current", &self.current_step().id)
            .field("selected", &self.selected)
            .field("path", &self.path)
            .field("verdict", &self.verdict)
            .finish()
    }
}

impl DecisionEngine {
    /// Start an attempt at the scenario's start step.
    ///
    /// Uses the scenario's own pass ratio, or the default of 0.7.
    pub fn new(scenario: Arc<Scenario>) -> Self {
        let classifier = scenario
            .pass_ratio()
            .and_then(|ratio| ResultClassifier::new(ratio).ok())
            .unwrap_or_default();
        let current = scenario.start_index();
        Self {
            scenario,
            classifier,
            sink: Box::new(NoopSink),
            state: EngineState::AwaitingSelection,
            current,
            selected: None,
            path: PathRecorder::new(),
            verdict: None,
        }
    }

    /// Replace the classifier used when the attempt finishes.
    pub fn with_classifier(mut self, classifier: ResultClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Register the receiver of the terminal result.
    pub fn with_sink(mut self, sink: impl CompletionSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn scenario(&self) -> &Arc<Scenario> {
        &self.scenario
    }

    pub fn classifier(&self) -> &ResultClassifier {
        &self.classifier
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == EngineState::Finished
    }

    pub fn current_step(&self) -> &Step {
        self.scenario.step(self.current)
    }

    /// The option currently selected (or confirmed) at the current step.
    pub fn selected_option(&self) -> Option<&ResponseOption> {
        self.selected.map(|i| &self.current_step().options[i])
    }

    /// Always equal to the sum of scores on the recorded path.
    pub fn total_score(&self) -> i64 {
        self.path.total_score()
    }

    pub fn path(&self) -> &[PathEntry] {
        self.path.entries()
    }

    /// The verdict, once the attempt has finished.
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// Pick an option at the current step. Picking again before confirming
    /// replaces the earlier pick.
    pub fn select_option(&mut self, option_id: &str) -> Result<Vec<EngineEvent>, EngineError> {
        match self.state {
            EngineState::AwaitingSelection | EngineState::Selected => {}
            EngineState::ConsequenceShown => {
                return Err(EngineError::AlreadyConfirmed(self.current_step().id.clone()))
            }
            EngineState::Finished => return Err(EngineError::AttemptFinished(Action::Select)),
        }

        let step = self.current_step();
        let Some(index) = step.options.iter().position(|o| o.id == option_id) else {
            tracing::debug!(step = %step.id, option = option_id, "rejected unknown option");
            return Err(EngineError::InvalidSelection {
                step_id: step.id.clone(),
                option_id: option_id.to_string(),
            });
        };
        let step_id = step.id.clone();

        self.selected = Some(index);
        self.state = EngineState::Selected;
        tracing::debug!(step = %step_id, option = option_id, "option selected");

        Ok(vec![EngineEvent::OptionSelected {
            step_id,
            option_id: option_id.to_string(),
        }])
    }

    /// Commit the selected option: record it on the path and reveal its
    /// consequence. This is the only transition that changes the score.
    pub fn confirm_choice(&mut self) -> Result<Vec<EngineEvent>, EngineError> {
        match self.state {
            EngineState::Selected => {}
            EngineState::AwaitingSelection => return Err(EngineError::NothingSelected),
            EngineState::ConsequenceShown => {
                return Err(EngineError::AlreadyConfirmed(self.current_step().id.clone()))
            }
            EngineState::Finished => return Err(EngineError::AttemptFinished(Action::Confirm)),
        }
        let Some(index) = self.selected else {
            return Err(EngineError::NothingSelected);
        };

        let step = self.current_step();
        let option = &step.options[index];
        let entry = PathEntry {
            step_id: step.id.clone(),
            option_id: option.id.clone(),
            score: option.score,
        };

        self.path.record(entry.clone());
        self.state = EngineState::ConsequenceShown;
        let total_score = self.total_score();
        tracing::debug!(
            step = %entry.step_id,
            option = %entry.option_id,
            score = entry.score,
            total_score,
            "choice confirmed"
        );

        Ok(vec![EngineEvent::ChoiceConfirmed {
            step_id: entry.step_id,
            option_id: entry.option_id,
            score: entry.score,
            total_score,
        }])
    }

    /// Leave the consequence screen: move to the next step, or finish the
    /// attempt if the confirmed option has no successor.
    pub fn advance(&mut self) -> Result<Vec<EngineEvent>, EngineError> {
        match self.state {
            EngineState::ConsequenceShown => {}
            EngineState::AwaitingSelection | EngineState::Selected => {
                return Err(EngineError::NotConfirmed)
            }
            EngineState::Finished => return Err(EngineError::AttemptFinished(Action::Advance)),
        }
        let Some(index) = self.selected else {
            return Err(EngineError::NotConfirmed);
        };

        match self.scenario.next_index(self.current, index) {
            Some(next) => {
                self.current = next;
                self.selected = None;
                self.state = EngineState::AwaitingSelection;
                let step_id = self.current_step().id.clone();
                tracing::debug!(step = %step_id, "entered step");
                Ok(vec![EngineEvent::StepEntered { step_id }])
            }
            None => {
                let verdict = self
                    .classifier
                    .classify(self.total_score(), self.scenario.perfect_score());
                self.state = EngineState::Finished;
                self.verdict = Some(verdict);
                tracing::info!(
                    scenario = %self.scenario.title(),
                    passed = verdict.passed,
                    total_score = verdict.total_score,
                    perfect_score = verdict.perfect_score,
                    decisions = self.path.len(),
                    "attempt finished"
                );
                self.sink.on_complete(&verdict);
                Ok(vec![EngineEvent::Completed(verdict)])
            }
        }
    }

    /// Select, confirm and advance in one go.
    pub fn choose(&mut self, option_id: &str) -> Result<Vec<EngineEvent>, EngineError> {
        let mut events = self.select_option(option_id)?;
        events.extend(self.confirm_choice()?);
        events.extend(self.advance()?);
        Ok(events)
    }

    /// Start a fresh attempt on the same scenario. The sink and classifier are
    /// kept; the terminal result can be emitted again for the new attempt.
    pub fn reset(&mut self) {
        self.state = EngineState::AwaitingSelection;
        self.current = self.scenario.start_index();
        self.selected = None;
        self.path.clear();
        self.verdict = None;
    }

    /// Snapshot of the current state for rendering.
    pub fn view(&self) -> EngineView<'_> {
        let step = self.current_step();
        let selected = self.selected.map(|i| &step.options[i]);

        let revealed = match self.state {
            EngineState::ConsequenceShown | EngineState::Finished => {
                selected.map(|option| RevealedConsequence {
                    option_id: &option.id,
                    consequence: &option.consequence,
                    is_correct: option.is_correct,
                    score: option.score,
                    ends_scenario: option.next_step_id.is_none(),
                })
            }
            EngineState::AwaitingSelection | EngineState::Selected => None,
        };

        EngineView {
            title: self.scenario.title(),
            state: self.state,
            step_id: &step.id,
            situation: &step.situation,
            context: step.context.as_deref(),
            options: step
                .options
                .iter()
                .map(|o| OptionView {
                    id: &o.id,
                    text: &o.text,
                })
                .collect(),
            selected_option_id: selected.map(|o| o.id.as_str()),
            revealed,
            total_score: self.total_score(),
            path: self.path.entries(),
            verdict: self.verdict,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::graph::fixtures;

    fn engine(graph: crate::model::ScenarioGraph) -> DecisionEngine {
        DecisionEngine::new(Arc::new(Scenario::new(graph).unwrap()))
    }

    fn recording_engine(
        graph: crate::model::ScenarioGraph,
    ) -> (DecisionEngine, Rc<RefCell<Vec<Verdict>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let engine = engine(graph).with_sink(move |v: &Verdict| sink.borrow_mut().push(*v));
        (engine, seen)
    }

    #[test]
    fn starts_awaiting_selection() {
        let engine = engine(fixtures::two_steps());
        assert_eq!(engine.state(), EngineState::AwaitingSelection);
        assert_eq!(engine.current_step().id, "a");
        assert_eq!(engine.total_score(), 0);
        assert!(engine.path().is_empty());
        assert!(engine.selected_option().is_none());
        assert!(engine.verdict().is_none());
    }

    #[test]
    fn single_step_best_option_passes() {
        let (mut engine, seen) = recording_engine(fixtures::single_step());
        engine.select_option("best").unwrap();
        engine.confirm_choice().unwrap();
        let events = engine.advance().unwrap();

        let expected = Verdict {
            passed: true,
            total_score: 20,
            perfect_score: 20,
        };
        assert_eq!(events, vec![EngineEvent::Completed(expected)]);
        assert_eq!(engine.verdict(), Some(expected));
        assert_eq!(*seen.borrow(), vec![expected]);
        assert!(engine.is_finished());
    }

    #[test]
    fn single_step_penalty_fails() {
        let (mut engine, seen) = recording_engine(fixtures::single_step());
        engine.choose("bad").unwrap();
        let verdict = seen.borrow()[0];
        assert!(!verdict.passed);
        assert_eq!(verdict.total_score, -20);
    }

    #[test]
    fn two_step_walk_records_path() {
        let mut engine = engine(fixtures::two_steps());
        engine.select_option("a1").unwrap();
        engine.confirm_choice().unwrap();
        let events = engine.advance().unwrap();
        assert_eq!(
            events,
            vec![EngineEvent::StepEntered {
                step_id: "b".into()
            }]
        );
        assert_eq!(engine.state(), EngineState::AwaitingSelection);
        assert!(engine.selected_option().is_none());

        engine.select_option("b1").unwrap();
        engine.confirm_choice().unwrap();
        engine.advance().unwrap();

        assert_eq!(engine.path().len(), 2);
        assert_eq!(engine.total_score(), 25);
        assert_eq!(engine.path()[0].step_id, "a");
        assert_eq!(engine.path()[1].option_id, "b1");
    }

    #[test]
    fn reselection_overwrites_before_confirm() {
        let mut engine = engine(fixtures::single_step());
        engine.select_option("bad").unwrap();
        engine.select_option("ok").unwrap();
        assert_eq!(engine.state(), EngineState::Selected);
        assert_eq!(engine.total_score(), 0);
        assert!(engine.path().is_empty());

        engine.confirm_choice().unwrap();
        assert_eq!(engine.total_score(), 10);
        assert_eq!(engine.path()[0].option_id, "ok");
    }

    #[test]
    fn unknown_option_is_rejected_without_change() {
        let mut engine = engine(fixtures::two_steps());
        engine.select_option("a1").unwrap();

        let err = engine.select_option("b1").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidSelection {
                step_id: "a".into(),
                option_id: "b1".into(),
            }
        );
        assert!(!err.is_sequencing());
        assert_eq!(engine.state(), EngineState::Selected);
        assert_eq!(engine.selected_option().map(|o| o.id.as_str()), Some("a1"));
    }

    #[test]
    fn confirm_without_selection_is_rejected() {
        let mut engine = engine(fixtures::single_step());
        let err = engine.confirm_choice().unwrap_err();
        assert_eq!(err, EngineError::NothingSelected);
        assert!(err.is_sequencing());
        assert_eq!(engine.total_score(), 0);
        assert!(engine.path().is_empty());
        assert_eq!(engine.state(), EngineState::AwaitingSelection);
    }

    #[test]
    fn double_confirm_is_rejected() {
        let mut engine = engine(fixtures::single_step());
        engine.select_option("ok").unwrap();
        engine.confirm_choice().unwrap();

        let err = engine.confirm_choice().unwrap_err();
        assert_eq!(err, EngineError::AlreadyConfirmed("a".into()));
        assert_eq!(engine.total_score(), 10);
        assert_eq!(engine.path().len(), 1);

        assert!(engine.select_option("best").is_err());
        assert_eq!(engine.path()[0].option_id, "ok");
    }

    #[test]
    fn advance_before_confirm_is_rejected() {
        let mut engine = engine(fixtures::two_steps());
        assert_eq!(engine.advance().unwrap_err(), EngineError::NotConfirmed);
        engine.select_option("a1").unwrap();
        assert_eq!(engine.advance().unwrap_err(), EngineError::NotConfirmed);
        assert_eq!(engine.current_step().id, "a");
    }

    #[test]
    fn terminal_result_emitted_exactly_once() {
        let (mut engine, seen) = recording_engine(fixtures::two_steps());
        engine.select_option("a1").unwrap();
        engine.confirm_choice().unwrap();
        assert!(seen.borrow().is_empty());
        engine.advance().unwrap();
        assert!(seen.borrow().is_empty());

        engine.select_option("b1").unwrap();
        engine.confirm_choice().unwrap();
        assert!(seen.borrow().is_empty(), "not emitted before advancing");
        engine.advance().unwrap();
        assert_eq!(seen.borrow().len(), 1);

        assert_eq!(
            engine.advance().unwrap_err(),
            EngineError::AttemptFinished(Action::Advance)
        );
        assert_eq!(
            engine.select_option("b1").unwrap_err(),
            EngineError::AttemptFinished(Action::Select)
        );
        assert_eq!(
            engine.confirm_choice().unwrap_err(),
            EngineError::AttemptFinished(Action::Confirm)
        );
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn score_matches_path_at_every_step() {
        let mut engine = engine(fixtures::branching());
        for option in ["poor", "c-recover"] {
            engine.select_option(option).unwrap();
            assert_eq!(engine.total_score(), crate::scoring::accumulate(engine.path()));
            engine.confirm_choice().unwrap();
            assert_eq!(engine.total_score(), crate::scoring::accumulate(engine.path()));
            engine.advance().unwrap();
            assert_eq!(engine.total_score(), crate::scoring::accumulate(engine.path()));
        }
        assert_eq!(engine.total_score(), 5);
    }

    #[test]
    fn replaying_the_same_calls_is_deterministic() {
        let run = || {
            let mut engine = engine(fixtures::branching());
            engine.select_option("poor").unwrap();
            engine.select_option("good").unwrap();
            engine.confirm_choice().unwrap();
            engine.advance().unwrap();
            engine.choose("b-weak").unwrap();
            (engine.verdict(), engine.path().to_vec())
        };
        let first = run();
        let second = run();
        assert_eq!(first, second);
        assert_eq!(first.0.map(|v| v.total_score), Some(25));
        assert_eq!(first.0.map(|v| v.passed), Some(false));
    }

    #[test]
    fn reset_starts_a_new_attempt() {
        let (mut engine, seen) = recording_engine(fixtures::two_steps());
        engine.choose("a1").unwrap();
        engine.choose("b1").unwrap();
        assert!(engine.is_finished());

        engine.reset();
        assert_eq!(engine.state(), EngineState::AwaitingSelection);
        assert_eq!(engine.current_step().id, "a");
        assert!(engine.path().is_empty());
        assert_eq!(engine.total_score(), 0);
        assert!(engine.verdict().is_none());

        engine.choose("a1").unwrap();
        engine.choose("b1").unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn scenario_pass_ratio_is_used() {
        let mut graph = fixtures::single_step();
        graph.pass_ratio = Some(0.4);
        let mut engine = engine(graph);
        engine.choose("ok").unwrap();
        assert_eq!(engine.verdict().map(|v| v.passed), Some(true));
    }

    #[test]
    fn explicit_classifier_overrides() {
        let mut engine = engine(fixtures::single_step())
            .with_classifier(ResultClassifier::new(1.0).unwrap());
        engine.choose("ok").unwrap();
        assert_eq!(engine.verdict().map(|v| v.passed), Some(false));
    }

    #[test]
    fn view_tracks_each_phase() {
        let mut engine = engine(fixtures::two_steps());

        let view = engine.view();
        assert_eq!(view.step_id, "a");
        assert_eq!(view.situation, "situation a");
        assert_eq!(view.options.len(), 1);
        assert!(view.revealed.is_none());
        assert!(view.selected_option_id.is_none());

        engine.select_option("a1").unwrap();
        let view = engine.view();
        assert_eq!(view.selected_option_id, Some("a1"));
        assert!(view.revealed.is_none());

        engine.confirm_choice().unwrap();
        let view = engine.view();
        let revealed = view.revealed.as_ref().unwrap();
        assert_eq!(revealed.consequence, "consequence of a1");
        assert_eq!(revealed.score, 10);
        assert!(!revealed.ends_scenario);
        assert_eq!(view.total_score, 10);
        assert_eq!(view.path.len(), 1);

        engine.advance().unwrap();
        engine.choose("b1").unwrap();
        let view = engine.view();
        assert!(view.is_finished());
        assert!(view.revealed.as_ref().unwrap().ends_scenario);
        assert_eq!(view.verdict.map(|v| v.total_score), Some(25));
    }

    #[test]
    fn view_is_side_effect_free() {
        let mut engine = engine(fixtures::single_step());
        engine.select_option("ok").unwrap();
        let before = format!("{engine:?}");
        let _ = engine.view();
        let _ = engine.view();
        assert_eq!(format!("{engine:?}"), before);
    }

    /// Every sequence of option ids that takes the scenario from start to
    /// finish.
    fn all_routes(scenario: &Scenario) -> Vec<Vec<String>> {
        fn walk(
            scenario: &Scenario,
            step: usize,
            prefix: &mut Vec<String>,
            out: &mut Vec<Vec<String>>,
        ) {
            for (i, option) in scenario.step(step).options.iter().enumerate() {
                prefix.push(option.id.clone());
                match scenario.next_index(step, i) {
                    Some(next) => walk(scenario, next, prefix, out),
                    None => out.push(prefix.clone()),
                }
                prefix.pop();
            }
        }

        let mut out = Vec::new();
        walk(scenario, scenario.start_index(), &mut Vec::new(), &mut out);
        out
    }

    fn assert_each_step_recorded_once(scenario: Scenario) {
        let scenario = Arc::new(scenario);
        let routes = all_routes(&scenario);
        assert!(!routes.is_empty());

        for route in routes {
            let mut engine = DecisionEngine::new(Arc::clone(&scenario));
            for option_id in &route {
                engine.choose(option_id).unwrap();
            }
            assert!(engine.is_finished(), "route {route:?} did not finish");

            let steps: Vec<&str> = engine.path().iter().map(|e| e.step_id.as_str()).collect();
            let unique: std::collections::HashSet<&str> = steps.iter().copied().collect();
            assert_eq!(
                unique.len(),
                steps.len(),
                "route {route:?} revisited a step: {steps:?}"
            );
        }
    }

    #[test]
    fn every_route_records_each_step_at_most_once() {
        assert_each_step_recorded_once(Scenario::new(fixtures::branching()).unwrap());

        let sample = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../scenarios/team-conflict.toml");
        assert_each_step_recorded_once(crate::parser::parse_scenario(&sample).unwrap());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = EngineEvent::StepEntered {
            step_id: "b".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"step_entered","step_id":"b"}"#);
    }
}
