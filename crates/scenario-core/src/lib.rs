//! scenario-core - Branching scenario decision engine.
//!
//! This crate defines the scenario graph model, its load-time validation, the
//! select → confirm → advance state machine that walks a learner through it,
//! and the scoring that classifies the finished attempt.

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod model;
pub mod parser;
pub mod path;
pub mod replay;
pub mod report;
pub mod scoring;
pub mod view;

pub use engine::{CompletionSink, DecisionEngine, EngineEvent, EngineState};
pub use error::{ConfigurationError, EngineError};
pub use graph::Scenario;
pub use model::{ResponseOption, ScenarioGraph, Step};
pub use scoring::{ResultClassifier, Verdict};
