//! Scenario content loader.
//!
//! Loads scenarios from lesson JSON payloads (camelCase) or TOML authoring
//! files (snake_case) and validates them before returning.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::graph::Scenario;
use crate::model::{ResponseOption, ScenarioGraph, Step};

/// Intermediate TOML structure for scenario files.
#[derive(Debug, Deserialize)]
struct TomlScenarioFile {
    scenario: TomlScenarioHeader,
    #[serde(default)]
    steps: Vec<TomlStep>,
}

#[derive(Debug, Deserialize)]
struct TomlScenarioHeader {
    title: String,
    #[serde(default)]
    description: String,
    start_step_id: String,
    perfect_score: i64,
    #[serde(default)]
    pass_ratio: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TomlStep {
    id: String,
    situation: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    options: Vec<TomlOption>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: String,
    text: String,
    #[serde(default)]
    consequence: String,
    #[serde(default)]
    is_correct: bool,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    next_step_id: Option<String>,
}

/// Load and validate a single scenario file. The format follows the
/// extension: `.json` or `.toml`.
pub fn parse_scenario(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file: {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_scenario_json_str(&content, path),
        Some("toml") => parse_scenario_toml_str(&content, path),
        _ => anyhow::bail!(
            "unsupported scenario format (expected .json or .toml): {}",
            path.display()
        ),
    }
}

/// Parse a lesson JSON payload into a validated `Scenario`.
pub fn parse_scenario_json_str(content: &str, source_path: &Path) -> Result<Scenario> {
    let graph: ScenarioGraph = serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;
    validate(graph, source_path)
}

/// Parse a TOML authoring file into a validated `Scenario`.
pub fn parse_scenario_toml_str(content: &str, source_path: &Path) -> Result<Scenario> {
    let parsed: TomlScenarioFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let steps = parsed
        .steps
        .into_iter()
        .map(|s| Step {
            id: s.id,
            situation: s.situation,
            context: s.context,
            options: s
                .options
                .into_iter()
                .map(|o| ResponseOption {
                    id: o.id,
                    text: o.text,
                    consequence: o.consequence,
                    is_correct: o.is_correct,
                    score: o.score,
                    next_step_id: o.next_step_id,
                })
                .collect(),
        })
        .collect();

    let graph = ScenarioGraph {
        title: parsed.scenario.title,
        description: parsed.scenario.description,
        steps,
        start_step_id: parsed.scenario.start_step_id,
        perfect_score: parsed.scenario.perfect_score,
        pass_ratio: parsed.scenario.pass_ratio,
    };
    validate(graph, source_path)
}

fn validate(graph: ScenarioGraph, source_path: &Path) -> Result<Scenario> {
    Scenario::new(graph).with_context(|| format!("invalid scenario: {}", source_path.display()))
}

/// Recursively load every `.toml` and `.json` file under `dir`.
///
/// Each file's outcome is reported separately, sorted by path, so one broken
/// scenario does not hide the others.
pub fn load_scenario_directory(dir: &Path) -> Result<Vec<(PathBuf, Result<Scenario>)>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut loaded = Vec::new();
    collect_directory(dir, &mut loaded)?;
    loaded.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(loaded)
}

fn collect_directory(dir: &Path, loaded: &mut Vec<(PathBuf, Result<Scenario>)>) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_directory(&path, loaded)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            let result = parse_scenario(&path);
            if let Err(e) = &result {
                tracing::warn!("failed to load {}: {e:#}", path.display());
            }
            loaded.push((path, result));
        }
    }
    Ok(())
}
