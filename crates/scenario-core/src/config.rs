//! Solver configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::graph::Scenario;
use crate::scoring::{validate_pass_ratio, ResultClassifier, DEFAULT_PASS_RATIO};

/// Environment variable overriding `default_pass_ratio`.
pub const PASS_RATIO_ENV: &str = "SCENARIO_SOLVER_PASS_RATIO";

/// Top-level scenario-solver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Pass ratio for scenarios that do not declare their own.
    #[serde(default = "default_pass_ratio")]
    pub default_pass_ratio: f64,
    /// Where attempt reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_pass_ratio() -> f64 {
    DEFAULT_PASS_RATIO
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./scenario-results")
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            default_pass_ratio: default_pass_ratio(),
            output_dir: default_output_dir(),
        }
    }
}

impl SolverConfig {
    /// Classifier for a scenario: its own ratio wins over the configured
    /// default.
    pub fn classifier_for(&self, scenario: &Scenario) -> Result<ResultClassifier> {
        let ratio = scenario.pass_ratio().unwrap_or(self.default_pass_ratio);
        Ok(ResultClassifier::new(ratio)?)
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `scenario-solver.toml` in the current directory
/// 2. `~/.config/scenario-solver/config.toml`
///
/// Environment variable override: `SCENARIO_SOLVER_PASS_RATIO`.
pub fn load_config_from(path: Option<&Path>) -> Result<SolverConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("scenario-solver.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SolverConfig::default(),
    };

    if let Ok(raw) = std::env::var(PASS_RATIO_ENV) {
        config.default_pass_ratio = raw
            .trim()
            .parse()
            .with_context(|| format!("{PASS_RATIO_ENV} is not a number: {raw}"))?;
    }

    validate_pass_ratio(config.default_pass_ratio)
        .context("invalid default_pass_ratio in configuration")?;

    Ok(config)
}

/// Parse a config TOML string.
pub fn parse_config_str(content: &str) -> Result<SolverConfig> {
    Ok(toml::from_str::<SolverConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("scenario-solver"))
}
