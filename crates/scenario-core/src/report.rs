//! Per-attempt review record with JSON persistence.
//!
//! The engine itself stores nothing; an [`AttemptReport`] is built from a
//! finished engine and handed to whoever decides to keep it.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::DecisionEngine;
use crate::scoring::Verdict;

/// Everything needed to review one finished attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptReport {
    /// Unique attempt identifier.
    pub id: Uuid,
    /// When the attempt finished.
    pub created_at: DateTime<Utc>,
    /// Which scenario was played.
    pub scenario: ScenarioSummary,
    /// Confirmed decisions, in the order they were made.
    pub decisions: Vec<DecisionRecord>,
    /// Final classification.
    pub verdict: Verdict,
    /// Ratio the verdict was computed with.
    pub pass_ratio: f64,
}

/// Summary of a scenario (without its steps).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub title: String,
    pub start_step_id: String,
    pub step_count: usize,
}

/// One path entry joined with the authored text it refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub step_id: String,
    pub situation: String,
    pub option_id: String,
    pub option_text: String,
    pub consequence: String,
    pub is_correct: bool,
    pub score: i64,
    /// Total after this decision.
    pub running_total: i64,
}

impl AttemptReport {
    /// Build the review record of a finished attempt. Returns `None` while
    /// the attempt is still in progress.
    pub fn from_engine(engine: &DecisionEngine) -> Option<Self> {
        let verdict = engine.verdict()?;
        let scenario = engine.scenario();

        let mut running_total = 0;
        let mut decisions = Vec::with_capacity(engine.path().len());
        for entry in engine.path() {
            let step = scenario.find_step(&entry.step_id)?;
            let option = step.option(&entry.option_id)?;
            running_total += entry.score;
            decisions.push(DecisionRecord {
                step_id: step.id.clone(),
                situation: step.situation.clone(),
                option_id: option.id.clone(),
                option_text: option.text.clone(),
                consequence: option.consequence.clone(),
                is_correct: option.is_correct,
                score: entry.score,
                running_total,
            });
        }

        Some(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            scenario: ScenarioSummary {
                title: scenario.title().to_string(),
                start_step_id: scenario.graph().start_step_id.clone(),
                step_count: scenario.step_count(),
            },
            decisions,
            verdict,
            pass_ratio: engine.classifier().pass_ratio(),
        })
    }

    /// Number of decisions the author marked as correct.
    pub fn correct_decisions(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_correct).count()
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown for post-attempt review.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.scenario.title));
        md.push_str(&format!(
            "**Result:** {} with {} / {} (pass mark {:.0}%)\n\n",
            if self.verdict.passed { "passed" } else { "failed" },
            self.verdict.total_score,
            self.verdict.perfect_score,
            self.pass_ratio * 100.0
        ));

        md.push_str("| # | Situation | Response | Correct | Score | Total |\n");
        md.push_str("|---|-----------|----------|---------|-------|-------|\n");
        for (i, d) in self.decisions.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {:+} | {} |\n",
                i + 1,
                d.situation,
                d.option_text,
                if d.is_correct { "yes" } else { "no" },
                d.score,
                d.running_total
            ));
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::graph::{fixtures, Scenario};

    fn finished_engine() -> DecisionEngine {
        let scenario = Arc::new(Scenario::new(fixtures::branching()).unwrap());
        let mut engine = DecisionEngine::new(scenario);
        engine.choose("good").unwrap();
        engine.choose("b-best").unwrap();
        engine
    }

    #[test]
    fn unfinished_attempt_has_no_report() {
        let scenario = Arc::new(Scenario::new(fixtures::branching()).unwrap());
        let mut engine = DecisionEngine::new(scenario);
        assert!(AttemptReport::from_engine(&engine).is_none());
        engine.choose("good").unwrap();
        assert!(AttemptReport::from_engine(&engine).is_none());
    }

    #[test]
    fn report_joins_path_with_content() {
        let report = AttemptReport::from_engine(&finished_engine()).unwrap();
        assert_eq!(report.decisions.len(), 2);
        assert_eq!(report.decisions[0].situation, "situation a");
        assert_eq!(report.decisions[1].option_text, "response b-best");
        assert_eq!(report.decisions[1].running_total, 40);
        assert_eq!(report.verdict.total_score, 40);
        assert!(report.verdict.passed);
        assert_eq!(report.correct_decisions(), 2);
        assert_eq!(report.scenario.step_count, 3);
        assert_eq!(report.pass_ratio, 0.7);
    }

    #[test]
    fn json_roundtrip() {
        let report = AttemptReport::from_engine(&finished_engine()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempts").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = AttemptReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.decisions.len(), 2);
        assert_eq!(loaded.verdict, report.verdict);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AttemptReport::load_json(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn markdown_output() {
        let md = AttemptReport::from_engine(&finished_engine())
            .unwrap()
            .to_markdown();
        assert!(md.contains("## Test scenario"));
        assert!(md.contains("passed with 40 / 40"));
        assert!(md.contains("| 1 | situation a | response good | yes | +20 | 20 |"));
    }
}
