//! The `scenario-solver play` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use scenario_core::config::load_config_from;
use scenario_core::parser;
use scenario_core::replay::replay;
use scenario_core::report::AttemptReport;
use scenario_core::view::EngineView;
use scenario_core::{DecisionEngine, ResultClassifier, Scenario};

pub fn execute(
    scenario_path: PathBuf,
    choices: Option<String>,
    format: String,
    save: bool,
    output: Option<PathBuf>,
    fail_on_fail: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let scenario = Arc::new(parser::parse_scenario(&scenario_path)?);
    let classifier = config.classifier_for(&scenario)?;

    let report = match &choices {
        Some(script) => {
            let script: Vec<&str> = script
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            tracing::debug!(choices = script.len(), "replaying scripted attempt");
            replay(scenario, classifier, &script)?
        }
        None => play_interactive(scenario, classifier, &format)?,
    };

    super::print_report(&report, &format)?;

    if save {
        let dir = output.unwrap_or(config.output_dir);
        let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
        let path = dir.join(format!("attempt-{timestamp}-{}.json", report.id.simple()));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    if fail_on_fail && !report.verdict.passed {
        std::process::exit(1);
    }

    Ok(())
}

/// Walk the learner through the scenario on stdin. Each line names an option
/// by id or by its 1-based position. Prompts go to stderr when the report is
/// json or markdown, so stdout carries only the report.
fn play_interactive(
    scenario: Arc<Scenario>,
    classifier: ResultClassifier,
    format: &str,
) -> Result<AttemptReport> {
    let mut out: Box<dyn Write> = if matches!(format, "json" | "markdown" | "md") {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    let mut engine = DecisionEngine::new(scenario).with_classifier(classifier);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    writeln!(out, "{}", engine.scenario().title())?;
    if !engine.scenario().graph().description.is_empty() {
        writeln!(out, "{}", engine.scenario().graph().description)?;
    }

    while !engine.is_finished() {
        print_step(&mut out, &engine.view())?;
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            anyhow::bail!(
                "input ended at step '{}'; attempt abandoned",
                engine.current_step().id
            );
        };
        let line = line.context("failed to read choice")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let option_id = resolve_choice(&engine.view(), input);
        if let Err(e) = engine.select_option(&option_id) {
            writeln!(out, "  {e}")?;
            continue;
        }
        engine.confirm_choice()?;

        if let Some(revealed) = engine.view().revealed {
            writeln!(out)?;
            writeln!(out, "  {}", revealed.consequence)?;
            writeln!(out, "  ({:+} points)", revealed.score)?;
        }
        engine.advance()?;
    }
    out.flush()?;

    AttemptReport::from_engine(&engine).context("finished attempt produced no report")
}

fn print_step(out: &mut dyn Write, view: &EngineView<'_>) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[{}] {}", view.step_id, view.situation)?;
    if let Some(context) = view.context {
        writeln!(out, "  {context}")?;
    }
    for (i, option) in view.options.iter().enumerate() {
        writeln!(out, "  {}. {} ({})", i + 1, option.text, option.id)?;
    }
    Ok(())
}

/// An exact option id wins; otherwise a number picks by position. Anything
/// left over is passed through and rejected by the engine.
fn resolve_choice(view: &EngineView<'_>, input: &str) -> String {
    if view.options.iter().any(|o| o.id == input) {
        return input.to_string();
    }
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| view.options.get(i))
        .map(|o| o.id.to_string())
        .unwrap_or_else(|| input.to_string())
}
