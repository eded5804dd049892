//! The `scenario-solver init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create scenario-solver.toml
    if std::path::Path::new("scenario-solver.toml").exists() {
        println!("scenario-solver.toml already exists, skipping.");
    } else {
        std::fs::write("scenario-solver.toml", SAMPLE_CONFIG)?;
        println!("Created scenario-solver.toml");
    }

    // Create example scenario
    std::fs::create_dir_all("scenarios")?;
    let example_path = std::path::Path::new("scenarios/example.toml");
    if example_path.exists() {
        println!("scenarios/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SCENARIO)?;
        println!("Created scenarios/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: scenario-solver validate --scenario scenarios/example.toml");
    println!("  2. Run: scenario-solver play --scenario scenarios/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# scenario-solver configuration

# Fraction of a scenario's perfect score needed to pass, for scenarios that
# do not set their own pass_ratio.
default_pass_ratio = 0.7
output_dir = "./scenario-results"
"#;

const EXAMPLE_SCENARIO: &str = r#"[scenario]
title = "Missed Handover"
description = "A colleague forgot to hand over an urgent ticket before leaving."
start_step_id = "discover"
perfect_score = 40

[[steps]]
id = "discover"
situation = "A customer escalates a ticket your colleague was handling. They left for the day without a handover."

[[steps.options]]
id = "own-it"
text = "Take the ticket, tell the customer you are on it, and read the history."
consequence = "The customer appreciates a quick, clear response."
is_correct = true
score = 20
next_step_id = "follow-up"

[[steps.options]]
id = "wait"
text = "Leave it until your colleague is back tomorrow."
consequence = "The customer escalates to your manager."
score = -20

[[steps]]
id = "follow-up"
situation = "The next morning your colleague asks why you touched their ticket."

[[steps.options]]
id = "explain"
text = "Explain the escalation and agree on a handover checklist."
consequence = "You both leave with a clear process."
is_correct = true
score = 20

[[steps.options]]
id = "complain"
text = "Tell your manager the colleague is unreliable."
consequence = "Trust between you drops."
score = -10
"#;
