//! The `scenario-solver validate` command.

use std::path::PathBuf;

use anyhow::Result;

use scenario_core::parser;

pub fn execute(scenario_path: PathBuf) -> Result<()> {
    let loaded = if scenario_path.is_dir() {
        parser::load_scenario_directory(&scenario_path)?
    } else {
        let result = parser::parse_scenario(&scenario_path);
        vec![(scenario_path, result)]
    };

    let mut invalid = 0usize;
    let mut total_warnings = 0usize;

    for (path, result) in &loaded {
        match result {
            Ok(scenario) => {
                println!(
                    "Scenario: {} ({} steps)",
                    scenario.title(),
                    scenario.step_count()
                );
                for step in scenario.unreachable_steps() {
                    println!("  [{}] WARNING: step is unreachable", step.id);
                    total_warnings += 1;
                }
            }
            Err(e) => {
                eprintln!("{}: {e:#}", path.display());
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{invalid} invalid scenario(s)");
    }

    if total_warnings == 0 {
        println!("All scenarios valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
