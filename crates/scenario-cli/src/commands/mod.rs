pub mod init;
pub mod play;
pub mod review;
pub mod validate;

use anyhow::Result;
use comfy_table::{Cell, Table};

use scenario_core::report::AttemptReport;

/// Print an attempt report in the requested format.
pub fn print_report(report: &AttemptReport, format: &str) -> Result<()> {
    match format {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        _ => {
            println!("Scenario: {}", report.scenario.title);

            let mut table = Table::new();
            table.set_header(vec!["#", "Step", "Response", "Correct", "Score", "Total"]);
            for (i, d) in report.decisions.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(&d.step_id),
                    Cell::new(&d.option_text),
                    Cell::new(if d.is_correct { "yes" } else { "no" }),
                    Cell::new(format!("{:+}", d.score)),
                    Cell::new(d.running_total),
                ]);
            }
            println!("{table}");

            println!(
                "Result: {} ({} / {}, pass mark {:.0}%, {}/{} correct decisions)",
                if report.verdict.passed {
                    "PASSED"
                } else {
                    "FAILED"
                },
                report.verdict.total_score,
                report.verdict.perfect_score,
                report.pass_ratio * 100.0,
                report.correct_decisions(),
                report.decisions.len()
            );
        }
    }
    Ok(())
}
