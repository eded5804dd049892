//! The `scenario-solver review` command.

use std::path::PathBuf;

use anyhow::Result;

use scenario_core::report::AttemptReport;

pub fn execute(report_path: PathBuf, format: String) -> Result<()> {
    let report = AttemptReport::load_json(&report_path)?;
    super::print_report(&report, &format)
}
