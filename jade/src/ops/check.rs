//! Check operation - compile templates without writing anything.

use std::path::PathBuf;

use eyre::Result;
use jadec_codegen::RunOptions;

use crate::reports::CheckReport;

/// Execute the check operation.
///
/// Runs every template through the whole pipeline in dry-run mode and
/// collects the outcome.
pub fn check(options: RunOptions, inputs: &[PathBuf]) -> Result<CheckReport> {
    let options = RunOptions {
        dry_run: true,
        visualize: false,
        ..options
    };
    let (report, _) = super::generate(options, inputs)?;

    Ok(CheckReport {
        checked: report
            .generated
            .into_iter()
            .map(|unit| unit.template)
            .collect(),
        skipped: report.skipped,
        failure: report.failure,
    })
}
