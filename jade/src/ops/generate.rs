//! Generate operation - compile templates into render functions.

use std::path::PathBuf;

use eyre::{Context, Result};
use jadec_codegen::{DEBUG_DIR, Driver, Error, RunOptions};

use crate::reports::{FailureSummary, GenerateReport};

/// Execute the generate operation.
///
/// Returns the report together with the error that stopped the run, if any.
/// Settings that cannot be resolved are reported through `eyre`.
pub fn generate(
    options: RunOptions,
    inputs: &[PathBuf],
) -> Result<(GenerateReport, Option<Box<Error>>)> {
    let config = options
        .resolve(inputs)
        .wrap_err("Failed to resolve generate options")?;
    let mut run = Driver::new(&config).run(inputs);
    let failure = run.failure.take();

    let report = GenerateReport {
        module: config.module.clone(),
        out_dir: config.out_dir.clone(),
        dry_run: config.dry_run,
        generated: run.generated,
        skipped: run.skipped,
        support: run.support,
        debug_dir: config.visualize.then(|| config.out_dir.join(DEBUG_DIR)),
        failure: failure.as_deref().map(FailureSummary::from_error),
    };
    Ok((report, failure))
}
