//! Check command report data structures.

use std::path::PathBuf;

use serde::Serialize;

use super::{
    FailureSummary,
    output::{Output, Report},
};

/// Report data from a dry run over the templates.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Templates that compiled.
    pub checked: Vec<PathBuf>,
    /// Templates that rendered nothing.
    pub skipped: Vec<PathBuf>,
    pub failure: Option<FailureSummary>,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for path in &self.skipped {
            out.warning(&format!("warning: {} renders nothing", path.display()));
        }

        if let Some(failure) = &self.failure {
            out.warning(&format!(
                "error[{}]: {}",
                failure.stage,
                failure.template.display()
            ));
            if failure.diagnostics.is_empty() {
                out.warning(&format!("  {}", failure.message));
            }
            for diag in &failure.diagnostics {
                out.warning(&format!("  {}", diag));
            }
            return;
        }

        if !self.skipped.is_empty() {
            out.newline();
        }
        let count = self.checked.len();
        out.preformatted(&format!(
            "✓ {} template{} checked",
            count,
            if count == 1 { "" } else { "s" }
        ));
    }
}
