//! Generate command report data structures.

use std::path::PathBuf;

use jadec_codegen::{Error, GeneratedUnit};
use serde::Serialize;

use super::output::{Output, Report};

/// Why a run stopped, in a printable form.
#[derive(Debug, Clone, Serialize)]
pub struct FailureSummary {
    /// Failing stage (`input`, `parse`, `syntax`, `transform`, `output`).
    pub stage: &'static str,
    pub template: PathBuf,
    pub message: String,
    pub diagnostics: Vec<String>,
}

impl FailureSummary {
    pub fn from_error(err: &Error) -> Self {
        let diagnostics = match err {
            Error::Transform { diagnostics, .. } => diagnostics
                .iter()
                .filter(|d| d.severity.is_error())
                .map(ToString::to_string)
                .collect(),
            Error::Syntax {
                location, message, ..
            } => vec![format!("error: {message} (at {location})")],
            Error::Parse { source, .. } => vec![format!("error: {source}")],
            Error::Input { .. } | Error::Output { .. } => Vec::new(),
        };

        Self {
            stage: err.stage(),
            template: err.path().clone(),
            message: err.to_string(),
            diagnostics,
        }
    }
}

/// Report data from a generate run.
#[derive(Debug, Serialize)]
pub struct GenerateReport {
    pub module: String,
    pub out_dir: PathBuf,
    pub dry_run: bool,
    pub generated: Vec<GeneratedUnit>,
    /// Templates that rendered nothing.
    pub skipped: Vec<PathBuf>,
    pub support: Option<PathBuf>,
    /// Where phase snapshots went, with `--visualize`.
    pub debug_dir: Option<PathBuf>,
    pub failure: Option<FailureSummary>,
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        if !self.generated.is_empty() {
            out.section("Generated");
            for unit in &self.generated {
                out.added_item(&format!(
                    "{} -> {}",
                    unit.template.display(),
                    unit.output.display()
                ));
            }
        }

        if !self.skipped.is_empty() {
            out.section("Skipped (empty output)");
            for path in &self.skipped {
                out.list_item(&path.display().to_string());
            }
        }

        if let Some(support) = &self.support {
            out.key_value("Support file", &support.display().to_string());
        }
        if let Some(dir) = &self.debug_dir {
            out.key_value("Snapshots", &dir.display().to_string());
        }

        // The failure itself is printed by the caller.
        if self.failure.is_none() {
            out.newline();
            let count = self.generated.len();
            out.preformatted(&format!(
                "✓ {} template{} compiled into module `{}`",
                count,
                if count == 1 { "" } else { "s" },
                self.module
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use jadec_codegen::pipeline::Diagnostic;

    use super::*;
    use crate::reports::output::RecordingOutput;

    fn report() -> GenerateReport {
        GenerateReport {
            module: "views".into(),
            out_dir: "out".into(),
            dry_run: false,
            generated: vec![GeneratedUnit {
                template: "views/index.jade".into(),
                ident: "index".into(),
                output: "out/index.rs".into(),
            }],
            skipped: vec!["views/empty.jade".into()],
            support: Some("out/jade.rs".into()),
            debug_dir: None,
            failure: None,
        }
    }

    #[test]
    fn test_render_success() {
        let mut out = RecordingOutput::default();
        report().render(&mut out);

        assert_eq!(
            out.lines,
            vec![
                "Generated:",
                "  + views/index.jade -> out/index.rs",
                "Skipped (empty output):",
                "  - views/empty.jade",
                "Support file: out/jade.rs",
                "",
                "✓ 1 template compiled into module `views`",
            ]
        );
    }

    #[test]
    fn test_failure_summary_lists_errors() {
        let err = Error::Transform {
            path: "views/page.jade".into(),
            diagnostics: vec![
                Diagnostic::error("typecheck", "undeclared identifier `x`").at("4:9"),
                Diagnostic::warning("collapse", "ignored"),
            ],
        };
        let summary = FailureSummary::from_error(&err);

        assert_eq!(summary.stage, "transform");
        assert_eq!(summary.template, PathBuf::from("views/page.jade"));
        assert_eq!(
            summary.diagnostics,
            vec!["error: undeclared identifier `x` (at 4:9)"]
        );
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(report()).unwrap();
        assert_eq!(value["module"], "views");
        assert_eq!(value["generated"][0]["ident"], "index");
        assert!(value["failure"].is_null());
    }
}
