//! Phase snapshots for `--visualize`.
//!
//! After every phase the generated source, the template IR and the
//! diagnostics so far are written to `<dir>/<ident>/<phase>.json`, so the
//! effect of each phase on a template can be diffed.

use std::{fs, path::PathBuf};

use eyre::{Result, WrapErr};
use jadec_ir::Template;
use serde::Serialize;

use super::{CompilationContext, Diagnostic, Plugin};

/// State of one unit after one phase.
#[derive(Debug, Serialize)]
pub struct PhaseSnapshot<'a> {
    pub phase: &'a str,
    pub ident: &'a str,
    /// Pretty printed once the source parses, the raw layout text before.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ir: Option<&'a Template>,
    pub diagnostics: &'a [Diagnostic],
}

impl<'a> PhaseSnapshot<'a> {
    pub fn capture(phase: &'a str, ctx: &'a CompilationContext) -> Self {
        let source = match &ctx.unit.file {
            Some(file) => prettyplease::unparse(file),
            None => ctx.unit.text.clone(),
        };
        Self {
            phase,
            ident: &ctx.unit.ident,
            source,
            ir: ctx.template.as_ref(),
            diagnostics: &ctx.diagnostics,
        }
    }
}

/// Writes a [`PhaseSnapshot`] after every phase.
pub struct SnapshotPlugin {
    dir: PathBuf,
}

impl SnapshotPlugin {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Plugin for SnapshotPlugin {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn after_phase(&self, phase: &str, ctx: &CompilationContext) -> Result<()> {
        let snapshot = PhaseSnapshot::capture(phase, ctx);
        let dir = self.dir.join(snapshot.ident);
        fs::create_dir_all(&dir)
            .wrap_err_with(|| format!("failed to create snapshot directory '{}'", dir.display()))?;

        let path = dir.join(format!("{phase}.json"));
        fs::write(&path, serde_json::to_string_pretty(&snapshot)?)
            .wrap_err_with(|| format!("failed to write snapshot '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Pipeline, SourceUnit};

    fn read(path: PathBuf) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_snapshots_written_per_phase() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut ctx = CompilationContext::new(
            SourceUnit::new("index.jade", "index", "pub fn index() {}"),
            "INDEX",
        );

        Pipeline::new()
            .plugin(SnapshotPlugin::new(dir.path()))
            .run(&mut ctx)
            .unwrap();

        for phase in ["parse", "collapse", "typecheck", "unresolved"] {
            let json = read(dir.path().join("index").join(format!("{phase}.json")));
            assert_eq!(json["phase"], phase);
            assert_eq!(json["ident"], "index");
            assert!(json.get("ir").is_none());
        }
    }

    #[test]
    fn test_failing_phase_is_captured() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut ctx = CompilationContext::new(
            SourceUnit::new("index.jade", "index", "pub fn index( {"),
            "INDEX",
        );

        let result = Pipeline::new()
            .plugin(SnapshotPlugin::new(dir.path()))
            .run(&mut ctx);
        assert!(result.is_err());

        let json = read(dir.path().join("index/parse.json"));
        assert_eq!(json["source"], "pub fn index( {");
        assert_eq!(json["diagnostics"][0]["phase"], "parse");
        assert!(!dir.path().join("index/collapse.json").exists());
    }
}
