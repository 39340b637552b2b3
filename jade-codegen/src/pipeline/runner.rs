//! Pipeline orchestrator.

use eyre::{Result, bail};

use super::{
    CompilationContext, Phase, Plugin,
    phases::{CollapsePhase, ParsePhase, TypeCheckPhase, UnresolvedPhase},
};

/// Runs phases over one generated source, in order, until one of them
/// records an error.
///
/// [`Pipeline::new`] holds the standard phases: parse, collapse, typecheck
/// and unresolved. Extra phases run after them.
///
/// ```ignore
/// Pipeline::new()
///     .plugin(TracePlugin)
///     .run(&mut ctx)?;
/// ```
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::empty()
            .phase(ParsePhase)
            .phase(CollapsePhase)
            .phase(TypeCheckPhase)
            .phase(UnresolvedPhase)
    }

    /// A pipeline without phases.
    pub fn empty() -> Self {
        Self {
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Names of the phases, in execution order.
    pub fn phase_names(&self) -> Vec<&'static str> {
        self.phases.iter().map(|p| p.name()).collect()
    }

    /// Run every phase on `ctx`.
    ///
    /// Fails after the first phase that recorded an error diagnostic; the
    /// diagnostics stay in the context.
    pub fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        for phase in &self.phases {
            let name = phase.name();
            let before = ctx.errors().count();

            for plugin in &self.plugins {
                plugin.before_phase(name, ctx)?;
            }
            phase.run(ctx)?;
            for plugin in &self.plugins {
                plugin.after_phase(name, ctx)?;
            }

            let added = ctx.errors().count() - before;
            if added > 0 {
                bail!(
                    "{name} reported {added} error(s) for {}",
                    ctx.unit.path.display()
                );
            }
        }
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::pipeline::{Diagnostic, SourceUnit};

    /// Records `before:<phase>` / `after:<phase>` events.
    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Plugin for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn before_phase(&self, phase: &str, _ctx: &CompilationContext) -> Result<()> {
            self.0.lock().unwrap().push(format!("before:{phase}"));
            Ok(())
        }

        fn after_phase(&self, phase: &str, _ctx: &CompilationContext) -> Result<()> {
            self.0.lock().unwrap().push(format!("after:{phase}"));
            Ok(())
        }
    }

    struct Reject;

    impl Phase for Reject {
        fn name(&self) -> &'static str {
            "reject"
        }

        fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
            ctx.push(Diagnostic::error("reject", "rejected"));
            Ok(())
        }
    }

    fn make_context(text: &str) -> CompilationContext {
        CompilationContext::new(SourceUnit::new("index.jade", "index", text), "INDEX")
    }

    #[test]
    fn test_standard_phase_order() {
        assert_eq!(
            Pipeline::new().phase_names(),
            vec!["parse", "collapse", "typecheck", "unresolved"]
        );
        assert!(Pipeline::empty().phase_names().is_empty());
    }

    #[test]
    fn test_pipeline_runs_phases() {
        let mut ctx = make_context("pub fn index(n: i64) -> i64 { n }");
        Pipeline::new().run(&mut ctx).expect("pipeline should succeed");

        assert!(ctx.unit.file.is_some());
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_hooks_wrap_each_phase() {
        let recorder = Recorder::default();
        let mut ctx = make_context("pub fn index() {}");

        Pipeline::new()
            .plugin(recorder.clone())
            .run(&mut ctx)
            .expect("pipeline should succeed");

        let events = recorder.events();
        assert_eq!(events.len(), 8);
        assert_eq!(events[0], "before:parse");
        assert_eq!(events[1], "after:parse");
        assert_eq!(events[7], "after:unresolved");
    }

    #[test]
    fn test_stops_after_failing_phase() {
        let recorder = Recorder::default();
        let mut ctx = make_context("pub fn index( {");

        let result = Pipeline::new().plugin(recorder.clone()).run(&mut ctx);

        assert!(result.is_err());
        assert_eq!(recorder.events(), vec!["before:parse", "after:parse"]);
        assert_eq!(ctx.errors().next().map(|d| d.phase.as_str()), Some("parse"));
    }

    #[test]
    fn test_extra_phase_runs_last() {
        let recorder = Recorder::default();
        let mut ctx = make_context("pub fn index() {}");

        let err = Pipeline::new()
            .phase(Reject)
            .plugin(recorder.clone())
            .run(&mut ctx)
            .unwrap_err();

        assert!(err.to_string().starts_with("reject reported 1 error(s)"));
        assert_eq!(recorder.events().last().map(String::as_str), Some("after:reject"));
    }
}
