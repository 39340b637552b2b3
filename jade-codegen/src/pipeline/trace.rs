//! Logging of pipeline progress.

use eyre::Result;

use super::{CompilationContext, Plugin};

/// Logs each phase at `trace` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracePlugin;

impl Plugin for TracePlugin {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn before_phase(&self, phase: &str, ctx: &CompilationContext) -> Result<()> {
        tracing::trace!(phase, template = %ctx.unit.path.display(), "running phase");
        Ok(())
    }

    fn after_phase(&self, phase: &str, ctx: &CompilationContext) -> Result<()> {
        tracing::trace!(
            phase,
            template = %ctx.unit.path.display(),
            errors = ctx.errors().count(),
            "phase finished"
        );
        Ok(())
    }
}
