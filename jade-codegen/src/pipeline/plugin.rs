//! Observers of pipeline progress.

use eyre::Result;

use super::CompilationContext;

/// Hooks called around every phase.
///
/// `after_phase` also runs for the phase that recorded errors, so a plugin
/// sees the state the pipeline stopped in. An `Err` from a hook aborts the
/// pipeline.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    #[allow(unused_variables)]
    fn before_phase(&self, phase: &str, ctx: &CompilationContext) -> Result<()> {
        Ok(())
    }

    #[allow(unused_variables)]
    fn after_phase(&self, phase: &str, ctx: &CompilationContext) -> Result<()> {
        Ok(())
    }
}
