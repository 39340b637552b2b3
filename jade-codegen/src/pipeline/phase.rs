//! Pipeline phase trait.

use eyre::Result;

use super::CompilationContext;

/// One step of the transform pipeline.
///
/// A phase records problems with the generated source as error
/// [`Diagnostic`](super::Diagnostic)s and returns `Ok`; the pipeline stops
/// after the first phase that recorded one. `Err` is reserved for a phase
/// that could not run at all.
pub trait Phase: Send + Sync {
    /// Name used in diagnostics, snapshots and plugin hooks.
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &mut CompilationContext) -> Result<()>;
}
