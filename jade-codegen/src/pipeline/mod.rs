//! Transform pipeline for generated render functions.
//!
//! A [`Pipeline`] takes the text a layout produced, parses it, merges
//! literal writes, checks template expressions and rejects unresolved
//! blocks and mixins. Problems are collected as [`Diagnostic`]s in the
//! [`CompilationContext`]; [`Plugin`]s observe each phase.
//!
//! # Example
//!
//! ```ignore
//! use jadec_codegen::pipeline::{CompilationContext, Pipeline, SourceUnit};
//!
//! let mut ctx = CompilationContext::new(SourceUnit::new(path, "index", text), "INDEX");
//! Pipeline::new().run(&mut ctx)?;
//!
//! let file = ctx.take_file();
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;
mod snapshot;
mod trace;

pub use context::{CompilationContext, SourceUnit};
pub use diagnostic::{Diagnostic, Severity};
pub use phase::Phase;
pub use plugin::Plugin;
pub use runner::Pipeline;
pub use snapshot::{PhaseSnapshot, SnapshotPlugin};
pub use trace::TracePlugin;
