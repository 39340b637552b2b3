//! Built-in pipeline phases.
//!
//! This module provides the standard phases that run in every pipeline:
//!
//! - [`ParsePhase`] - parses the generated text with `syn`
//! - [`CollapsePhase`] - merges runs of literal writes
//! - [`TypeCheckPhase`] - checks template expressions against declared types
//! - [`UnresolvedPhase`] - rejects unresolved blocks and mixin calls

mod collapse;
mod parse;
mod typecheck;
mod unresolved;

pub use collapse::{CollapsePhase, collapse_file};
pub use parse::ParsePhase;
pub use typecheck::TypeCheckPhase;
pub use unresolved::{UNRESOLVED_MACRO, UnresolvedPhase};

/// Name of the pipe writer inside generated producers.
pub(crate) const WRITER: &str = "buffer";
