//! Intermediate representation types for the jade template compiler.
//!
//! The parser produces a [`Template`], fully resolved: includes are spliced,
//! layouts are merged with the blocks that extend them, and mixin calls are
//! expanded in place. Anything that could not be resolved is kept as a
//! [`Node::Unresolved`] marker so that later stages can reject it.
//!
//! # Architecture
//!
//! ```text
//! .jade source → jade-parser (parsing) → jade-ir (Template) → codegen
//! ```
//!
//! Expressions, patterns and parameter lists are carried as Rust source
//! text; the IR does not interpret them.

mod node;
mod template;

pub use node::{Attr, AttrValue, Element, Node, TextPart, UnresolvedKind, is_void_element};
pub use template::Template;
