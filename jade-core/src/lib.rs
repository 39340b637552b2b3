//! Core utilities and types for the jade template compiler.
//!
//! This crate provides the small building blocks shared by the parser,
//! the code generator and the CLI: identifier sanitizing, Rust naming,
//! template extension handling, and deterministic file output.

mod ext;
mod file;
mod naming;
mod utils;

// Template files
pub use ext::{TEMPLATE_EXTENSIONS, is_template, template_stem};
// File operations
pub use file::{GENERATED_FILE_MODE, GeneratedFile, write_file};
// Naming
pub use naming::{RUST_NAMING, NamingConvention};
// String utilities
pub use utils::{is_rust_ident, sanitize_identifier, to_snake_case, to_upper_snake_case};
