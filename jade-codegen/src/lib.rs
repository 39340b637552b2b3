//! Rust code generation for jade templates.
//!
//! Each template becomes one `<ident>.rs` file holding a `pub fn` that
//! renders the template through the streaming runtime in `jadec-runtime`.
//!
//! # Module Organization
//!
//! - [`Driver`] - runs generation over files and directories
//! - [`Unit`] - generation of a single template file
//! - [`Layout`] - the text framing a body into a render function
//! - [`WriteIn`] - producer statements for a template body
//! - [`pipeline`] - parse, collapse, type check and unresolved checks on the generated source
//! - [`ImportResolver`] - pruning of unused imports and final formatting
//! - [`Namespace`] - identifiers handed out during a run
//!
//! # Example
//!
//! ```ignore
//! use jadec_codegen::{Driver, RunOptions};
//!
//! let inputs = vec!["views".into()];
//! let config = RunOptions::default().resolve(&inputs)?;
//! let report = Driver::new(&config).run(&inputs);
//! ```

mod body;
mod code_builder;
mod driver;
mod error;
mod imports;
mod layout;
mod namespace;
mod parser;
pub mod pipeline;
mod support;
mod unit;
mod walker;

pub use body::WriteIn;
pub use code_builder::CodeBuilder;
pub use driver::{DEBUG_DIR, Driver, GeneratedUnit, RunConfig, RunOptions, RunReport};
pub use error::{Error, Result};
pub use imports::{ImportResolver, PrettyResolver};
pub use layout::{BufferKind, Layout, LayoutOptions, RUNTIME_CRATE, SUPPORT_MODULE, WriterStyle};
pub use namespace::Namespace;
pub use parser::TemplateParser;
pub use support::SupportFile;
pub use unit::{Session, Unit, UnitOutcome};
pub use walker::{find_templates, walk_templates};
