// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Parser for jade templates.
//!
//! [`JadeParser`] reads an indentation-structured template and resolves it
//! into a [`jadec_ir::Template`]: includes are spliced, `extends` chains are
//! merged with their blocks and mixin calls are expanded. Blocks that end up
//! empty and calls to mixins that were never declared are kept as
//! [`jadec_ir::Node::Unresolved`] markers.
//!
//! Relative references resolve against the directory of the file that makes
//! them; for the template itself that is the `base_dir` passed to
//! [`JadeParser::parse`]. The process working directory is never consulted.

mod ast;
mod error;
mod lines;
mod resolve;
mod scan;
mod syntax;

use std::path::Path;

pub use error::{Error, Result, SourceContext};
use jadec_ir::Template;
pub use resolve::DEFAULT_MAX_DEPTH;
use resolve::Resolver;
use tracing::debug;

/// Parser for `.jade` / `.pug` templates.
#[derive(Debug, Clone, Copy)]
pub struct JadeParser {
    max_depth: usize,
}

impl Default for JadeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JadeParser {
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit nesting of includes, layouts, blocks and mixin calls.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse `source`, named `name` in diagnostics, resolving relative
    /// references against `base_dir`.
    pub fn parse(&self, name: &str, source: &str, base_dir: &Path) -> Result<Template> {
        debug!(template = name, base_dir = %base_dir.display(), "parsing template");
        Resolver::new(self.max_depth).resolve(name, source, base_dir)
    }

    /// Read and parse a template file, resolving against its directory.
    pub fn parse_file(&self, path: &Path) -> Result<Template> {
        let source = std::fs::read_to_string(path).map_err(|source| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source,
            })
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        self.parse(&path.display().to_string(), &source, base_dir)
    }
}

/// Parse a self-contained template (no includes or layouts) from a string.
pub fn parse_str(source: &str) -> Result<Template> {
    JadeParser::new().parse("<string>", source, Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jadec_ir::{Node, TextPart};
    use tempfile::TempDir;

    #[test]
    fn test_parse_str() {
        let template = parse_str(":args colors: &[&str]\nh1 Hello\nul\n  each c in colors\n    li= c").unwrap();

        assert_eq!(template.args.as_deref(), Some("colors: &[&str]"));
        assert_eq!(template.nodes.len(), 2);
        let Node::Element(ul) = &template.nodes[1] else {
            panic!("expected ul");
        };
        assert!(matches!(&ul.children[0], Node::Each { pattern, .. } if pattern == "c"));
    }

    #[test]
    fn test_parse_file_uses_its_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("part.jade"), "p part").unwrap();
        let path = dir.path().join("page.jade");
        std::fs::write(&path, "include part").unwrap();

        let template = JadeParser::new().parse_file(&path).unwrap();
        let Node::Element(p) = &template.nodes[0] else {
            panic!("expected p");
        };
        assert_eq!(
            p.children,
            vec![Node::Text {
                parts: vec![TextPart::Literal("part".into())]
            }]
        );
    }

    #[test]
    fn test_parse_file_missing() {
        let err = JadeParser::new()
            .parse_file(Path::new("/nonexistent/page.jade"))
            .unwrap_err();
        assert!(matches!(*err, Error::Io { .. }));
    }

    #[test]
    fn test_syntax_error_is_diagnostic() {
        let err = parse_str("a(href=\"x\"").unwrap_err();
        let report = miette::Report::new(*err);
        assert!(format!("{report:?}").contains("unterminated attribute list"));
    }
}
