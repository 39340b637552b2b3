//! The template parser seam.

use std::path::Path;

use jadec_ir::Template;
use jadec_parser::JadeParser;

/// Turns template source into IR.
///
/// `base_dir` is the directory relative includes and layouts resolve
/// against. Implementations must not depend on the process working
/// directory.
pub trait TemplateParser {
    fn parse(&self, name: &str, source: &str, base_dir: &Path) -> jadec_parser::Result<Template>;
}

impl TemplateParser for JadeParser {
    fn parse(&self, name: &str, source: &str, base_dir: &Path) -> jadec_parser::Result<Template> {
        JadeParser::parse(self, name, source, base_dir)
    }
}
