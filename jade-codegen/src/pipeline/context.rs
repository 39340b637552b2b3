//! State threaded through the pipeline phases.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use jadec_ir::Template;

use super::Diagnostic;

/// The generated source of one template.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Template the source was generated from.
    pub path: PathBuf,
    /// Final (claimed) identifier of the template.
    pub ident: String,
    /// The wrapped source text as produced by the layout.
    pub text: String,
    /// Syntax tree of `text`, set by the parse phase.
    pub file: Option<syn::File>,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, ident: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ident: ident.into(),
            text: text.into(),
            file: None,
        }
    }
}

#[derive(Debug)]
pub struct CompilationContext {
    pub unit: SourceUnit,
    /// Merge literal runs in place; hoist them into constants otherwise.
    pub inline: bool,
    /// Prefix of hoisted literal constants, e.g. `INDEX`.
    pub const_prefix: String,
    /// IR the source was generated from, kept for snapshots.
    pub template: Option<Template>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    pub fn new(unit: SourceUnit, const_prefix: impl Into<String>) -> Self {
        Self {
            unit,
            inline: true,
            const_prefix: const_prefix.into(),
            template: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn hoisted(mut self) -> Self {
        self.inline = false;
        self
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_warning())
    }

    /// The parsed source, for phases that run after parsing.
    pub fn file(&self) -> Result<&syn::File> {
        let path = &self.unit.path;
        self.unit.file.as_ref().ok_or_else(|| not_parsed(path))
    }

    pub fn file_mut(&mut self) -> Result<&mut syn::File> {
        let path = &self.unit.path;
        self.unit.file.as_mut().ok_or_else(|| not_parsed(path))
    }

    /// Take the syntax tree out of the context.
    pub fn take_file(&mut self) -> Option<syn::File> {
        self.unit.file.take()
    }
}

fn not_parsed(path: &Path) -> eyre::Report {
    eyre!("source of {} has not been parsed", path.display())
}
