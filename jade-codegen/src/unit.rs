//! Generation of one template file.

use std::path::{Path, PathBuf};

use jadec_core::{RUST_NAMING, sanitize_identifier, template_stem, write_file};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    Error, ImportResolver, Layout, LayoutOptions, Namespace, Result, TemplateParser, WriteIn,
    pipeline::{CompilationContext, Diagnostic, Pipeline, SnapshotPlugin, SourceUnit, TracePlugin},
};

/// Settings and collaborators shared by every unit of a run.
pub struct Session<'a> {
    pub parser: &'a dyn TemplateParser,
    pub resolver: &'a dyn ImportResolver,
    pub layout: &'a LayoutOptions,
    /// Collapse literal runs inline instead of hoisting them into constants.
    pub inline: bool,
    /// Run everything but write nothing.
    pub dry_run: bool,
    /// Where phase snapshots go, when enabled.
    pub snapshot_dir: Option<&'a Path>,
}

/// What generating a unit produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UnitOutcome {
    /// The generated file was written.
    Written { output: PathBuf },
    /// The template renders nothing; no file was written.
    Skipped,
    /// Dry run: the unit compiled but was not written.
    Checked { output: PathBuf },
}

/// A template scheduled for generation.
#[derive(Debug, Clone)]
pub struct Unit {
    path: PathBuf,
    /// Directory relative references resolve against.
    dir: PathBuf,
    file_name: String,
    ident: String,
    suffix: Option<String>,
    output: PathBuf,
}

impl Unit {
    /// Name the template at `path` and claim its identifier in `names`.
    pub fn new(path: &Path, out_dir: &Path, names: &mut Namespace) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::input(path, "template path has no file name"))?
            .to_string();
        let stem = template_stem(path).unwrap_or(&file_name);

        let base = sanitize_identifier(stem);
        if base.is_empty() {
            return Err(Error::input(
                path,
                format!("`{file_name}` has no alphanumeric characters to name a function after"),
            ));
        }

        let ident = names.claim(&base);
        let suffix = ident
            .strip_prefix(base.as_str())
            .filter(|rest| !rest.is_empty())
            .map(str::to_string);

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Self {
            path: path.to_path_buf(),
            dir,
            output: out_dir.join(format!("{ident}.rs")),
            file_name,
            ident,
            suffix,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The claimed identifier, suffix included.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Disambiguation suffix, when the base name was already taken.
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Compile the template and write the generated file.
    pub fn generate(&self, session: &Session<'_>) -> Result<UnitOutcome> {
        debug!(template = %self.path.display(), ident = %self.ident, "generating");

        let source = std::fs::read_to_string(&self.path).map_err(|err| Error::read(&self.path, err))?;
        let template = session
            .parser
            .parse(&self.file_name, &source, &self.dir)
            .map_err(|source| {
                Box::new(Error::Parse {
                    path: self.path.clone(),
                    source,
                })
            })?;

        let layout = Layout::new(&self.ident, &template, session.layout);
        let mut text = String::new();
        layout.write_before(&mut text);
        let preamble = text.len();
        template.write_in(&mut text);
        if text.len() == preamble {
            debug!(template = %self.path.display(), "empty output, skipped");
            return Ok(UnitOutcome::Skipped);
        }
        layout.write_after(&mut text);

        let unit = SourceUnit::new(&self.path, &self.ident, text);
        let mut ctx = CompilationContext::new(unit, RUST_NAMING.const_prefix(&self.ident)).with_template(template);
        if !session.inline {
            ctx = ctx.hoisted();
        }

        let mut pipeline = Pipeline::new().plugin(TracePlugin);
        if let Some(dir) = session.snapshot_dir {
            pipeline = pipeline.plugin(SnapshotPlugin::new(dir));
        }
        if let Err(err) = pipeline.run(&mut ctx) {
            return Err(self.pipeline_error(&ctx, &err));
        }
        for diag in ctx.warnings() {
            warn!(template = %self.path.display(), "{diag}");
        }

        let file = ctx
            .take_file()
            .ok_or_else(|| self.transform_error(Diagnostic::error("pipeline", "no syntax tree was produced")))?;
        let formatted = session
            .resolver
            .resolve(&self.path, file)
            .map_err(|err| self.transform_error(Diagnostic::error("imports", format!("{err:#}"))))?;

        if session.dry_run {
            return Ok(UnitOutcome::Checked {
                output: self.output.clone(),
            });
        }
        write_file(&self.output, formatted.as_bytes()).map_err(|err| Error::output(&self.output, err))?;
        debug!(output = %self.output.display(), "generated");

        Ok(UnitOutcome::Written {
            output: self.output.clone(),
        })
    }

    fn pipeline_error(&self, ctx: &CompilationContext, err: &eyre::Report) -> Box<Error> {
        match ctx.errors().next() {
            Some(diag) if diag.phase == "parse" => Box::new(Error::Syntax {
                path: self.path.clone(),
                location: diag.location.clone().unwrap_or_else(|| "?".to_string()),
                message: diag.message.clone(),
            }),
            Some(_) => Box::new(Error::Transform {
                path: self.path.clone(),
                diagnostics: ctx.diagnostics.clone(),
            }),
            None => self.transform_error(Diagnostic::error("pipeline", format!("{err:#}"))),
        }
    }

    fn transform_error(&self, diagnostic: Diagnostic) -> Box<Error> {
        Box::new(Error::Transform {
            path: self.path.clone(),
            diagnostics: vec![diagnostic],
        })
    }
}
