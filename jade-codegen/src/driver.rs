//! Orchestration of a whole generation run.

use std::path::{Path, PathBuf};

use eyre::{Result as EyreResult, WrapErr, bail};
use jadec_core::{GeneratedFile, is_rust_ident};
use jadec_parser::JadeParser;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    BufferKind, Error, ImportResolver, LayoutOptions, Namespace, PrettyResolver, Result,
    TemplateParser, Unit, UnitOutcome, WriterStyle, layout::SUPPORT_MODULE, support::SupportFile,
    unit::Session, walker::walk_templates,
};

/// Directory (under the output directory) that receives phase snapshots.
pub const DEBUG_DIR: &str = ".jade/debug";

/// Unresolved run settings, as given on the command line or in `jade.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub out_dir: Option<PathBuf>,
    pub base_dir: Option<PathBuf>,
    pub module: Option<String>,
    /// Pretty print rendered HTML.
    pub pretty: bool,
    pub inline: bool,
    pub lib: bool,
    /// `Vec<u8>` buffers; pooled buffers otherwise.
    pub std_buffer: bool,
    /// `&mut dyn Write` destinations; `&mut Buffer` otherwise.
    pub writer: bool,
    pub visualize: bool,
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            out_dir: None,
            base_dir: None,
            module: None,
            pretty: true,
            inline: true,
            lib: false,
            std_buffer: true,
            writer: true,
            visualize: false,
            dry_run: false,
        }
    }
}

impl RunOptions {
    /// Resolve defaults against the inputs of the run.
    ///
    /// Relative inputs are taken relative to the base directory (the current
    /// directory unless given). The output directory defaults to the
    /// directory holding the first input and is created when missing. The
    /// module name defaults to the output directory's name, or `jade` when
    /// that is not an identifier.
    pub fn resolve(self, inputs: &[PathBuf]) -> EyreResult<RunConfig> {
        let base_dir = match self.base_dir {
            Some(dir) => std::path::absolute(&dir)
                .wrap_err_with(|| format!("invalid base directory '{}'", dir.display()))?,
            None => std::env::current_dir().wrap_err("cannot determine the current directory")?,
        };

        let out_dir = match (self.out_dir, inputs.first()) {
            (Some(dir), _) => dir,
            (None, Some(first)) => {
                let first = base_dir.join(first);
                match first.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => PathBuf::from("."),
                }
            }
            (None, None) => bail!("no input templates given"),
        };
        std::fs::create_dir_all(&out_dir)
            .wrap_err_with(|| format!("failed to create output directory '{}'", out_dir.display()))?;
        let out_dir = std::path::absolute(&out_dir)
            .wrap_err_with(|| format!("invalid output directory '{}'", out_dir.display()))?;

        let module = self
            .module
            .or_else(|| {
                out_dir
                    .file_name()
                    .and_then(|name| name.to_str())
                    .filter(|name| is_rust_ident(name))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| SUPPORT_MODULE.to_string());

        let layout = LayoutOptions {
            buffer: if self.std_buffer {
                BufferKind::Std
            } else {
                BufferKind::Pooled
            },
            writer: if self.writer {
                WriterStyle::Writer
            } else {
                WriterStyle::Buffer
            },
            pretty: self.pretty,
            lib: self.lib,
            module: module.clone(),
        };

        Ok(RunConfig {
            out_dir,
            module,
            base_dir,
            layout,
            inline: self.inline,
            visualize: self.visualize,
            dry_run: self.dry_run,
        })
    }
}

/// Settings of one run, shared read-only by every unit.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub out_dir: PathBuf,
    pub module: String,
    pub base_dir: PathBuf,
    pub layout: LayoutOptions,
    pub inline: bool,
    pub visualize: bool,
    pub dry_run: bool,
}

impl RunConfig {
    /// An input path as seen from the base directory.
    pub fn input_path(&self, input: &Path) -> PathBuf {
        self.base_dir.join(input)
    }
}

/// A template that produced output.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedUnit {
    pub template: PathBuf,
    pub ident: String,
    pub output: PathBuf,
}

/// What a run did, up to its first failure.
#[derive(Debug, Default)]
pub struct RunReport {
    pub generated: Vec<GeneratedUnit>,
    /// Templates that rendered nothing.
    pub skipped: Vec<PathBuf>,
    /// The support file, when written.
    pub support: Option<PathBuf>,
    pub failure: Option<Box<Error>>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Convert into a `Result`, keeping the report on success.
    pub fn into_result(mut self) -> std::result::Result<Self, Box<Error>> {
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Runs generation units for a set of inputs.
pub struct Driver<'a> {
    config: &'a RunConfig,
    parser: Box<dyn TemplateParser + 'a>,
    resolver: Box<dyn ImportResolver + 'a>,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            parser: Box::new(JadeParser::new()),
            resolver: Box::new(PrettyResolver),
        }
    }

    pub fn with_parser(mut self, parser: impl TemplateParser + 'a) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn with_resolver(mut self, resolver: impl ImportResolver + 'a) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Generate every input, stopping at the first failure.
    ///
    /// Directories are walked for templates; files are generated directly.
    /// Unless in library or dry-run mode, the support file is written once
    /// after all inputs succeeded.
    pub fn run(&self, inputs: &[PathBuf]) -> RunReport {
        let config = self.config;
        debug!(
            module = %config.module,
            out_dir = %config.out_dir.display(),
            "starting run"
        );

        let snapshot_dir = config.visualize.then(|| config.out_dir.join(DEBUG_DIR));
        let session = Session {
            parser: self.parser.as_ref(),
            resolver: self.resolver.as_ref(),
            layout: &config.layout,
            inline: config.inline,
            dry_run: config.dry_run,
            snapshot_dir: snapshot_dir.as_deref(),
        };

        let mut names = Namespace::new();
        if !config.layout.lib {
            names.claim(SUPPORT_MODULE);
        }

        let mut report = RunReport::default();
        for input in inputs {
            let path = config.input_path(input);
            if let Err(err) = self.run_input(&path, &session, &mut names, &mut report) {
                report.failure = Some(err);
                return report;
            }
        }

        if !config.layout.lib && !config.dry_run {
            let support = SupportFile {
                buffer: config.layout.buffer,
                module: config.module.clone(),
            };
            match support.write(&config.out_dir) {
                Ok(path) => report.support = Some(path),
                Err(err) => {
                    report.failure = Some(Error::output(support.path(&config.out_dir), err));
                    return report;
                }
            }
        }

        info!(
            generated = report.generated.len(),
            skipped = report.skipped.len(),
            "run complete"
        );
        report
    }

    fn run_input(
        &self,
        path: &Path,
        session: &Session<'_>,
        names: &mut Namespace,
        report: &mut RunReport,
    ) -> Result<()> {
        let meta = std::fs::metadata(path).map_err(|err| {
            Box::new(Error::Input {
                path: path.to_path_buf(),
                reason: "cannot access input".to_string(),
                source: Some(err),
            })
        })?;

        if meta.is_dir() {
            walk_templates(path, |file| self.run_unit(file, session, names, report))
        } else {
            self.run_unit(path, session, names, report)
        }
    }

    fn run_unit(
        &self,
        path: &Path,
        session: &Session<'_>,
        names: &mut Namespace,
        report: &mut RunReport,
    ) -> Result<()> {
        let unit = Unit::new(path, &self.config.out_dir, names)?;
        match unit.generate(session)? {
            UnitOutcome::Written { output } | UnitOutcome::Checked { output } => {
                report.generated.push(GeneratedUnit {
                    template: path.to_path_buf(),
                    ident: unit.ident().to_string(),
                    output,
                });
            }
            UnitOutcome::Skipped => report.skipped.push(path.to_path_buf()),
        }
        Ok(())
    }
}
