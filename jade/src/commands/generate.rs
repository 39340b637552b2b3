use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use jadec_codegen::RunOptions;

use super::UnwrapOrExit;
use crate::{
    config::{self, GenerateTable},
    ops,
    reports::{Report, TerminalOutput},
};

/// Options shared by `generate` and `check`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Template files or directories of templates
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory (defaults to the first input's directory)
    #[arg(short = 'd', long)]
    pub out_dir: Option<PathBuf>,

    /// Directory relative inputs and includes are resolved against
    #[arg(long)]
    pub basedir: Option<PathBuf>,

    /// Module name of the generated files
    #[arg(long)]
    pub pkg: Option<String>,

    /// Pretty print rendered HTML [default: true]
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub fmt: Option<bool>,

    /// Merge adjacent literal writes in place [default: true]
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub inline: Option<bool>,

    /// Import the runtime crate directly and skip the support file
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub lib: Option<bool>,

    /// Use `Vec<u8>` buffers; `false` selects pooled buffers [default: true]
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub stdbuf: Option<bool>,

    /// Render into `&mut dyn Write` destinations [default: true]
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub writer: Option<bool>,

    /// Path to jade.toml (defaults to ./jade.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl GenerateArgs {
    /// Command line values laid over the config file.
    pub fn options(&self) -> Result<RunOptions> {
        let table = config::load(self.config.as_deref())?
            .map(|file| file.generate)
            .unwrap_or_default();
        Ok(self.merge(table))
    }

    fn merge(&self, table: GenerateTable) -> RunOptions {
        let defaults = RunOptions::default();
        RunOptions {
            out_dir: self.out_dir.clone().or(table.out_dir),
            base_dir: self.basedir.clone().or(table.basedir),
            module: self.pkg.clone().or(table.pkg),
            pretty: self.fmt.or(table.fmt).unwrap_or(defaults.pretty),
            inline: self.inline.or(table.inline).unwrap_or(defaults.inline),
            lib: self.lib.or(table.lib).unwrap_or(defaults.lib),
            std_buffer: self.stdbuf.or(table.stdbuf).unwrap_or(defaults.std_buffer),
            writer: self.writer.or(table.writer).unwrap_or(defaults.writer),
            ..defaults
        }
    }
}

#[derive(Args)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub args: GenerateArgs,

    /// Write phase snapshots to `<out-dir>/.jade/debug`
    #[arg(long)]
    pub visualize: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateCommand {
    pub fn run(&self) -> Result<()> {
        let options = RunOptions {
            visualize: self.visualize,
            ..self.args.options()?
        };
        let (report, failure) = ops::generate(options, &self.args.inputs)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            if failure.is_some() {
                std::process::exit(1);
            }
            return Ok(());
        }

        report.render(&mut TerminalOutput::new());
        failure.map_or(Ok(()), Err).unwrap_or_exit();
        Ok(())
    }
}
