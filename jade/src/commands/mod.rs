mod check;
mod completions;
mod generate;

use check::CheckCommand;
use clap::{ArgAction, Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use generate::GenerateCommand;
use jadec_codegen::Error;

/// Extension trait for exiting on generation errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for jadec_codegen::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => exit_with(e),
        }
    }
}

/// Print a generation error and exit with status 1.
///
/// Template parse errors carry source spans and are rendered by miette.
pub(crate) fn exit_with(err: Box<Error>) -> ! {
    match *err {
        Error::Parse { source, .. } => eprintln!("{:?}", miette::Report::new(*source)),
        other => {
            eprintln!("error: {other}");
            let mut cause = std::error::Error::source(&other);
            while let Some(err) = cause {
                eprintln!("  caused by: {err}");
                cause = err.source();
            }
        }
    }
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "jade")]
#[command(version)]
#[command(about = "Compile jade templates into streaming Rust render functions")]
pub(crate) struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Rust render functions from templates
    Generate(GenerateCommand),

    /// Compile templates without writing files and list diagnostics
    Check(CheckCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::try_parse_from([
            "jade", "-vv", "generate", "-d", "out", "--fmt", "false", "--lib", "--stdbuf=false",
            "views",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Generate(cmd) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(cmd.args.out_dir.as_deref(), Some(std::path::Path::new("out")));
        assert_eq!(cmd.args.fmt, Some(false));
        assert_eq!(cmd.args.lib, Some(true));
        assert_eq!(cmd.args.stdbuf, Some(false));
        assert_eq!(cmd.args.inline, None);
    }

    #[test]
    fn test_inputs_required() {
        assert!(Cli::try_parse_from(["jade", "generate"]).is_err());
    }
}
