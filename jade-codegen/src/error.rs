use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::Diagnostic;

/// Result type for code generation (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Why generating a template failed. Each variant names the stage that
/// failed and the template being generated.
#[derive(Debug, Error)]
pub enum Error {
    /// The template could not be read or named.
    #[error("input error: {path}: {reason}")]
    Input {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The template parser rejected the template.
    #[error("parse error: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<jadec_parser::Error>,
    },

    /// The generated Rust source is not valid Rust.
    #[error("syntax error in generated source for {path} at {location}: {message}")]
    Syntax {
        path: PathBuf,
        location: String,
        message: String,
    },

    /// A transform phase reported errors.
    #[error("transform error: {path}: {}", summarize(.diagnostics))]
    Transform {
        path: PathBuf,
        diagnostics: Vec<Diagnostic>,
    },

    /// The generated file could not be written.
    #[error("output error: {path}")]
    Output {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .filter(|d| d.severity.is_error())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    pub(crate) fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Box<Self> {
        Box::new(Error::Input {
            path: path.into(),
            reason: reason.into(),
            source: None,
        })
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Input {
            path: path.into(),
            reason: "cannot read template".to_string(),
            source: Some(source),
        })
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: eyre::Report) -> Box<Self> {
        Box::new(Error::Output {
            path: path.into(),
            source: source.into(),
        })
    }

    /// Short name of the failing stage.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Input { .. } => "input",
            Error::Parse { .. } => "parse",
            Error::Syntax { .. } => "syntax",
            Error::Transform { .. } => "transform",
            Error::Output { .. } => "output",
        }
    }

    /// The template (or output file) the error is about.
    pub fn path(&self) -> &PathBuf {
        match self {
            Error::Input { path, .. }
            | Error::Parse { path, .. }
            | Error::Syntax { path, .. }
            | Error::Transform { path, .. }
            | Error::Output { path, .. } => path,
        }
    }
}
