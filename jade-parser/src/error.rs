use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for parser operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// One template's text and display name, used to build located errors.
///
/// # Example
///
/// ```ignore
/// let ctx = SourceContext::new(content, "index.jade");
/// ctx.syntax_error("unterminated attribute list", (12, 1));
/// ```
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a syntax error at a span.
    pub fn syntax_error(
        &self,
        message: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Syntax {
            src: self.named_source(),
            span: span.into(),
            message: message.into(),
        })
    }

    /// Create an indentation error at a span.
    pub fn indentation_error(
        &self,
        message: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Indentation {
            src: self.named_source(),
            span: span.into(),
            message: message.into(),
        })
    }

    /// Create an error for a construct used where it is not allowed.
    pub fn misplaced_error(
        &self,
        construct: impl Into<String>,
        reason: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Misplaced {
            src: self.named_source(),
            span: span.into(),
            construct: construct.into(),
            reason: reason.into(),
        })
    }

    /// Create an error for a referenced file that could not be read.
    pub fn include_error(
        &self,
        path: impl Into<PathBuf>,
        source: std::io::Error,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Include {
            src: self.named_source(),
            span: span.into(),
            path: path.into(),
            source,
        })
    }

    /// Create a mixin arity error.
    pub fn mixin_arity_error(
        &self,
        name: impl Into<String>,
        expected: usize,
        found: usize,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::MixinArity {
            src: self.named_source(),
            span: span.into(),
            name: name.into(),
            expected,
            found,
        })
    }

    /// Create a nesting-depth error.
    pub fn depth_error(&self, limit: usize, span: impl Into<SourceSpan>) -> Box<Error> {
        Box::new(Error::TooDeep {
            src: self.named_source(),
            span: span.into(),
            limit,
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(jade::syntax_error))]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
        message: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(jade::indentation),
        help("indent nested lines consistently, using either spaces or tabs")
    )]
    Indentation {
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
        message: String,
    },

    #[error("'{construct}' is not allowed here")]
    #[diagnostic(code(jade::misplaced), help("{reason}"))]
    Misplaced {
        #[source_code]
        src: NamedSource<String>,
        #[label("{construct}")]
        span: SourceSpan,
        construct: String,
        reason: String,
    },

    #[error("failed to read '{path}'")]
    #[diagnostic(
        code(jade::include),
        help("paths are resolved relative to the template that references them")
    )]
    Include {
        #[source_code]
        src: NamedSource<String>,
        #[label("referenced here")]
        span: SourceSpan,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mixin '{name}' takes {expected} argument(s) but {found} were supplied")]
    #[diagnostic(code(jade::mixin_arity))]
    MixinArity {
        #[source_code]
        src: NamedSource<String>,
        #[label("called here")]
        span: SourceSpan,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("templates nest deeper than {limit} levels")]
    #[diagnostic(
        code(jade::too_deep),
        help("check for an include, extends or mixin cycle")
    )]
    TooDeep {
        #[source_code]
        src: NamedSource<String>,
        #[label("while resolving this")]
        span: SourceSpan,
        limit: usize,
    },
}
