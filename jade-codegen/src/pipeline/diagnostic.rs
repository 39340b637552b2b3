//! Problems found in a generated source.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Stops the pipeline; the unit is not written.
    Error,
    /// Logged, generation continues.
    Warning,
}

impl Severity {
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    pub fn is_warning(self) -> bool {
        self == Severity::Warning
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// A message from a phase, optionally located in the generated source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Phase that reported it (`parse`, `typecheck`, ...).
    pub phase: String,
    pub message: String,
    /// `line:column` in the generated source, both 1-based.
    pub location: Option<String>,
}

impl Diagnostic {
    fn new(severity: Severity, phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            phase: phase.into(),
            message: message.into(),
            location: None,
        }
    }

    pub fn error(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, phase, message)
    }

    pub fn warning(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, phase, message)
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Locate at the start of `span`.
    ///
    /// Needs the `span-locations` feature of `proc-macro2`; spans of tokens
    /// parsed at runtime carry real line and column numbers only then.
    pub fn at_span(self, span: proc_macro2::Span) -> Self {
        let start = span.start();
        self.at(format!("{}:{}", start.line, start.column + 1))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        match &self.location {
            Some(loc) => write!(f, " (at {loc})"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_location() {
        let diag = Diagnostic::warning("collapse", "nothing to collapse").at("3:9");
        assert_eq!(diag.to_string(), "warning: nothing to collapse (at 3:9)");

        let diag = Diagnostic::error("typecheck", "undeclared identifier `x`");
        assert!(diag.severity.is_error());
        assert_eq!(diag.to_string(), "error: undeclared identifier `x`");
    }

    #[test]
    fn test_location_from_span() {
        let file = syn::parse_file("fn main() {\n    let x = 1;\n}").unwrap();
        let syn::Item::Fn(item) = &file.items[0] else {
            panic!("expected fn");
        };
        let span = syn::spanned::Spanned::span(&item.block.stmts[0]);
        let diag = Diagnostic::error("test", "here").at_span(span);
        assert_eq!(diag.location.as_deref(), Some("2:5"));
    }

    #[test]
    fn test_serializes_lowercase_severity() {
        let value = serde_json::to_value(Diagnostic::error("parse", "bad").at("1:1")).unwrap();
        assert_eq!(value["severity"], "error");
        assert_eq!(value["location"], "1:1");
    }
}
