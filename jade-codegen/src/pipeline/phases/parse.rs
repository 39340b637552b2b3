//! Parse phase - turns the generated text into a syntax tree.

use eyre::Result;

use crate::pipeline::{CompilationContext, Diagnostic, Phase};

/// Phase that parses the wrapped source with `syn`.
///
/// A parse failure means the layout or a template expression produced
/// invalid Rust. The whole generated text is written to stderr so the
/// offending line can be found.
pub struct ParsePhase;

impl Phase for ParsePhase {
    fn name(&self) -> &'static str {
        "parse"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        match syn::parse_file(&ctx.unit.text) {
            Ok(file) => {
                ctx.unit.file = Some(file);
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    template = %ctx.unit.path.display(),
                    "generated source does not parse: {err}"
                );
                eprintln!("{}", ctx.unit.text);
                ctx.push(Diagnostic::error(self.name(), err.to_string()).at_span(err.span()));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SourceUnit;

    #[test]
    fn test_valid_source() {
        let mut ctx = CompilationContext::new(SourceUnit::new("t.jade", "t", "pub fn t() {}"), "T");
        ParsePhase.run(&mut ctx).unwrap();
        assert!(ctx.unit.file.is_some());
    }

    #[test]
    fn test_invalid_source_located() {
        let mut ctx = CompilationContext::new(
            SourceUnit::new("t.jade", "t", "pub fn t() {\n    let = 1;\n}"),
            "T",
        );
        ParsePhase.run(&mut ctx).unwrap();
        assert!(ctx.unit.file.is_none());

        let diag = ctx.errors().next().unwrap();
        assert_eq!(diag.phase, "parse");
        assert!(diag.location.as_deref().is_some_and(|loc| loc.starts_with("2:")));
    }
}
