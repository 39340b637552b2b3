//! Unresolved phase - rejects blocks and mixin calls nothing supplied.

use eyre::Result;
use syn::{
    LitStr, Macro, Token,
    parse::{Parse, ParseStream},
    spanned::Spanned,
    visit::{self, Visit},
};

use crate::pipeline::{CompilationContext, Diagnostic, Phase};

/// Marker macro emitted in place of an unresolved block or mixin call.
pub const UNRESOLVED_MACRO: &str = "jade_unresolved";

/// Phase that turns unresolved markers into errors.
pub struct UnresolvedPhase;

impl Phase for UnresolvedPhase {
    fn name(&self) -> &'static str {
        "unresolved"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let mut finder = Finder {
            phase: self.name(),
            found: Vec::new(),
        };
        finder.visit_file(ctx.file()?);

        ctx.diagnostics.extend(finder.found);
        Ok(())
    }
}

/// `kind, "name"`
struct Marker {
    kind: syn::Ident,
    name: LitStr,
}

impl Parse for Marker {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let kind = input.parse()?;
        input.parse::<Token![,]>()?;
        let name = input.parse()?;
        Ok(Self { kind, name })
    }
}

struct Finder {
    phase: &'static str,
    found: Vec<Diagnostic>,
}

impl<'ast> Visit<'ast> for Finder {
    fn visit_macro(&mut self, mac: &'ast Macro) {
        if mac.path.is_ident(UNRESOLVED_MACRO) {
            let message = match mac.parse_body::<Marker>() {
                Ok(marker) => format!("unresolved {} `{}`", marker.kind, marker.name.value()),
                Err(_) => "unresolved template construct".to_string(),
            };
            self.found
                .push(Diagnostic::error(self.phase, message).at_span(mac.span()));
        }
        visit::visit_macro(self, mac);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SourceUnit;

    fn run(src: &str) -> (Result<()>, CompilationContext) {
        let mut ctx = CompilationContext::new(SourceUnit::new("t.jade", "t", src), "T");
        ctx.unit.file = Some(syn::parse_file(src).unwrap());
        let result = UnresolvedPhase.run(&mut ctx);
        (result, ctx)
    }

    #[test]
    fn test_no_markers() {
        let (result, ctx) = run("fn t() { println!(\"hi\"); }");
        assert!(result.is_ok());
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_markers_reported() {
        let (result, ctx) = run(
            r#"
fn t() {
    jade_unresolved!(block, "content");
    if x {
        jade_unresolved!(mixin, "card");
    }
}
"#,
        );
        assert!(result.is_ok() && ctx.has_errors());

        let messages: Vec<_> = ctx.errors().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["unresolved block `content`", "unresolved mixin `card`"]
        );
        assert_eq!(ctx.errors().next().unwrap().location.as_deref(), Some("3:5"));
    }
}
