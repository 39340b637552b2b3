//! Collapse phase - merges runs of literal writes.
//!
//! Consecutive `buffer.write_str("...")?;` statements in the same block are
//! merged into a single write. With inlining off, every literal write is
//! instead routed through a `const PREFIX__N: &str` item, deduplicated by
//! value. Running the phase twice leaves the tree unchanged.

use std::collections::HashMap;

use eyre::Result;
use indexmap::IndexMap;
use proc_macro2::Span;
use quote::format_ident;
use syn::{
    Block, Expr, ExprLit, ExprMethodCall, Item, Lit, LitStr, Stmt, parse_quote,
    visit_mut::{self, VisitMut},
};

use super::WRITER;
use crate::pipeline::{CompilationContext, Phase};

/// Phase that merges adjacent literal writes.
pub struct CollapsePhase;

impl Phase for CollapsePhase {
    fn name(&self) -> &'static str {
        "collapse"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let inline = ctx.inline;
        let prefix = ctx.const_prefix.clone();
        let merged = collapse_file(ctx.file_mut()?, inline, &prefix);
        tracing::trace!(ident = %ctx.unit.ident, merged, "collapsed literal writes");
        Ok(())
    }
}

/// Collapse literal writes in `file`.
///
/// Returns the number of write statements removed by merging.
pub fn collapse_file(file: &mut syn::File, inline: bool, prefix: &str) -> usize {
    let mut collapser = Collapser::new(file, inline, prefix);
    collapser.visit_file_mut(file);

    let consts = std::mem::take(&mut collapser.new_consts);
    if !consts.is_empty() {
        let at = file
            .items
            .iter()
            .position(|item| matches!(item, Item::Fn(_)))
            .unwrap_or(file.items.len());
        file.items.splice(at..at, consts);
    }

    collapser.merged
}

struct Collapser<'a> {
    inline: bool,
    prefix: &'a str,
    /// Hoisted constants by name.
    values: HashMap<String, String>,
    /// Hoisted constant names by value.
    names: IndexMap<String, String>,
    next: usize,
    new_consts: Vec<Item>,
    merged: usize,
}

impl<'a> Collapser<'a> {
    fn new(file: &syn::File, inline: bool, prefix: &'a str) -> Self {
        let mut collapser = Self {
            inline,
            prefix,
            values: HashMap::new(),
            names: IndexMap::new(),
            next: 0,
            new_consts: Vec::new(),
            merged: 0,
        };

        let marker = format!("{prefix}__");
        for item in &file.items {
            let Item::Const(item) = item else { continue };
            let name = item.ident.to_string();
            let Some(n) = name.strip_prefix(&marker).and_then(|n| n.parse::<usize>().ok()) else {
                continue;
            };
            if let Expr::Lit(ExprLit {
                lit: Lit::Str(value),
                ..
            }) = &*item.expr
            {
                collapser.next = collapser.next.max(n + 1);
                collapser.names.entry(value.value()).or_insert_with(|| name.clone());
                collapser.values.insert(name, value.value());
            }
        }

        collapser
    }

    /// The literal written by `stmt`, if it is a literal write.
    fn literal(&self, stmt: &Stmt) -> Option<(String, bool)> {
        let Stmt::Expr(Expr::Try(tried), Some(_)) = stmt else {
            return None;
        };
        let Expr::MethodCall(call) = &*tried.expr else {
            return None;
        };
        let arg = literal_write_arg(call)?;
        match arg {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => Some((lit.value(), false)),
            Expr::Path(path) if path.qself.is_none() => {
                let name = path.path.get_ident()?.to_string();
                self.values.get(&name).map(|value| (value.clone(), true))
            }
            _ => None,
        }
    }

    fn const_for(&mut self, value: String) -> String {
        if let Some(name) = self.names.get(&value) {
            return name.clone();
        }
        let ident = format_ident!("{}__{}", self.prefix, self.next);
        self.next += 1;

        let lit = LitStr::new(&value, Span::call_site());
        self.new_consts.push(parse_quote! {
            const #ident: &str = #lit;
        });

        let name = ident.to_string();
        self.values.insert(name.clone(), value.clone());
        self.names.insert(value, name.clone());
        name
    }

    fn flush(&mut self, run: &mut Vec<(Stmt, String, bool)>, out: &mut Vec<Stmt>) {
        match run.len() {
            0 => return,
            // A lone write is already final unless it still needs hoisting.
            1 if self.inline || run[0].2 => {
                out.extend(run.drain(..).map(|(stmt, _, _)| stmt));
                return;
            }
            n => self.merged += n - 1,
        }

        let value: String = run.drain(..).map(|(_, value, _)| value).collect();
        let writer = format_ident!("{}", WRITER);
        if self.inline {
            let lit = LitStr::new(&value, Span::call_site());
            out.push(parse_quote! { #writer.write_str(#lit)?; });
        } else {
            let name = format_ident!("{}", self.const_for(value));
            out.push(parse_quote! { #writer.write_str(#name)?; });
        }
    }
}

impl VisitMut for Collapser<'_> {
    // Outer blocks first so hoisted constants are numbered in document order.
    fn visit_block_mut(&mut self, block: &mut Block) {
        let stmts = std::mem::take(&mut block.stmts);
        let mut out = Vec::with_capacity(stmts.len());
        let mut run = Vec::new();
        for stmt in stmts {
            match self.literal(&stmt) {
                Some((value, hoisted)) => run.push((stmt, value, hoisted)),
                None => {
                    self.flush(&mut run, &mut out);
                    out.push(stmt);
                }
            }
        }
        self.flush(&mut run, &mut out);
        block.stmts = out;

        visit_mut::visit_block_mut(self, block);
    }
}

/// The argument of `buffer.write_str(arg)`.
fn literal_write_arg(call: &ExprMethodCall) -> Option<&Expr> {
    if call.method != "write_str" || call.args.len() != 1 || call.turbofish.is_some() {
        return None;
    }
    let Expr::Path(receiver) = &*call.receiver else {
        return None;
    };
    if !receiver.path.is_ident(WRITER) {
        return None;
    }
    call.args.first()
}

#[cfg(test)]
mod tests {
    use quote::ToTokens;

    use super::*;

    fn parse(src: &str) -> syn::File {
        syn::parse_file(src).unwrap()
    }

    fn render(file: &syn::File) -> String {
        prettyplease::unparse(file)
    }

    const BODY: &str = r#"
pub fn index(colors: &[&str], buffer: &mut W) -> R {
    buffer.write_str("<h1>")?;
    buffer.write_str("Hello")?;
    buffer.write_str("</h1><ul>")?;
    for c in colors {
        buffer.write_str("<li>")?;
        write_esc(&(c), buffer)?;
        buffer.write_str("</li>")?;
    }
    buffer.write_str("</ul>")?;
}
"#;

    #[test]
    fn test_inline_merges_runs() {
        let mut file = parse(BODY);
        let merged = collapse_file(&mut file, true, "INDEX");

        assert_eq!(merged, 2);
        let out = render(&file);
        assert!(out.contains(r#"buffer.write_str("<h1>Hello</h1><ul>")?;"#));
        assert!(out.contains(r#"buffer.write_str("<li>")?;"#));
        assert!(out.contains(r#"buffer.write_str("</ul>")?;"#));
        assert!(!out.contains("const "));
    }

    #[test]
    fn test_hoisted_dedupes_by_value() {
        let mut file = parse(
            r#"
fn f(buffer: &mut W) -> R {
    buffer.write_str("<p>")?;
    x()?;
    buffer.write_str("<p>")?;
    y()?;
    buffer.write_str("a")?;
    buffer.write_str("b")?;
}
"#,
        );
        collapse_file(&mut file, false, "PAGE");

        let out = render(&file);
        assert!(out.contains(r#"const PAGE__0: &str = "<p>";"#));
        assert!(out.contains(r#"const PAGE__1: &str = "ab";"#));
        assert_eq!(out.matches("buffer.write_str(PAGE__0)?;").count(), 2);
        assert!(out.find("const PAGE__0").unwrap() < out.find("fn f").unwrap());
    }

    #[test]
    fn test_collapse_is_idempotent() {
        for inline in [true, false] {
            let mut file = parse(BODY);
            collapse_file(&mut file, inline, "INDEX");
            let once = file.to_token_stream().to_string();

            assert_eq!(collapse_file(&mut file, inline, "INDEX"), 0);
            assert_eq!(file.to_token_stream().to_string(), once);
        }
    }

    #[test]
    fn test_existing_constants_continue_numbering() {
        let mut file = parse(
            r#"
const INDEX__4: &str = "x";
fn f(buffer: &mut W) -> R {
    buffer.write_str("y")?;
    buffer.write_str("x")?;
}
"#,
        );
        collapse_file(&mut file, false, "INDEX");

        let out = render(&file);
        assert!(out.contains(r#"const INDEX__5: &str = "yx";"#));
    }

    #[test]
    fn test_other_receivers_untouched() {
        let mut file = parse(
            r#"
fn f(buffer: &mut W, out: &mut W) -> R {
    out.write_str("a")?;
    out.write_str("b")?;
}
"#,
        );
        assert_eq!(collapse_file(&mut file, true, "F"), 0);
    }
}
