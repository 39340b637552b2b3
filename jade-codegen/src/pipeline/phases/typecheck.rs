//! Type check phase - checks template expressions against declared types.
//!
//! Only what can be decided from the source alone is checked: parameter and
//! `let` annotations, element types of iterated slices and vectors, and
//! the scoping of local names. Everything else is left to rustc.
//!
//! Integer outputs are rewritten from `write_esc` to `write_int` so they
//! skip escaping.

use std::collections::{HashMap, HashSet};

use eyre::Result;
use quote::ToTokens;
use syn::{
    Arm, Block, Expr, ExprCall, ExprClosure, ExprField, ExprForLoop, ExprIf, ExprLet, ExprPath,
    ExprWhile, FnArg, GenericArgument, Item, ItemFn, ItemUse, Local, Member, Pat, PathArguments,
    Type, UseTree,
    ext::IdentExt,
    spanned::Spanned,
    visit_mut::{self, VisitMut},
};

use crate::pipeline::{CompilationContext, Diagnostic, Phase};

/// Phase that checks expressions and rewrites integer outputs.
pub struct TypeCheckPhase;

impl Phase for TypeCheckPhase {
    fn name(&self) -> &'static str {
        "typecheck"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let file = ctx.file_mut()?;
        let mut checker = Checker::new(self.name(), file);
        checker.visit_file_mut(file);
        tracing::trace!(
            ident = %ctx.unit.ident,
            rewrites = checker.rewrites,
            "type checked"
        );

        ctx.diagnostics.extend(checker.diagnostics);
        Ok(())
    }
}

/// What is known about a binding's type.
#[derive(Debug, PartialEq)]
enum Category {
    Integer,
    Scalar,
    String,
    Sequence(Option<Type>),
    Other,
}

impl Category {
    fn of(ty: &Type) -> Self {
        match ty {
            Type::Reference(r) => Self::of(&r.elem),
            Type::Paren(p) => Self::of(&p.elem),
            Type::Group(g) => Self::of(&g.elem),
            Type::Slice(s) => Self::Sequence(Some((*s.elem).clone())),
            Type::Array(a) => Self::Sequence(Some((*a.elem).clone())),
            Type::Path(p) if p.qself.is_none() => {
                let Some(last) = p.path.segments.last() else {
                    return Self::Other;
                };
                match last.ident.to_string().as_str() {
                    "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32"
                    | "u64" | "u128" | "usize" => Self::Integer,
                    "f32" | "f64" | "bool" | "char" => Self::Scalar,
                    "str" | "String" => Self::String,
                    "Vec" | "VecDeque" => Self::Sequence(first_type_arg(&last.arguments).cloned()),
                    "Box" | "Rc" | "Arc" | "Cow" => first_type_arg(&last.arguments)
                        .map(Self::of)
                        .unwrap_or(Self::Other),
                    _ => Self::Other,
                }
            }
            _ => Self::Other,
        }
    }

    fn has_fields(&self) -> bool {
        matches!(self, Self::Other)
    }

    fn iterable(&self) -> bool {
        !matches!(self, Self::Integer | Self::Scalar | Self::String)
    }
}

fn first_type_arg(args: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = args else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

/// Strip `&`, parentheses and invisible groups around an expression.
fn peel(mut expr: &Expr) -> &Expr {
    loop {
        expr = match expr {
            Expr::Reference(r) => &r.expr,
            Expr::Paren(p) => &p.expr,
            Expr::Group(g) => &g.expr,
            _ => return expr,
        };
    }
}

/// The name of a plain single-segment path expression.
fn local_name(expr: &Expr) -> Option<String> {
    let Expr::Path(path) = expr else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    path.path.get_ident().map(|ident| ident.unraw().to_string())
}

struct Checker {
    phase: &'static str,
    /// Module-level names: items and imports.
    globals: HashSet<String>,
    scopes: Vec<HashMap<String, Option<Type>>>,
    diagnostics: Vec<Diagnostic>,
    rewrites: usize,
}

impl Checker {
    fn new(phase: &'static str, file: &syn::File) -> Self {
        let mut globals = HashSet::new();
        for item in &file.items {
            let ident = match item {
                Item::Fn(f) => Some(&f.sig.ident),
                Item::Const(c) => Some(&c.ident),
                Item::Static(s) => Some(&s.ident),
                Item::Use(ItemUse { tree, .. }) => {
                    collect_use_names(tree, &mut globals);
                    None
                }
                _ => None,
            };
            if let Some(ident) = ident {
                globals.insert(ident.unraw().to_string());
            }
        }

        Self {
            phase,
            globals,
            scopes: Vec::new(),
            diagnostics: Vec::new(),
            rewrites: 0,
        }
    }

    fn lookup(&self, name: &str) -> Option<&Option<Type>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn is_declared(&self, name: &str) -> bool {
        self.lookup(name).is_some() || self.globals.contains(name)
    }

    fn category(&self, name: &str) -> Option<Category> {
        self.lookup(name)
            .and_then(|ty| ty.as_ref())
            .map(Category::of)
    }

    fn type_of(&self, name: &str) -> String {
        match self.lookup(name) {
            Some(Some(ty)) => ty.to_token_stream().to_string(),
            _ => "_".to_string(),
        }
    }

    fn error(&mut self, span: proc_macro2::Span, message: String) {
        self.diagnostics
            .push(Diagnostic::error(self.phase, message).at_span(span));
    }

    fn scoped(&mut self, f: impl FnOnce(&mut Self)) {
        self.scopes.push(HashMap::new());
        f(self);
        self.scopes.pop();
    }

    fn bind(&mut self, pat: &Pat, ty: Option<&Type>) {
        match pat {
            Pat::Ident(p) => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(p.ident.unraw().to_string(), ty.cloned());
                }
                if let Some((_, sub)) = &p.subpat {
                    self.bind(sub, None);
                }
            }
            Pat::Type(p) => self.bind(&p.pat, Some(&p.ty)),
            Pat::Reference(p) => {
                let inner = match ty {
                    Some(Type::Reference(r)) => Some(&*r.elem),
                    _ => None,
                };
                self.bind(&p.pat, inner);
            }
            Pat::Paren(p) => self.bind(&p.pat, ty),
            Pat::Tuple(p) => match ty {
                Some(Type::Tuple(t)) if t.elems.len() == p.elems.len() => {
                    for (pat, ty) in p.elems.iter().zip(t.elems.iter()) {
                        self.bind(pat, Some(ty));
                    }
                }
                _ => p.elems.iter().for_each(|pat| self.bind(pat, None)),
            },
            Pat::TupleStruct(p) => p.elems.iter().for_each(|pat| self.bind(pat, None)),
            Pat::Struct(p) => p.fields.iter().for_each(|f| self.bind(&f.pat, None)),
            Pat::Slice(p) => p.elems.iter().for_each(|pat| self.bind(pat, None)),
            Pat::Or(p) => p.cases.iter().for_each(|pat| self.bind(pat, None)),
            _ => {}
        }
    }
}

fn collect_use_names(tree: &UseTree, names: &mut HashSet<String>) {
    match tree {
        UseTree::Path(p) => collect_use_names(&p.tree, names),
        UseTree::Name(n) => {
            names.insert(n.ident.unraw().to_string());
        }
        UseTree::Rename(r) => {
            names.insert(r.rename.unraw().to_string());
        }
        UseTree::Group(g) => g.items.iter().for_each(|t| collect_use_names(t, names)),
        UseTree::Glob(_) => {}
    }
}

impl VisitMut for Checker {
    fn visit_item_fn_mut(&mut self, item: &mut ItemFn) {
        self.scoped(|this| {
            for input in &item.sig.inputs {
                match input {
                    FnArg::Typed(arg) => this.bind(&arg.pat, Some(&arg.ty)),
                    FnArg::Receiver(_) => {
                        if let Some(scope) = this.scopes.last_mut() {
                            scope.insert("self".to_string(), None);
                        }
                    }
                }
            }
            this.visit_block_mut(&mut item.block);
        });
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        self.scoped(|this| visit_mut::visit_block_mut(this, block));
    }

    fn visit_local_mut(&mut self, local: &mut Local) {
        if let Some(init) = &mut local.init {
            self.visit_expr_mut(&mut init.expr);
            if let Some((_, diverge)) = &mut init.diverge {
                self.visit_expr_mut(diverge);
            }
        }
        self.bind(&local.pat, None);
    }

    fn visit_expr_path_mut(&mut self, expr: &mut ExprPath) {
        if expr.qself.is_some() {
            return;
        }
        let Some(ident) = expr.path.get_ident() else {
            return;
        };
        let name = ident.unraw().to_string();
        if name.starts_with(|c: char| c.is_lowercase() || c == '_') && !self.is_declared(&name) {
            self.error(expr.span(), format!("undeclared identifier `{name}`"));
        }
    }

    fn visit_expr_call_mut(&mut self, call: &mut ExprCall) {
        match &mut *call.func {
            Expr::Path(func) => {
                let is_esc = func
                    .path
                    .segments
                    .last()
                    .is_some_and(|seg| seg.ident == "write_esc");
                let integer = call
                    .args
                    .first()
                    .and_then(|arg| local_name(peel(arg)))
                    .is_some_and(|name| self.category(&name) == Some(Category::Integer));
                if is_esc && call.args.len() == 2 && integer {
                    if let Some(seg) = func.path.segments.last_mut() {
                        seg.ident = syn::Ident::new("write_int", seg.ident.span());
                        self.rewrites += 1;
                    }
                }
            }
            other => self.visit_expr_mut(other),
        }
        for arg in call.args.iter_mut() {
            self.visit_expr_mut(arg);
        }
    }

    fn visit_expr_field_mut(&mut self, expr: &mut ExprField) {
        if let Member::Named(field) = &expr.member {
            if let Some(name) = local_name(peel(&expr.base)) {
                if self.category(&name).is_some_and(|cat| !cat.has_fields()) {
                    let message = format!(
                        "no field `{field}` on `{name}` of type `{}`",
                        self.type_of(&name)
                    );
                    self.error(expr.member.span(), message);
                }
            }
        }
        self.visit_expr_mut(&mut expr.base);
    }

    fn visit_expr_for_loop_mut(&mut self, expr: &mut ExprForLoop) {
        self.visit_expr_mut(&mut expr.expr);

        let mut elem = None;
        if let Some(name) = local_name(peel(&expr.expr)) {
            match self.category(&name) {
                Some(cat) if !cat.iterable() => {
                    let message = format!("cannot iterate over `{name}` of type `{}`", self.type_of(&name));
                    self.error(expr.expr.span(), message);
                }
                Some(Category::Sequence(ty)) => elem = ty,
                _ => {}
            }
        }

        self.scoped(|this| {
            this.bind(&expr.pat, elem.as_ref());
            this.visit_block_mut(&mut expr.body);
        });
    }

    fn visit_expr_closure_mut(&mut self, expr: &mut ExprClosure) {
        self.scoped(|this| {
            for input in &expr.inputs {
                this.bind(input, None);
            }
            this.visit_expr_mut(&mut expr.body);
        });
    }

    fn visit_arm_mut(&mut self, arm: &mut Arm) {
        self.scoped(|this| {
            this.bind(&arm.pat, None);
            if let Some((_, guard)) = &mut arm.guard {
                this.visit_expr_mut(guard);
            }
            this.visit_expr_mut(&mut arm.body);
        });
    }

    fn visit_expr_if_mut(&mut self, expr: &mut ExprIf) {
        self.scoped(|this| {
            this.visit_expr_mut(&mut expr.cond);
            this.visit_block_mut(&mut expr.then_branch);
        });
        if let Some((_, otherwise)) = &mut expr.else_branch {
            self.visit_expr_mut(otherwise);
        }
    }

    fn visit_expr_while_mut(&mut self, expr: &mut ExprWhile) {
        self.scoped(|this| {
            this.visit_expr_mut(&mut expr.cond);
            this.visit_block_mut(&mut expr.body);
        });
    }

    fn visit_expr_let_mut(&mut self, expr: &mut ExprLet) {
        self.visit_expr_mut(&mut expr.expr);
        self.bind(&expr.pat, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SourceUnit;

    fn check(src: &str) -> (Result<()>, CompilationContext) {
        let mut ctx = CompilationContext::new(SourceUnit::new("t.jade", "t", src), "T");
        ctx.unit.file = Some(syn::parse_file(src).unwrap());
        let result = TypeCheckPhase.run(&mut ctx);
        (result, ctx)
    }

    fn messages(ctx: &CompilationContext) -> Vec<String> {
        ctx.errors().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn test_declared_names_pass() {
        let (result, ctx) = check(
            r#"
use crate::helpers::price;
const LIMIT: usize = 3;
pub fn t(items: &[Item], buffer: &mut W) -> R {
    let total = items.len();
    for (i, item) in items.iter().enumerate() {
        write_esc(&(item.name), buffer)?;
        write_esc(&(price(i, total)), buffer)?;
    }
    if let Some(first) = items.first() {
        write_esc(&(first.name), buffer)?;
    }
    let names: Vec<_> = items.iter().map(|x| x.name.clone()).collect();
    match names.len() {
        n if n > LIMIT => write_esc(&(n), buffer)?,
        _ => {}
    }
}
"#,
        );
        assert!(result.is_ok());
        assert!(messages(&ctx).is_empty(), "{:?}", messages(&ctx));
    }

    #[test]
    fn test_undeclared_identifier() {
        let (result, ctx) = check(
            r#"
pub fn t(buffer: &mut W) -> R {
    write_esc(&(missing), buffer)?;
}
"#,
        );
        assert!(result.is_ok() && ctx.has_errors());
        assert_eq!(messages(&ctx), vec!["undeclared identifier `missing`"]);
        let diag = ctx.errors().next().unwrap();
        assert_eq!(diag.phase, "typecheck");
        assert!(diag.location.as_deref().is_some_and(|loc| loc.starts_with("3:")));
    }

    #[test]
    fn test_scopes_end_with_blocks() {
        let (result, ctx) = check(
            r#"
pub fn t(items: &[String], buffer: &mut W) -> R {
    for item in items {
        write_esc(&(item), buffer)?;
    }
    write_esc(&(item), buffer)?;
}
"#,
        );
        assert!(result.is_ok() && ctx.has_errors());
        assert_eq!(messages(&ctx), vec!["undeclared identifier `item`"]);
    }

    #[test]
    fn test_field_on_scalar() {
        let (_, ctx) = check(
            r#"
pub fn t(count: i64, title: &str, buffer: &mut W) -> R {
    write_esc(&(count.value), buffer)?;
    write_esc(&(title.len()), buffer)?;
}
"#,
        );
        assert_eq!(
            messages(&ctx),
            vec!["no field `value` on `count` of type `i64`"]
        );
    }

    #[test]
    fn test_iterating_scalar() {
        let (_, ctx) = check(
            r#"
pub fn t(name: String, buffer: &mut W) -> R {
    for c in name {
        write_esc(&(c), buffer)?;
    }
}
"#,
        );
        assert_eq!(
            messages(&ctx),
            vec!["cannot iterate over `name` of type `String`"]
        );
    }

    #[test]
    fn test_element_type_flows_into_loop() {
        let (_, ctx) = check(
            r#"
pub fn t(colors: &[&str], buffer: &mut W) -> R {
    for c in colors {
        write_esc(&(c.name), buffer)?;
    }
}
"#,
        );
        assert_eq!(
            messages(&ctx),
            vec!["no field `name` on `c` of type `& str`"]
        );
    }

    #[test]
    fn test_integer_output_rewritten() {
        let (result, mut ctx) = check(
            r#"
pub fn t(count: usize, counts: Vec<i32>, label: &str, buffer: &mut W) -> R {
    write_esc(&(count), buffer)?;
    for n in &counts {
        write_esc(&(n), buffer)?;
    }
    write_esc(&(label), buffer)?;
}
"#,
        );
        assert!(result.is_ok() && !ctx.has_errors());

        let out = prettyplease::unparse(&ctx.take_file().unwrap());
        assert_eq!(out.matches("write_int(").count(), 2);
        assert_eq!(out.matches("write_esc(").count(), 1);
    }
}
