//! Import resolution and final formatting of generated files.

use std::{collections::HashSet, path::Path};

use eyre::Result;
use proc_macro2::{TokenStream, TokenTree};
use quote::ToTokens;
use syn::{Item, ItemUse, UseGroup, UsePath, UseTree, Visibility, punctuated::Punctuated};

/// Final step of a unit: turn the transformed tree into file text.
///
/// Resolvers may drop or reorder imports but must not change what the
/// code means.
pub trait ImportResolver {
    fn resolve(&self, path: &Path, file: syn::File) -> Result<String>;
}

/// Prunes unused imports and prints with `prettyplease`.
///
/// A `use` item survives when any name it imports appears as an identifier
/// elsewhere in the file (macro bodies included). Glob imports and public
/// re-exports are always kept. Surviving imports are deduplicated, sorted
/// and placed ahead of every other item.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyResolver;

impl ImportResolver for PrettyResolver {
    fn resolve(&self, path: &Path, mut file: syn::File) -> Result<String> {
        let mut used = HashSet::new();
        for item in &file.items {
            if !matches!(item, Item::Use(_)) {
                collect_idents(item.to_token_stream(), &mut used);
            }
        }

        // (sort key, identity, item)
        let mut uses: Vec<(String, String, Item)> = Vec::new();
        let mut rest = Vec::new();
        let mut dropped = 0usize;
        for item in std::mem::take(&mut file.items) {
            match item {
                Item::Use(item_use) => match prune_use(item_use, &used) {
                    Some(kept) => {
                        let identity = kept.to_token_stream().to_string();
                        if !uses.iter().any(|(_, seen, _)| *seen == identity) {
                            let key = kept.tree.to_token_stream().to_string();
                            uses.push((key, identity, Item::Use(kept)));
                        }
                    }
                    None => dropped += 1,
                },
                other => rest.push(other),
            }
        }
        uses.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        tracing::trace!(path = %path.display(), kept = uses.len(), dropped, "resolved imports");

        file.items = uses.into_iter().map(|(_, _, item)| item).chain(rest).collect();
        Ok(prettyplease::unparse(&file))
    }
}

fn collect_idents(tokens: TokenStream, out: &mut HashSet<String>) {
    for tt in tokens {
        match tt {
            TokenTree::Ident(ident) => {
                out.insert(ident.to_string());
            }
            TokenTree::Group(group) => collect_idents(group.stream(), out),
            TokenTree::Punct(_) | TokenTree::Literal(_) => {}
        }
    }
}

fn prune_use(mut item: ItemUse, used: &HashSet<String>) -> Option<ItemUse> {
    if !matches!(item.vis, Visibility::Inherited) {
        return Some(item);
    }
    item.tree = prune_tree(&item.tree, used)?;
    Some(item)
}

fn prune_tree(tree: &UseTree, used: &HashSet<String>) -> Option<UseTree> {
    match tree {
        UseTree::Path(path) => prune_tree(&path.tree, used).map(|inner| {
            UseTree::Path(UsePath {
                ident: path.ident.clone(),
                colon2_token: path.colon2_token,
                tree: Box::new(inner),
            })
        }),
        UseTree::Name(name) => {
            let keep = name.ident == "self" || used.contains(&name.ident.to_string());
            keep.then(|| tree.clone())
        }
        UseTree::Rename(rename) => {
            let keep = rename.rename == "_" || used.contains(&rename.rename.to_string());
            keep.then(|| tree.clone())
        }
        UseTree::Glob(_) => Some(tree.clone()),
        UseTree::Group(group) => {
            let items: Punctuated<UseTree, syn::Token![,]> = group
                .items
                .iter()
                .filter_map(|item| prune_tree(item, used))
                .collect();
            match items.len() {
                0 => None,
                1 if !matches!(items.first(), Some(UseTree::Name(name)) if name.ident == "self") => {
                    items.into_iter().next()
                }
                _ => Some(UseTree::Group(UseGroup {
                    brace_token: group.brace_token,
                    items,
                })),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(src: &str) -> String {
        PrettyResolver
            .resolve(Path::new("t.jade"), syn::parse_file(src).unwrap())
            .unwrap()
    }

    #[test]
    fn test_unused_names_dropped() {
        let out = resolve(
            r#"
use super::jade::{Closed, copy, finish, format, pipe, write_esc, write_int};
fn f() -> Result<(), Closed> {
    let (w, r) = pipe();
    write_esc(&(x), w)?;
    finish(a, copy(r, b))
}
"#,
        );
        assert!(out.contains("use super::jade::{Closed, copy, finish, pipe, write_esc};"));
        assert!(!out.contains("write_int"));
        assert!(!out.contains("format"));
    }

    #[test]
    fn test_single_survivor_ungrouped_and_sorted() {
        let out = resolve(
            r#"
use std::fmt::{Display, Write};
use crate::models::Item;
use crate::models::Item;
fn f(x: impl Display) {}
"#,
        );
        let lines: Vec<&str> = out.lines().filter(|l| l.starts_with("use ")).collect();
        assert_eq!(lines, vec!["use std::fmt::Display;"]);
    }

    #[test]
    fn test_globs_and_reexports_kept() {
        let out = resolve(
            r#"
use crate::helpers::*;
pub use crate::models::Item;
use crate::models::Other;
use crate::b::B;
use crate::a::A;
fn f(a: A, b: B) {}
"#,
        );
        let lines: Vec<&str> = out.lines().filter(|l| l.contains("use ")).collect();
        assert_eq!(
            lines,
            vec![
                "use crate::a::A;",
                "use crate::b::B;",
                "use crate::helpers::*;",
                "pub use crate::models::Item;",
            ]
        );
    }

    #[test]
    fn test_names_in_macros_count() {
        let out = resolve(
            r#"
use crate::fmt::money;
fn f() { let s = format!("{}", money(1)); }
"#,
        );
        assert!(out.contains("use crate::fmt::money;"));
    }
}
