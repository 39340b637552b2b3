//! Naming conventions for generated Rust items.

use crate::utils::{to_snake_case, to_upper_snake_case};

/// Naming conventions applied to a template identifier.
///
/// Defines how the sanitized identifier of a template becomes a function
/// name and a constant prefix, and how reserved words are handled.
#[derive(Debug, Clone, Copy)]
pub struct NamingConvention {
    /// Transform identifier to function name (e.g., "userList" -> "user_list")
    pub ident_to_fn: fn(&str) -> String,
    /// Transform identifier to constant prefix (e.g., "userList" -> "USER_LIST")
    pub ident_to_const: fn(&str) -> String,
    /// List of reserved words in the language
    pub reserved_words: &'static [&'static str],
    /// Reserved words that cannot be used even as raw identifiers
    pub non_raw_words: &'static [&'static str],
    /// Escape a reserved word (e.g., "type" -> "r#type" in Rust)
    pub escape_reserved: fn(&str) -> String,
}

impl NamingConvention {
    /// Check if a name is a reserved word.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_words.contains(&name)
    }

    /// Get a safe name, escaping if necessary.
    pub fn safe_name(&self, name: &str) -> String {
        if self.non_raw_words.contains(&name) {
            format!("{}_", name)
        } else if self.is_reserved(name) {
            (self.escape_reserved)(name)
        } else {
            name.to_string()
        }
    }

    /// Function name for a template identifier.
    pub fn fn_name(&self, ident: &str) -> String {
        let name = leading_digit_guard((self.ident_to_fn)(ident));
        self.safe_name(&name)
    }

    /// Constant prefix for a template identifier.
    pub fn const_prefix(&self, ident: &str) -> String {
        leading_digit_guard((self.ident_to_const)(ident))
    }
}

fn leading_digit_guard(name: String) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", name)
    } else {
        name
    }
}

fn escape_rust_reserved(name: &str) -> String {
    format!("r#{}", name)
}

/// Rust naming conventions.
pub const RUST_NAMING: NamingConvention = NamingConvention {
    ident_to_fn: to_snake_case,
    ident_to_const: to_upper_snake_case,
    reserved_words: &[
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
        "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
        "final", "gen", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
    ],
    non_raw_words: &["crate", "self", "Self", "super"],
    escape_reserved: escape_rust_reserved,
};
