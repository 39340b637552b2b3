//! Shared string utilities for code generation.

/// Project a file stem onto its ASCII alphanumeric characters
/// (e.g., "user-profile.v2" -> "userprofilev2").
pub fn sanitize_identifier(stem: &str) -> String {
    stem.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Convert a string to snake_case (e.g., "HelloWorld" -> "hello_world")
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            result.push('_');
        }
        result.extend(c.to_lowercase());
    }
    result.replace('-', "_")
}

/// Convert a string to UPPER_SNAKE_CASE (e.g., "userList" -> "USER_LIST")
pub fn to_upper_snake_case(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}

/// Check if a string is a plain (non-raw) Rust identifier.
pub fn is_rust_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    s != "_" && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("index"), "index");
        assert_eq!(sanitize_identifier("user-profile.v2"), "userprofilev2");
        assert_eq!(sanitize_identifier("my_page"), "mypage");
        assert_eq!(sanitize_identifier("ünï"), "n");
        assert_eq!(sanitize_identifier("--"), "");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Hello"), "hello");
        assert_eq!(to_snake_case("HelloWorld"), "hello_world");
        assert_eq!(to_snake_case("hello-world"), "hello_world");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_to_upper_snake_case() {
        assert_eq!(to_upper_snake_case("userList"), "USER_LIST");
        assert_eq!(to_upper_snake_case("index2"), "INDEX2");
    }

    #[test]
    fn test_is_rust_ident() {
        assert!(is_rust_ident("views"));
        assert!(is_rust_ident("_private"));
        assert!(is_rust_ident("v2"));
        assert!(!is_rust_ident("2v"));
        assert!(!is_rust_ident("_"));
        assert!(!is_rust_ident("my-views"));
        assert!(!is_rust_ident("."));
    }
}
