//! Recognized template file extensions.

use std::path::Path;

/// Extensions (without the dot) recognized as templates.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["jade", "pug"];

/// Check whether a path names a template file by its extension.
pub fn is_template(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
}

/// The file name of a template with its template extension removed.
///
/// Non-template extensions are kept (`page.html.jade` -> `page.html`,
/// `notes.txt` -> `notes.txt`).
pub fn template_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    if is_template(path) {
        path.file_stem()?.to_str()
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_template() {
        assert!(is_template(Path::new("views/index.jade")));
        assert!(is_template(Path::new("index.pug")));
        assert!(!is_template(Path::new("index.html")));
        assert!(!is_template(Path::new("jade")));
    }

    #[test]
    fn test_template_stem() {
        assert_eq!(template_stem(Path::new("a/index.jade")), Some("index"));
        assert_eq!(template_stem(Path::new("page.html.pug")), Some("page.html"));
        assert_eq!(template_stem(Path::new("notes.txt")), Some("notes.txt"));
    }
}
