//! Recursive discovery of template files.

use std::path::{Path, PathBuf};

use jadec_core::is_template;
use tracing::trace;
use walkdir::WalkDir;

use crate::{Error, Result};

/// Visit every template file under `root`, in file-name order.
///
/// Symlinks are not followed. The walk stops at the first traversal error
/// or the first error returned by `visit`.
pub fn walk_templates(root: &Path, mut visit: impl FnMut(&Path) -> Result<()>) -> Result<()> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            Box::new(Error::Input {
                reason: format!("cannot walk '{}' at '{}'", root.display(), path.display()),
                path,
                source: Some(err.into()),
            })
        })?;

        if entry.file_type().is_file() && is_template(entry.path()) {
            trace!(path = %entry.path().display(), "found template");
            visit(entry.path())?;
        }
    }
    Ok(())
}

/// Collect the template files under `root`, in walk order.
pub fn find_templates(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk_templates(root, |path| {
        found.push(path.to_path_buf());
        Ok(())
    })?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_finds_templates_sorted() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        for file in ["z.jade", "a/page.pug", "b/nested/deep.jade", "b/notes.txt", "b/x.jade"] {
            fs::write(root.join(file), "p").unwrap();
        }

        let found: Vec<_> = find_templates(root)
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            found,
            vec![
                PathBuf::from("a/page.pug"),
                PathBuf::from("b/nested/deep.jade"),
                PathBuf::from("b/x.jade"),
                PathBuf::from("z.jade"),
            ]
        );
    }

    #[test]
    fn test_visit_error_stops_walk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jade"), "p").unwrap();
        fs::write(dir.path().join("b.jade"), "p").unwrap();

        let mut seen = 0;
        let result = walk_templates(dir.path(), |path| {
            seen += 1;
            Err(Error::input(path, "stop"))
        });

        assert!(result.is_err());
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_missing_root() {
        let err = find_templates(Path::new("/nonexistent/templates")).unwrap_err();
        assert_eq!(err.stage(), "input");
        assert!(err.to_string().contains("/nonexistent/templates"));
    }
}
