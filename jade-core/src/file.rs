use std::{
    io::Write,
    path::{Path, PathBuf},
};

use eyre::{Result, WrapErr};
use tempfile::NamedTempFile;

/// Permissions of every generated file (unix only): `rw-r--r--`.
pub const GENERATED_FILE_MODE: u32 = 0o644;

/// A file whose content is derived from the run rather than a template.
pub trait GeneratedFile {
    /// Where the file goes inside the output directory `base`.
    fn path(&self, base: &Path) -> PathBuf;

    fn render(&self) -> String;

    fn write(&self, base: &Path) -> Result<PathBuf> {
        let path = self.path(base);
        write_file(&path, self.render().as_bytes())?;
        Ok(path)
    }
}

/// Write `content` to `path` with [`GENERATED_FILE_MODE`].
///
/// The content is written to a temporary file next to the destination and
/// renamed over it, so a failed write never leaves a partial file at `path`.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .wrap_err_with(|| format!("failed to create directory '{}'", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .wrap_err_with(|| format!("failed to create temporary file in '{}'", parent.display()))?;
    tmp.write_all(content)?;
    tmp.flush()?;
    set_mode(tmp.path())?;
    tmp.persist(path)
        .wrap_err_with(|| format!("failed to write '{}'", path.display()))?;

    tracing::trace!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(GENERATED_FILE_MODE))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path) -> Result<()> {
    Ok(())
}
