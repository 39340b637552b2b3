//! Optional `jade.toml` project file.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use serde::Deserialize;
use tracing::debug;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "jade.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JadeToml {
    #[serde(default)]
    pub generate: GenerateTable,
}

/// Defaults for every `generate` option.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateTable {
    pub out_dir: Option<PathBuf>,
    pub basedir: Option<PathBuf>,
    pub pkg: Option<String>,
    pub fmt: Option<bool>,
    pub inline: Option<bool>,
    pub lib: Option<bool>,
    pub stdbuf: Option<bool>,
    pub writer: Option<bool>,
}

/// Load the config file.
///
/// Without an explicit path a missing `jade.toml` yields `None`. Relative
/// directories in the file are taken relative to the file itself.
pub fn load(explicit: Option<&Path>) -> Result<Option<JadeToml>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG);
            if !path.is_file() {
                return Ok(None);
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path)
        .wrap_err_with(|| format!("failed to read config '{}'", path.display()))?;
    let mut config: JadeToml = toml::from_str(&content)
        .wrap_err_with(|| format!("invalid config '{}'", path.display()))?;
    debug!(path = %path.display(), "loaded config");

    let root = path.parent().unwrap_or(Path::new(""));
    let table = &mut config.generate;
    table.out_dir = table.out_dir.take().map(|dir| root.join(dir));
    table.basedir = table.basedir.take().map(|dir| root.join(dir));
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_load_generate_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jade.toml");
        std::fs::write(
            &path,
            "[generate]\nout_dir = \"gen\"\npkg = \"pages\"\nfmt = false\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap().unwrap();
        assert_eq!(config.generate.out_dir, Some(dir.path().join("gen")));
        assert_eq!(config.generate.pkg.as_deref(), Some("pages"));
        assert_eq!(config.generate.fmt, Some(false));
        assert_eq!(config.generate.inline, None);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jade.toml");
        std::fs::write(&path, "[generate]\nformat = true\n").unwrap();

        assert!(load(Some(&path)).is_err());
    }

    #[test]
    fn test_missing_explicit_path() {
        let dir = TempDir::new().unwrap();
        assert!(load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jade.toml");
        std::fs::write(&path, "").unwrap();

        let config = load(Some(&path)).unwrap().unwrap();
        assert!(config.generate.out_dir.is_none());
    }
}
