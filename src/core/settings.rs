//! Helper settings resolution from CLI/env values and the config file.

use crate::constants;
use crate::models::helper_config::HelperConfigFile;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub gopass_bin: String,
    pub store_dir: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings. Explicit values (CLI flag or env var) win over the
    /// config file, which wins over defaults.
    ///
    /// An explicit `config_path` must exist; the default location is
    /// skipped when absent.
    pub fn resolve(
        gopass_bin: Option<String>,
        store_dir: Option<PathBuf>,
        config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let file = match config_path {
            Some(path) => load(&path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => load(&path)?,
                _ => HelperConfigFile::default(),
            },
        };
        Ok(Self::merge(gopass_bin, store_dir, file))
    }

    fn merge(gopass_bin: Option<String>, store_dir: Option<PathBuf>, file: HelperConfigFile) -> Self {
        Self {
            gopass_bin: gopass_bin
                .or(file.gopass_bin)
                .unwrap_or_else(|| constants::DEFAULT_GOPASS_BIN.to_string()),
            store_dir: store_dir.or(file.store_dir),
        }
    }
}

/// `<user config dir>/docker-credential-gopass/config.toml`, if a config dir exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(constants::CONFIG_RELATIVE_PATH))
}

pub fn load(path: &Path) -> Result<HelperConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read helper config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parse helper config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let s = Settings::merge(None, None, HelperConfigFile::default());
        assert_eq!(s.gopass_bin, "gopass");
        assert_eq!(s.store_dir, None);
    }

    #[test]
    fn test_file_values_used() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "gopass_bin = \"/opt/gopass\"\nstore_dir = \"/srv/store\"\n");
        let s = Settings::resolve(None, None, Some(path)).unwrap();
        assert_eq!(s.gopass_bin, "/opt/gopass");
        assert_eq!(s.store_dir, Some(PathBuf::from("/srv/store")));
    }

    #[test]
    fn test_explicit_values_win() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "gopass_bin = \"/opt/gopass\"\nstore_dir = \"/srv/store\"\n");
        let s = Settings::resolve(
            Some("my-gopass".into()),
            Some(PathBuf::from("/elsewhere")),
            Some(path),
        )
        .unwrap();
        assert_eq!(s.gopass_bin, "my-gopass");
        assert_eq!(s.store_dir, Some(PathBuf::from("/elsewhere")));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Settings::resolve(None, None, Some(dir.path().join("nope.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("read helper config"));
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "gopass_bin = [");
        let err = Settings::resolve(None, None, Some(path)).unwrap_err();
        assert!(format!("{:#}", err).contains("parse helper config"));
    }
}
