//! Host configuration: an optional TOML file plus command line overrides.

use directories::ProjectDirs;
use livesheet_core::SheetConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CliError, Result};

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub name_debounce_ms: Option<u64>,
    pub formula_debounce_ms: Option<u64>,
    pub removal_delay_ms: Option<u64>,
    pub storage_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn parse(path: &Path, content: &str) -> Result<ConfigFile> {
        toml::from_str(content).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn sheet_config(&self) -> SheetConfig {
        let defaults = SheetConfig::default();
        let ms = |value: Option<u64>, fallback: Duration| value.map_or(fallback, Duration::from_millis);
        SheetConfig {
            name_debounce: ms(self.name_debounce_ms, defaults.name_debounce),
            formula_debounce: ms(self.formula_debounce_ms, defaults.formula_debounce),
            removal_delay: ms(self.removal_delay_ms, defaults.removal_delay),
        }
    }
}

/// Resolved settings the driver runs with.
#[derive(Debug, PartialEq)]
pub struct Settings {
    pub sheet: SheetConfig,
    pub storage_dir: PathBuf,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "livesheet")
}

/// `<config dir>/livesheet/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|proj| proj.config_dir().join("config.toml"))
}

fn user_data_dir() -> Option<PathBuf> {
    project_dirs().map(|proj| proj.data_dir().to_path_buf())
}

/// Load the config file. An explicitly requested file must exist; the
/// per-user default is optional.
pub fn load_config(explicit: Option<&Path>, use_default: bool) -> Result<ConfigFile> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::MissingConfig(path.to_path_buf()));
            }
            path.to_path_buf()
        }
        None if use_default => match user_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(ConfigFile::default()),
        },
        None => return Ok(ConfigFile::default()),
    };

    log::debug!("loading config from {}", path.display());
    let content = std::fs::read_to_string(&path)?;
    ConfigFile::parse(&path, &content)
}

/// Merge the config file with a command line storage override.
/// Precedence: flag, then config file, then the per-user data dir.
pub fn resolve(file: &ConfigFile, storage_dir: Option<PathBuf>) -> Settings {
    let storage_dir = storage_dir
        .or_else(|| file.storage_dir.clone())
        .or_else(user_data_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    Settings {
        sheet: file.sheet_config(),
        storage_dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let file = ConfigFile::parse(Path::new("config.toml"), "").unwrap();
        assert_eq!(file, ConfigFile::default());
        assert_eq!(file.sheet_config(), SheetConfig::default());
    }

    #[test]
    fn test_partial_overrides() {
        let file = ConfigFile::parse(
            Path::new("config.toml"),
            "formula_debounce_ms = 40\nremoval_delay_ms = 0\n",
        )
        .unwrap();
        let config = file.sheet_config();
        assert_eq!(config.name_debounce, Duration::from_millis(250));
        assert_eq!(config.formula_debounce, Duration::from_millis(40));
        assert_eq!(config.removal_delay, Duration::ZERO);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = ConfigFile::parse(Path::new("bad.toml"), "debounce = 1\n").unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_storage_dir_precedence() {
        let file = ConfigFile {
            storage_dir: Some(PathBuf::from("/from/config")),
            ..ConfigFile::default()
        };
        let flag = resolve(&file, Some(PathBuf::from("/from/flag")));
        assert_eq!(flag.storage_dir, PathBuf::from("/from/flag"));

        let configured = resolve(&file, None);
        assert_eq!(configured.storage_dir, PathBuf::from("/from/config"));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(&missing), true).unwrap_err();
        assert!(matches!(err, CliError::MissingConfig(_)));
    }

    #[test]
    fn test_no_default_config() {
        assert_eq!(load_config(None, false).unwrap(), ConfigFile::default());
    }
}
