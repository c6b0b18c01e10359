//! Locating and reading the TOML configuration file.

use super::builder::ConfigBuilder;
use super::file::ConfigFile;
use crate::core::error::{AppError, Result};
use std::fs;
use std::path::Path;

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "email-vetter.toml";

/// Reads and parses a configuration file.
pub fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
    })?;
    ConfigFile::from_toml_str(&content).map_err(|e| {
        AppError::Config(format!("Failed to parse config file '{}': {}", path.display(), e))
    })
}

/// Starts a [`ConfigBuilder`] from defaults plus the config file, if any.
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is used
/// when present in the working directory and silently skipped otherwise.
pub fn load_config(path: Option<&str>) -> Result<ConfigBuilder> {
    let builder = ConfigBuilder::new();

    let chosen = match path {
        Some(p) => Some(p.to_string()),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Some(DEFAULT_CONFIG_FILE.to_string()),
        None => None,
    };

    match chosen {
        Some(p) => {
            let file = read_config_file(Path::new(&p))?;
            tracing::info!(target: "config", "Loaded configuration from {}", p);
            Ok(builder.with_config_file(file, Some(p)))
        }
        None => {
            tracing::debug!(target: "config", "No configuration file found, using defaults");
            Ok(builder)
        }
    }
}
