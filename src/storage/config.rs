//! Configuration handling for rune
//!
//! Directories are resolved in order:
//! 1. `RUNE_PLUGIN` / `RUNE_REPO` environment variables
//! 2. `config.toml` in the platform config directory (or `RUNE_CONFIG`)
//! 3. `plugins/` and `scripts/` under the platform data directory

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const PLUGIN_DIR_ENV: &str = "RUNE_PLUGIN";
pub const SCRIPT_DIR_ENV: &str = "RUNE_REPO";
pub const CONFIG_FILE_ENV: &str = "RUNE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Could not determine a data directory; set RUNE_PLUGIN and RUNE_REPO")]
    NoDataDir,
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigFile {
    /// Directory scanned for `*.lua` plugins
    pub plugin_dir: Option<PathBuf>,

    /// Directory scanned for runnable scripts
    pub script_dir: Option<PathBuf>,
}

/// Resolved runtime directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub plugin_dir: PathBuf,
    pub script_dir: PathBuf,
}

impl Config {
    /// Loads configuration from the environment and default locations
    pub fn load() -> Result<Self> {
        let file = match Self::config_path() {
            Some(path) => Self::load_file(&path)?,
            None => ConfigFile::default(),
        };

        let config = Self::resolve(file, |key| std::env::var(key).ok(), Self::data_dir())?;
        debug!(
            plugin_dir = %config.plugin_dir.display(),
            script_dir = %config.script_dir.display(),
            "configuration resolved"
        );
        Ok(config)
    }

    /// Applies the precedence rules to already-gathered inputs
    pub fn resolve(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let from_env = |key: &str| env(key).filter(|v| !v.is_empty()).map(PathBuf::from);

        let plugin_dir = from_env(PLUGIN_DIR_ENV).or(file.plugin_dir);
        let script_dir = from_env(SCRIPT_DIR_ENV).or(file.script_dir);

        let default_under = |leaf: &str| {
            data_dir
                .as_ref()
                .map(|dir| dir.join(leaf))
                .ok_or(ConfigError::NoDataDir)
        };

        Ok(Self {
            plugin_dir: match plugin_dir {
                Some(dir) => dir,
                None => default_under("plugins")?,
            },
            script_dir: match script_dir {
                Some(dir) => dir,
                None => default_under("scripts")?,
            },
        })
    }

    /// Path of the config file: `RUNE_CONFIG`, else the platform config dir
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_FILE_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Platform data directory (`~/.local/share/rune` on Linux)
    pub fn data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "rune")
    }

    /// Reads a config file; a missing file is an empty configuration
    pub fn load_file(path: &Path) -> Result<ConfigFile> {
        if !path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let file = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(file)
    }

    /// Creates the plugin and script directories if needed
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.plugin_dir, &self.script_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }
}
