//! Application configuration loaded from `config.toml` and `ROUNDS_*` variables.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "rounds";

const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "ROUNDS";

/// Runtime settings for the game store and its front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding game files and the player index.
    pub data_dir: PathBuf,
    /// Directory receiving log files.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` (optional) overlaid with `ROUNDS_*` variables.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let defaults = Self::default();
        let settings = ::config::Config::builder()
            .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
            .set_default("log_dir", defaults.log_dir.to_string_lossy().into_owned())?
            .add_source(::config::File::from(path.clone()).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("failed to parse configuration")
    }
}

/// Location of the user's configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Default game data directory, `<data dir>/rounds/gameData`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("gameData")
}

/// Write a commented default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    let path = config_path();
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let defaults = AppConfig::default();
    let contents = format!(
        "# Rounds configuration. Every key can be overridden with ROUNDS_<KEY>.\n\
         data_dir = {:?}\n\
         log_dir = {:?}\n",
        defaults.data_dir.to_string_lossy(),
        defaults.log_dir.to_string_lossy(),
    );
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}
