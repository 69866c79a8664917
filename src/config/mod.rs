//! # Configuration
//!
//! A single TOML file with three sections:
//!
//! - [`GameConfig`] - cooldowns, regeneration, breakthrough bonus, leaderboard
//!   size and an optional catalog file
//! - [`StorageConfig`] - where the player database and snapshots live
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ```toml
//! [game]
//! regen_interval_secs = 5
//! breakthrough_power_bonus = 50
//! leaderboard_size = 20
//!
//! [game.cooldowns]
//! meditation_secs = 60
//! herb_gathering_secs = 180
//! mining_secs = 120
//! dungeon_secs = 600
//!
//! [storage]
//! data_dir = "./data"
//! snapshot_keep = 10
//!
//! [logging]
//! level = "info"
//! file = "xiuxian.log"
//! ```
//!
//! Every key has a default, so a partial file is valid.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::game::catalog::Catalog;
use crate::game::rules::GameRules;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(flatten)]
    pub rules: GameRules,
    /// JSON catalog overriding the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Player database; defaults to `<data_dir>/xiuxian.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
    /// Defaults to `<data_dir>/snapshots`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<String>,
    /// Snapshots kept by `snapshot prune`.
    #[serde(default = "default_snapshot_keep")]
    pub snapshot_keep: usize,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_snapshot_keep() -> usize {
    10
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_path: None,
            snapshot_dir: None,
            snapshot_keep: default_snapshot_keep(),
        }
    }
}

impl StorageConfig {
    pub fn db_path(&self) -> PathBuf {
        match &self.db_path {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(&self.data_dir).join("xiuxian.db"),
        }
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        match &self.snapshot_dir {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(&self.data_dir).join("snapshots"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: Some("xiuxian.log".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config
            .validate()
            .map_err(|e| anyhow!("Invalid config file {}: {}", path, e))?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            log::debug!("config file {} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.game.rules.validate().map_err(|e| anyhow!(e))?;
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        if self.storage.snapshot_keep == 0 {
            return Err(anyhow!("storage.snapshot_keep must be at least 1"));
        }
        if log_level_filter(&self.logging.level).is_none() {
            return Err(anyhow!("unknown logging.level '{}'", self.logging.level));
        }
        Ok(())
    }

    /// The configured catalog file, or the built-in catalog.
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.game.catalog_path {
            Some(path) => Catalog::load_json(path)
                .map_err(|e| anyhow!("Failed to load catalog {}: {}", path, e)),
            None => Ok(Catalog::builtin()),
        }
    }
}

/// Maps a config level name onto a filter.
pub fn log_level_filter(level: &str) -> Option<log::LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "off" => Some(log::LevelFilter::Off),
        "error" => Some(log::LevelFilter::Error),
        "warn" => Some(log::LevelFilter::Warn),
        "info" => Some(log::LevelFilter::Info),
        "debug" => Some(log::LevelFilter::Debug),
        "trace" => Some(log::LevelFilter::Trace),
        _ => None,
    }
}
