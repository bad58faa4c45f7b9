//! # Configuration
//!
//! TOML configuration for the `liferpg` binary. Every section is optional and falls
//! back to its defaults, so an empty file is a valid configuration.
//!
//! ```toml
//! [player]
//! default_name = "Adventurer"
//!
//! [storage]
//! data_dir = "./data"
//! save_file = "player.json"
//!
//! [map]
//! width = 800.0
//! height = 500.0
//!
//! [notifications]
//! enabled = true
//! duration_secs = 3
//!
//! [logging]
//! level = "warn"
//! file = "liferpg.log"
//! ```
//!
//! ```rust,no_run
//! use liferpg::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("Saving to {}", config.save_path().display());
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

use crate::game::{MapExtent, PlayerStore, DEFAULT_PLAYER_NAME, DEFAULT_SAVE_FILE};
use crate::validation::{validate_name, MAX_NAME_LENGTH};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Name given to a newly created character by `liferpg init`.
    pub default_name: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub save_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            save_file: DEFAULT_SAVE_FILE.to_string(),
        }
    }
}

/// Pixel size of the map the console pins locations on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        let extent = MapExtent::default();
        Self {
            width: extent.width,
            height: extent.height,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    /// Seconds a notification stays visible before it fades.
    pub duration_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_secs: 3,
        }
    }
}

impl NotificationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content =
            toml::to_string_pretty(&config).map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the rest of the program cannot work with.
    pub fn validate(&self) -> Result<()> {
        validate_name("player.default_name", &self.player.default_name)
            .map_err(|e| anyhow!("{} (max {} characters)", e, MAX_NAME_LENGTH))?;
        if self.storage.save_file.trim().is_empty() {
            return Err(anyhow!("storage.save_file cannot be empty"));
        }
        if !(self.map.width.is_finite() && self.map.width > 0.0 && self.map.height.is_finite() && self.map.height > 0.0) {
            return Err(anyhow!(
                "map dimensions must be positive (got {}x{})",
                self.map.width,
                self.map.height
            ));
        }
        if self.notifications.enabled && self.notifications.duration_secs == 0 {
            return Err(anyhow!("notifications.duration_secs must be at least 1"));
        }
        Ok(())
    }

    pub fn save_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join(&self.storage.save_file)
    }

    pub fn map_extent(&self) -> MapExtent {
        MapExtent::new(self.map.width, self.map.height)
    }

    /// Player store configured for this file's save location and map size.
    pub fn player_store(&self) -> PlayerStore {
        PlayerStore::open(self.save_path()).with_extent(self.map_extent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str("[storage]\ndata_dir = \"/tmp/rpg\"\n").unwrap();
        assert_eq!(config.storage.save_file, "player.json");
        assert_eq!(config.save_path(), PathBuf::from("/tmp/rpg/player.json"));
        assert_eq!(config.notifications.duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_rejects_degenerate_map() {
        let mut config = Config::default();
        config.map.width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_blank_default_name() {
        let mut config = Config::default();
        config.player.default_name = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_serde() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, Config::default());
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();
        let config = Config::load(path).await.unwrap();
        assert_eq!(config.map_extent(), MapExtent::default());
    }
}
