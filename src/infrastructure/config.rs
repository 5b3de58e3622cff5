//! Configuration infrastructure
//!
//! Loading and management of the harvester configuration. The configuration
//! is an immutable value constructed once at startup and passed into each
//! component; nothing reads it through global state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

/// Built-in defaults, kept in one place so the config file and the
/// documentation cannot drift apart.
pub mod defaults {
    pub const OUTPUT_FILE: &str = "products_data.json";
    pub const BACKUP_DIR: &str = "backups";
    pub const AUTOSAVE_THRESHOLD: u32 = 100;
    pub const PROGRESS_UPDATE_INTERVAL_SECS: u64 = 3;
    pub const MAX_SCROLL_ATTEMPTS: u32 = 100;
    pub const NO_NEW_THRESHOLD: u32 = 3;
    pub const SCROLL_PAUSE_MS: u64 = 1200;
    pub const TOTAL_ESTIMATE: u64 = 400;
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
}

/// Complete harvester configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvesterConfig {
    /// Canonical output path for the persisted record collection.
    pub output_file: PathBuf,

    /// Directory for backup and error snapshots.
    pub backup_dir: PathBuf,

    /// Newly accepted records between checkpoints.
    pub autosave_threshold: u32,

    /// Seconds between throttled progress reports.
    pub progress_update_interval_secs: u64,

    /// Hard ceiling on extraction passes.
    pub max_scroll_attempts: u32,

    /// Consecutive empty passes before stopping.
    pub no_new_threshold: u32,

    /// Milliseconds to wait after each viewport advance.
    pub scroll_pause_ms: u64,

    /// Fallback total estimate when the source reports none.
    pub total_estimate: u64,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output (non-blocking appender under `logs/`)
    pub file_output: bool,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(defaults::OUTPUT_FILE),
            backup_dir: PathBuf::from(defaults::BACKUP_DIR),
            autosave_threshold: defaults::AUTOSAVE_THRESHOLD,
            progress_update_interval_secs: defaults::PROGRESS_UPDATE_INTERVAL_SECS,
            max_scroll_attempts: defaults::MAX_SCROLL_ATTEMPTS,
            no_new_threshold: defaults::NO_NEW_THRESHOLD,
            scroll_pause_ms: defaults::SCROLL_PAUSE_MS,
            total_estimate: defaults::TOTAL_ESTIMATE,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
        }
    }
}

/// Configuration manager for loading and saving settings.
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Default configuration directory under the user's config root.
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("inventory-harvester");

        Ok(config_dir)
    }

    /// Create a manager pointing at the default configuration path.
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        let config_path = config_dir.join("harvester_config.json");

        Ok(Self { config_path })
    }

    /// Create a manager for an explicit configuration path.
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating the default on first run.
    ///
    /// A corrupt file is backed up to `*.json.corrupted` and replaced with
    /// defaults rather than blocking startup.
    pub async fn load_config(&self) -> Result<HarvesterConfig> {
        if !self.config_path.exists() {
            info!(
                "Configuration file not found, creating default: {:?}",
                self.config_path
            );
            let default_config = HarvesterConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<HarvesterConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("Configuration file is invalid: {}", parse_error);

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to back up corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = HarvesterConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;
                info!("Reset to default configuration");
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file.
    pub async fn save_config(&self, config: &HarvesterConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("harvester_config.json"));

        let config = manager.load_config().await.unwrap();
        assert_eq!(config.autosave_threshold, defaults::AUTOSAVE_THRESHOLD);
        assert!(manager.config_path.exists());
    }

    #[tokio::test]
    async fn corrupt_config_is_backed_up_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harvester_config.json");
        std::fs::write(&path, "{not json").unwrap();

        let manager = ConfigManager::with_path(&path);
        let config = manager.load_config().await.unwrap();

        assert_eq!(config.no_new_threshold, defaults::NO_NEW_THRESHOLD);
        assert!(path.with_extension("json.corrupted").exists());
    }

    #[tokio::test]
    async fn saved_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("harvester_config.json"));

        let config = HarvesterConfig {
            max_scroll_attempts: 7,
            ..HarvesterConfig::default()
        };
        manager.save_config(&config).await.unwrap();

        let loaded = manager.load_config().await.unwrap();
        assert_eq!(loaded.max_scroll_attempts, 7);
    }
}
