use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Runtime configuration for the sound engine and its collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory sound assets are resolved against
    pub sound_dir: String,

    /// Playback volume (0.0-1.0)
    pub volume: f32,

    /// Fallback repeat cadence for channels that omit one
    pub default_repeat_interval_ms: u64,

    /// Active-order polling cadence in milliseconds
    pub poll_interval_ms: u64,

    /// Grace past the promised time before an order counts as overdue
    pub sla_grace_ms: u64,

    /// SLA check cadence in milliseconds
    pub sla_check_interval_ms: u64,

    /// Sound asset for the message-arrival chime
    pub message_sound: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sound_dir: "sounds".to_string(),
            volume: 0.8,
            default_repeat_interval_ms: 3000,
            poll_interval_ms: 15_000,
            sla_grace_ms: 120_000, // 2 minutes past the promised time
            sla_check_interval_ms: 30_000,
            message_sound: "new-message.mp3".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the platform config directory.
    /// Creates the default file if it doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;
            let config: Config =
                serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.display().to_string(),
                    source: Box::new(e),
                })?;
            config.validate()?;
            tracing::info!("Loaded config from: {}", path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            tracing::info!("Created default config at: {}", path.display());
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        fs::write(&path, json).map_err(|e| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        Ok(())
    }

    /// Validate field ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::Invalid(format!(
                "volume {} outside 0.0-1.0",
                self.volume
            )));
        }
        if !(500..=600_000).contains(&self.default_repeat_interval_ms) {
            return Err(ConfigError::Invalid(format!(
                "repeat interval {}ms outside 500-600000ms",
                self.default_repeat_interval_ms
            )));
        }
        if !(1000..=600_000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::Invalid(format!(
                "poll interval {}ms outside 1000-600000ms",
                self.poll_interval_ms
            )));
        }
        if !(1000..=600_000).contains(&self.sla_check_interval_ms) {
            return Err(ConfigError::Invalid(format!(
                "SLA check interval {}ms outside 1000-600000ms",
                self.sla_check_interval_ms
            )));
        }
        Ok(())
    }

    /// Get the config file path (in the platform config directory)
    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("orderbell")
            .join("config.json")
    }
}
