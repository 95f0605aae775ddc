//! Configuration file handling for ~/.cellwarden/config.ini.
//!
//! Loads and saves user configuration with sensible defaults, and turns it
//! into the typed settings each component takes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::settings::ConfigFile;
use crate::monitor::MonitorConfig;
use crate::preload::RateConfig;
use crate::service::ServiceConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.cellwarden/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        std::fs::write(path, self.to_config_string())
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// The commented INI text `save_to` writes.
    pub fn to_config_string(&self) -> String {
        super::writer::to_config_string(self)
    }

    /// Write the default config file at `path` unless one exists.
    ///
    /// Returns whether a file was written.
    pub fn ensure_exists_at(path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    pub fn rate_config(&self) -> RateConfig {
        RateConfig {
            cells_per_step: self.preload.cells_per_step,
            step_interval: Duration::from_millis(self.preload.step_interval_ms),
            settle_steps: self.preload.settle_steps,
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: Duration::from_secs(self.monitor.interval_secs),
            entity_limit: self.monitor.entity_limit,
            tile_entity_limit: self.monitor.tile_entity_limit,
            ticking_limit: self.monitor.ticking_limit,
            notify_cooldown: Duration::from_secs(self.monitor.notify_cooldown_secs),
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            default_radius: self.preload.default_radius,
            rate: self.rate_config(),
            slow_load_threshold: Duration::from_millis(self.registry.slow_load_threshold_ms),
            monitor_enabled: self.monitor.enabled,
            monitor: self.monitor_config(),
        }
    }
}

/// Get the path to the config directory (~/.cellwarden).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cellwarden")
}

/// Get the path to the config file (~/.cellwarden/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_default_converts_to_component_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.rate_config(), RateConfig::default());
        assert_eq!(config.monitor_config(), MonitorConfig::default());
        assert_eq!(config.service_config(), ServiceConfig::default());
    }

    #[test]
    fn test_service_config_carries_values() {
        let mut config = ConfigFile::default();
        config.preload.step_interval_ms = 5;
        config.registry.slow_load_threshold_ms = 40;
        config.monitor.enabled = false;

        let service = config.service_config();
        assert_eq!(service.rate.step_interval, Duration::from_millis(5));
        assert_eq!(service.slow_load_threshold, Duration::from_millis(40));
        assert!(!service.monitor_enabled);
    }

    #[test]
    fn test_ensure_exists_at() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.ini");

        assert!(ConfigFile::ensure_exists_at(&path).unwrap());
        assert!(path.exists());
        assert!(!ConfigFile::ensure_exists_at(&path).unwrap());
    }

    #[test]
    fn test_invalid_file_reports_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        std::fs::write(&path, "[registry]\nslow_load_threshold_ms = fast\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("registry.slow_load_threshold_ms"));
    }

    #[test]
    fn test_config_file_path() {
        assert!(config_file_path().ends_with(".cellwarden/config.ini"));
    }
}
