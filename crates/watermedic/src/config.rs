//! Configuration management for watermedic.
//!
//! Configuration is loaded with figment from defaults, a TOML file and
//! environment variables.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ledger::GLASS_SIZE_ML;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "watermedic";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "hydration.db";

/// Longest allowed rollover check period, one day.
const MAX_ROLLOVER_CHECK_MINUTES: u32 = 24 * 60;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `WATERMEDIC_`, sections split on `__`)
/// 2. TOML config file at `~/.config/watermedic/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Tracker configuration.
    pub tracker: TrackerConfig,
    /// Reminder configuration.
    pub reminders: ReminderConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/watermedic/hydration.db`
    pub database_path: Option<PathBuf>,
}

/// Intake tracking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Amount added or removed when no explicit amount is given, in ml.
    pub step_ml: u32,
    /// How often watch mode checks for a new day, in minutes.
    pub rollover_check_minutes: u32,
}

/// Reminder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Whether the host allows reminder notifications.
    pub notifications_allowed: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            step_ml: GLASS_SIZE_ML,
            rollover_check_minutes: 60,
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            notifications_allowed: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("WATERMEDIC_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.tracker.step_ml == 0 {
            return Err(Error::ConfigValidation {
                message: "step_ml must be greater than 0".to_string(),
            });
        }

        if self.tracker.rollover_check_minutes == 0
            || self.tracker.rollover_check_minutes > MAX_ROLLOVER_CHECK_MINUTES
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "rollover_check_minutes must be between 1 and {MAX_ROLLOVER_CHECK_MINUTES}, got {}",
                    self.tracker.rollover_check_minutes
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the rollover check period as a Duration.
    #[must_use]
    pub fn rollover_check_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.tracker.rollover_check_minutes) * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.tracker.step_ml, 250);
        assert_eq!(config.tracker.rollover_check_minutes, 60);
        assert!(config.reminders.notifications_allowed);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_step() {
        let mut config = Config::default();
        config.tracker.step_ml = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("step_ml"));
    }

    #[test]
    fn test_validate_rollover_bounds() {
        let mut config = Config::default();
        config.tracker.rollover_check_minutes = 0;
        assert!(config.validate().is_err());

        config.tracker.rollover_check_minutes = 24 * 60 + 1;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("rollover_check_minutes"));

        config.tracker.rollover_check_minutes = 24 * 60;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("hydration.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_rollover_check_interval() {
        let config = Config::default();
        assert_eq!(config.rollover_check_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn test_default_paths() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("watermedic"));
        assert!(path.to_string_lossy().contains("config.toml"));
        assert!(Config::default_data_dir()
            .to_string_lossy()
            .contains("watermedic"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "watermedic_config_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[tracker]\nstep_ml = 330\n\n[reminders]\nnotifications_allowed = false\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.tracker.step_ml, 330);
        assert_eq!(config.tracker.rollover_check_minutes, 60);
        assert!(!config.reminders.notifications_allowed);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!(
            "watermedic_config_invalid_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[tracker]\nstep_ml = 0\n").unwrap();

        let result = Config::load_from(Some(path.clone()));
        let _ = std::fs::remove_file(&path);

        assert!(result.is_err());
    }

    #[test]
    fn test_tracker_config_deserialize() {
        let json = r#"{"step_ml": 500}"#;
        let tracker: TrackerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(tracker.step_ml, 500);
        assert_eq!(tracker.rollover_check_minutes, 60);
    }
}
