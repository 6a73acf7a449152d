//! Configuration management for healthtrack.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::records::parse_time_of_day;
use crate::stats::heart_rate::BandThresholds;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "healthtrack";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "health.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `HEALTHTRACK_`)
/// 2. TOML config file at `~/.config/healthtrack/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Heart-rate classification and validation.
    pub heart_rate: HeartRateConfig,
    /// Medication reminder configuration.
    pub reminders: ReminderConfig,
    /// Account configuration.
    pub auth: AuthConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/healthtrack/health.db`
    pub database_path: Option<PathBuf>,
}

/// Heart-rate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRateConfig {
    /// Readings below this are classified as bradycardia.
    pub low_bpm: u32,
    /// Readings above this are classified as tachycardia.
    pub high_bpm: u32,
    /// Smallest bpm accepted when recording a reading.
    pub min_valid_bpm: u32,
    /// Largest bpm accepted when recording a reading.
    pub max_valid_bpm: u32,
}

/// Reminder-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Run the reminder loop at all.
    pub enabled: bool,
    /// Seconds between schedule checks.
    pub check_interval_secs: u64,
    /// Time of day (`HH:MM`) at which unrecorded doses are marked missed.
    pub end_of_day: String,
    /// Deliver reminders as desktop notifications (otherwise log only).
    pub desktop_notifications: bool,
}

/// Account-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Country calling code prepended to bare 10-digit phone numbers.
    pub country_code: String,
    /// Minimum password length at signup.
    pub min_password_length: usize,
}

impl Default for HeartRateConfig {
    fn default() -> Self {
        Self {
            low_bpm: 60,
            high_bpm: 100,
            min_valid_bpm: 20,
            max_valid_bpm: 250,
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: 60,
            end_of_day: "23:59".to_string(),
            desktop_notifications: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            country_code: "+91".to_string(),
            min_password_length: 6,
        }
    }
}

impl HeartRateConfig {
    /// The classification thresholds as used by the stats module.
    #[must_use]
    pub fn thresholds(&self) -> BandThresholds {
        BandThresholds {
            low: self.low_bpm,
            high: self.high_bpm,
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
            .merge(Env::prefixed("HEALTHTRACK_").split("__"));

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
        let hr = &self.heart_rate;
        if hr.low_bpm > hr.high_bpm {
            return Err(Error::ConfigValidation {
                message: format!(
                    "low_bpm ({}) cannot be greater than high_bpm ({})",
                    hr.low_bpm, hr.high_bpm
                ),
            });
        }

        if hr.min_valid_bpm == 0 || hr.min_valid_bpm > hr.max_valid_bpm {
            return Err(Error::ConfigValidation {
                message: format!(
                    "valid bpm range {}..={} is empty or starts at zero",
                    hr.min_valid_bpm, hr.max_valid_bpm
                ),
            });
        }

        if self.reminders.check_interval_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "check_interval_secs must be greater than 0".to_string(),
            });
        }

        if parse_time_of_day(&self.reminders.end_of_day).is_none() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "end_of_day must be HH:MM, got '{}'",
                    self.reminders.end_of_day
                ),
            });
        }

        let code = &self.auth.country_code;
        let digits = code.strip_prefix('+').unwrap_or("");
        if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::ConfigValidation {
                message: format!("country_code must look like '+91', got '{code}'"),
            });
        }

        if self.auth.min_password_length == 0 {
            return Err(Error::ConfigValidation {
                message: "min_password_length must be greater than 0".to_string(),
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

    /// Get the reminder check interval as a Duration.
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.reminders.check_interval_secs)
    }

    /// Get the end-of-day sweep time.
    ///
    /// Falls back to midnight minus one minute if the configured value does
    /// not parse; `validate` rejects such values on load.
    #[must_use]
    pub fn end_of_day(&self) -> NaiveTime {
        parse_time_of_day(&self.reminders.end_of_day)
            .or_else(|| NaiveTime::from_hms_opt(23, 59, 0))
            .unwrap_or(NaiveTime::MIN)
    }
}
