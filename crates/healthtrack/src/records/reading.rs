use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::HeartRateConfig;
use crate::error::{Error, Result};

/// A single heart-rate measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateReading {
    /// Unique identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Owning user.
    pub user_id: i64,

    /// Beats per minute.
    pub bpm: u32,

    /// Local wall-clock time of the measurement.
    pub recorded_at: NaiveDateTime,
}

impl HeartRateReading {
    /// Create a reading without range checks.
    #[must_use]
    pub fn new(user_id: i64, bpm: u32, recorded_at: NaiveDateTime) -> Self {
        Self {
            id: None,
            user_id,
            bpm,
            recorded_at,
        }
    }

    /// Create a reading, rejecting bpm values outside the configured range.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `bpm` is out of range.
    pub fn checked(
        user_id: i64,
        bpm: u32,
        recorded_at: NaiveDateTime,
        config: &HeartRateConfig,
    ) -> Result<Self> {
        Self::check_bpm(bpm, config)?;
        Ok(Self::new(user_id, bpm, recorded_at))
    }

    /// Validate a bpm value against the configured range.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `bpm` is out of range.
    pub fn check_bpm(bpm: u32, config: &HeartRateConfig) -> Result<()> {
        if (config.min_valid_bpm..=config.max_valid_bpm).contains(&bpm) {
            Ok(())
        } else {
            Err(Error::validation(
                "bpm",
                format!(
                    "must be between {} and {}, got {bpm}",
                    config.min_valid_bpm, config.max_valid_bpm
                ),
            ))
        }
    }

    /// Calendar date of the measurement.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.recorded_at.date()
    }

    /// `HH:MM` label of the measurement time.
    #[must_use]
    pub fn time_label(&self) -> String {
        self.recorded_at.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_checked_accepts_in_range() {
        let reading = HeartRateReading::checked(1, 72, at(9, 0), &HeartRateConfig::default());
        assert_eq!(reading.unwrap().bpm, 72);
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        let config = HeartRateConfig::default();
        assert!(HeartRateReading::checked(1, 19, at(9, 0), &config).is_err());
        assert!(HeartRateReading::checked(1, 251, at(9, 0), &config).is_err());
        assert!(HeartRateReading::checked(1, 20, at(9, 0), &config).is_ok());
        assert!(HeartRateReading::checked(1, 250, at(9, 0), &config).is_ok());
    }

    #[test]
    fn test_date_and_label() {
        let reading = HeartRateReading::new(1, 80, at(7, 5));
        assert_eq!(reading.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(reading.time_label(), "07:05");
    }

    #[test]
    fn test_serialization_skips_missing_id() {
        let reading = HeartRateReading::new(3, 64, at(12, 0));
        let json = serde_json::to_string(&reading).unwrap();
        assert!(!json.contains("\"id\""));
        assert!(json.contains("\"bpm\":64"));
    }
}
