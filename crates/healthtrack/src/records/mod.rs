//! Core record types for healthtrack.
//!
//! Users own heart-rate readings, medications (each with a per-day dose log)
//! and emergency contacts. Timestamps are local wall-clock values: every
//! bucketing rule in [`crate::stats`] works on calendar dates as the user
//! sees them.

mod contact;
mod medication;
mod reading;
mod user;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};

pub use contact::{EmergencyContact, NewContact};
pub use medication::{DoseRecord, MealTiming, MealType, Medication, NewMedication};
pub use reading::HeartRateReading;
pub use user::User;

/// Parse a time of day written as `HH:MM`.
#[must_use]
pub fn parse_time_of_day(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M").ok()
}

/// Parse a local date-time written as `YYYY-MM-DD HH:MM` or `YYYY-MM-DDTHH:MM`
/// (seconds optional).
///
/// # Errors
///
/// Returns a validation error naming `field` if the input matches no format.
pub fn parse_local_datetime(field: &'static str, input: &str) -> Result<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ];
    let input = input.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| {
            Error::validation(field, format!("expected YYYY-MM-DD HH:MM, got '{input}'"))
        })
}

/// Parse a calendar date written as `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns a validation error naming `field` if the input is not a date.
pub fn parse_date(field: &'static str, input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| Error::validation(field, format!("expected YYYY-MM-DD, got '{input}'")))
}

/// Reject empty (after trimming) required text fields.
pub(crate) fn require(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(trimmed.to_string())
}
