//! `healthtrack` - A local heart-rate, medication and emergency-contact tracker
//!
//! This library provides account handling, SQLite-backed record storage,
//! heart-rate and adherence statistics, and the medication reminder loop
//! used by the `htrack` binary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod records;
pub mod reminder;
pub mod stats;
pub mod storage;

pub use auth::Auth;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use records::{EmergencyContact, HeartRateReading, Medication, User};
pub use reminder::{Notifier, Reminder, ReminderScheduler};
pub use storage::{Storage, StorageStats};
