//! Storage layer for healthtrack.
//!
//! This module provides `SQLite`-based persistent storage for accounts,
//! heart-rate readings, medications with their dose logs, emergency
//! contacts and the small preferences table that also holds the session.
//!
//! Every read and write of user-owned data is scoped by `user_id`: an
//! update or delete aimed at another user's row affects nothing and
//! reports `false`.

mod contacts;
mod medications;
pub mod migrations;
mod preferences;
mod readings;
pub mod schema;
mod users;

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Type;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use preferences::SESSION_KEY;

/// Column format for local date-times.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Column format for calendar dates.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
/// Column format for times of day.
pub(crate) const TIME_FORMAT: &str = "%H:%M";

/// Storage engine for health records.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get row counts per table and the database file size.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            users: self.count_rows("users")?,
            readings: self.count_rows("heart_rates")?,
            medications: self.count_rows("medications")?,
            dose_records: self.count_rows("dose_records")?,
            contacts: self.count_rows("contacts")?,
            db_size_bytes,
        })
    }

    fn count_rows(&self, table: &'static str) -> Result<i64> {
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    /// Number of accounts.
    pub users: i64,
    /// Number of heart-rate readings.
    pub readings: i64,
    /// Number of medications.
    pub medications: i64,
    /// Number of dose log entries.
    pub dose_records: i64,
    /// Number of emergency contacts.
    pub contacts: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

pub(crate) fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub(crate) fn format_time(value: NaiveTime) -> String {
    value.format(TIME_FORMAT).to_string()
}

/// Wrap a parse failure for column `idx` as a row conversion error.
fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn parse_datetime_column(idx: usize, value: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn parse_date_column(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn parse_time_column(idx: usize, value: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|e| conversion_error(idx, e))
}
