//! Error types for healthtrack.
//!
//! This module defines all error types used throughout the healthtrack crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for healthtrack operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Input Errors ===
    /// User-supplied data failed validation.
    #[error("invalid {field}: {message}")]
    Validation {
        /// The field that failed validation.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    // === Account Errors ===
    /// An account with the same email or phone already exists.
    #[error("an account with this {field} already exists")]
    AlreadyExists {
        /// Which unique field collided (`email` or `phone`).
        field: &'static str,
    },

    /// No account matches the given email or phone.
    #[error("no account found for '{identifier}'")]
    UserNotFound {
        /// The email or phone used to look up the account.
        identifier: String,
    },

    /// The password did not match the stored credential.
    #[error("invalid password")]
    InvalidCredentials,

    /// The command needs a logged-in user.
    #[error("not logged in; run `htrack account login` first")]
    NotLoggedIn,

    /// Hashing or verifying a password failed.
    #[error("credential error: {0}")]
    Credential(String),

    // === Record Errors ===
    /// A record does not exist or is not owned by the current user.
    #[error("{kind} {id} not found")]
    NotFound {
        /// The kind of record (e.g. "medication").
        kind: &'static str,
        /// The record id.
        id: i64,
    },

    // === Reminder Errors ===
    /// Delivering a reminder notification failed.
    #[error("failed to deliver notification: {0}")]
    Notification(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for healthtrack operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error for the given field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a not-found error for a record kind and id.
    #[must_use]
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    /// Create a new notification delivery error.
    #[must_use]
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error was caused by invalid user input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error is an authentication or session problem.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists { .. }
                | Self::UserNotFound { .. }
                | Self::InvalidCredentials
                | Self::NotLoggedIn
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidCredentials;
        assert_eq!(err.to_string(), "invalid password");

        let err = Error::validation("bpm", "must be between 20 and 250");
        assert_eq!(err.to_string(), "invalid bpm: must be between 20 and 250");
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("medication", 42);
        assert_eq!(err.to_string(), "medication 42 not found");
    }

    #[test]
    fn test_already_exists_display() {
        let err = Error::AlreadyExists { field: "email" };
        assert_eq!(err.to_string(), "an account with this email already exists");
    }

    #[test]
    fn test_user_not_found_display() {
        let err = Error::UserNotFound {
            identifier: "a@b.io".to_string(),
        };
        assert!(err.to_string().contains("a@b.io"));
    }

    #[test]
    fn test_is_validation() {
        assert!(Error::validation("phone", "too short").is_validation());
        assert!(!Error::InvalidCredentials.is_validation());
    }

    #[test]
    fn test_is_auth_error() {
        assert!(Error::NotLoggedIn.is_auth_error());
        assert!(Error::InvalidCredentials.is_auth_error());
        assert!(Error::AlreadyExists { field: "phone" }.is_auth_error());
        assert!(!Error::internal("x").is_auth_error());
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_notification_error() {
        let err = Error::notification("notify-send not found");
        assert_eq!(
            err.to_string(),
            "failed to deliver notification: notify-send not found"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "low_bpm must be below high_bpm".to_string(),
        };
        assert!(err.to_string().contains("low_bpm"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
