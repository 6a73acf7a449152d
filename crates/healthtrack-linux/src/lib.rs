//! Linux desktop notifications for healthtrack.
//!
//! Notifications are sent through `notify-send` from libnotify, which talks
//! to whatever notification daemon the desktop session runs.

#![cfg(target_os = "linux")]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

const NOTIFY_SEND: &str = "notify-send";
const APP_NAME: &str = "healthtrack";

/// Errors from sending a desktop notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// `notify-send` is not installed or could not be started.
    #[error("failed to run notify-send: {0}")]
    Spawn(#[from] io::Error),

    /// `notify-send` ran but reported failure.
    #[error("notify-send exited with {status}: {stderr}")]
    Failed {
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
}

/// Initialize Linux-specific components.
///
/// # Errors
///
/// Returns an error if initialization fails.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    debug!(available = is_available(), "Linux notifications initialized");
    Ok(())
}

/// Get the platform name.
#[must_use]
pub fn platform_name() -> &'static str {
    "Linux"
}

/// Whether `notify-send` can be started.
#[must_use]
pub fn is_available() -> bool {
    Command::new(NOTIFY_SEND)
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

fn notify_args(title: &str, body: &str) -> Vec<String> {
    vec![
        format!("--app-name={APP_NAME}"),
        "--urgency=normal".to_string(),
        "--".to_string(),
        title.to_string(),
        body.to_string(),
    ]
}

/// Show a desktop notification.
///
/// # Errors
///
/// Returns [`NotificationError`] if `notify-send` is missing or fails.
pub fn notify(title: &str, body: &str) -> Result<(), NotificationError> {
    let output = Command::new(NOTIFY_SEND)
        .args(notify_args(title, body))
        .output()?;

    if !output.status.success() {
        return Err(NotificationError::Failed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    debug!(title, "Desktop notification sent");
    Ok(())
}
