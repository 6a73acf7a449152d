//! macOS desktop notifications for healthtrack.
//!
//! Notifications are posted through AppleScript's `display notification`,
//! run with `osascript`.

#![cfg(target_os = "macos")]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors from posting a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// `osascript` could not be started.
    #[error("failed to run osascript: {0}")]
    Spawn(#[from] io::Error),

    /// The script ran but reported failure.
    #[error("osascript exited with {status}: {stderr}")]
    Failed {
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
}

/// Initialize macOS-specific components.
///
/// # Errors
///
/// Returns an error if initialization fails.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Initializing macOS platform components");
    Ok(())
}

/// Get the platform name.
#[must_use]
pub fn platform_name() -> &'static str {
    "macOS"
}

/// Quote `text` as an AppleScript string literal.
fn applescript_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' | '\r' => quoted.push(' '),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn notification_script(title: &str, body: &str) -> String {
    format!(
        "display notification {} with title {} sound name \"default\"",
        applescript_string(body),
        applescript_string(title)
    )
}

/// Post a notification to Notification Center.
///
/// # Errors
///
/// Returns [`NotificationError`] if `osascript` fails.
pub fn notify(title: &str, body: &str) -> Result<(), NotificationError> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(notification_script(title, body))
        .output()?;

    if !output.status.success() {
        return Err(NotificationError::Failed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    debug!(title, "Notification posted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
    }

    #[test]
    fn test_platform_name() {
        assert_eq!(platform_name(), "macOS");
    }

    #[test]
    fn test_applescript_escaping() {
        assert_eq!(applescript_string("plain"), "\"plain\"");
        assert_eq!(applescript_string("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(applescript_string("a\\b"), "\"a\\\\b\"");
        assert_eq!(applescript_string("two\nlines"), "\"two lines\"");
    }

    #[test]
    fn test_notification_script() {
        let script = notification_script("Medication Reminder", "Time to take Aspirin");
        assert_eq!(
            script,
            "display notification \"Time to take Aspirin\" with title \
             \"Medication Reminder\" sound name \"default\""
        );
    }
}
