use rusqlite::OptionalExtension;

use crate::error::{Error, Result};

use super::Storage;

/// Preference key holding the logged-in user's id.
pub const SESSION_KEY: &str = "current_user";

impl Storage {
    /// Read a preference value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM preferences WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Write a preference value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
            [key, value],
        )?;
        Ok(())
    }

    /// Remove a preference. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_preference(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM preferences WHERE key = ?1", [key])?;
        Ok(rows > 0)
    }

    /// Remove every preference, including the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_preferences(&self) -> Result<usize> {
        let rows = self.conn.execute("DELETE FROM preferences", [])?;
        Ok(rows)
    }

    /// Id of the logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the stored
    /// value is not an id.
    pub fn current_user_id(&self) -> Result<Option<i64>> {
        match self.get_preference(SESSION_KEY)? {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| Error::internal(format!("corrupt session value '{value}'"))),
            None => Ok(None),
        }
    }

    /// Mark `user_id` as logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_current_user(&self, user_id: i64) -> Result<()> {
        self.set_preference(SESSION_KEY, &user_id.to_string())
    }

    /// Log out. Returns whether a session existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_current_user(&self) -> Result<bool> {
        self.remove_preference(SESSION_KEY)
    }
}
