use chrono::{DateTime, Utc};
use rusqlite::{params, ErrorCode, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};
use crate::records::User;

use super::{conversion_error, Storage};

const USER_COLUMNS: &str = "id, email, phone, password_hash, created_at";

impl Storage {
    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the email or phone is taken, or a
    /// database error.
    pub fn insert_user(
        &self,
        email: &str,
        phone: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<User> {
        let inserted = self.conn.execute(
            "INSERT INTO users (email, phone, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![email, phone, password_hash, created_at.to_rfc3339()],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, Some(message)))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                let field = if message.contains("users.phone") {
                    "phone"
                } else {
                    "email"
                };
                return Err(Error::AlreadyExists { field });
            }
            Err(e) => return Err(e.into()),
        }

        let id = self.conn.last_insert_rowid();
        debug!("Inserted user with id {}", id);
        Ok(User {
            id,
            email: email.to_string(),
            phone: phone.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.query_user("id = ?1", id)
    }

    /// Find an account by exact email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_user("email = ?1", email)
    }

    /// Find an account by normalized phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        self.query_user("phone = ?1", phone)
    }

    /// Delete an account together with everything it owns.
    ///
    /// Clears the session if it belonged to this account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self.conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        if rows > 0 && self.current_user_id()? == Some(id) {
            self.clear_current_user()?;
        }
        Ok(rows > 0)
    }

    fn query_user(&self, predicate: &str, value: impl rusqlite::ToSql) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
        let user = self
            .conn
            .query_row(&sql, [value], Self::row_to_user)
            .optional()?;
        Ok(user)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at: String = row.get(4)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| conversion_error(4, e))?
            .with_timezone(&Utc);

        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            phone: row.get(2)?,
            password_hash: row.get(3)?,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::records::HeartRateReading;

    #[test]
    fn test_insert_and_get_user() {
        let storage = create_test_storage();
        let user = create_test_user(&storage, "asha@example.com", "+919876543210");

        let fetched = storage.get_user(user.id).unwrap().unwrap();
        assert_eq!(fetched.email, "asha@example.com");
        assert_eq!(fetched.phone, "+919876543210");
        assert_eq!(fetched.password_hash, "$argon2id$test");
    }

    #[test]
    fn test_find_by_email_and_phone() {
        let storage = create_test_storage();
        let user = create_test_user(&storage, "asha@example.com", "+919876543210");

        assert_eq!(
            storage.find_user_by_email("asha@example.com").unwrap().unwrap().id,
            user.id
        );
        assert_eq!(
            storage.find_user_by_phone("+919876543210").unwrap().unwrap().id,
            user.id
        );
        assert!(storage.find_user_by_email("nobody@example.com").unwrap().is_none());
        assert!(storage.find_user_by_phone("+910000000000").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let storage = create_test_storage();
        create_test_user(&storage, "asha@example.com", "+919876543210");

        let err = storage
            .insert_user("asha@example.com", "+911111111111", "h", Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { field: "email" }));
    }

    #[test]
    fn test_duplicate_phone_rejected() {
        let storage = create_test_storage();
        create_test_user(&storage, "asha@example.com", "+919876543210");

        let err = storage
            .insert_user("other@example.com", "+919876543210", "h", Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { field: "phone" }));
    }

    #[test]
    fn test_delete_user_cascades_and_clears_session() {
        let storage = create_test_storage();
        let user = create_test_user(&storage, "asha@example.com", "+919876543210");
        storage
            .insert_reading(&HeartRateReading::new(user.id, 70, at(2024, 5, 1, 8, 0)))
            .unwrap();
        storage.set_current_user(user.id).unwrap();

        assert!(storage.delete_user(user.id).unwrap());
        assert!(storage.get_user(user.id).unwrap().is_none());
        assert!(storage.readings_for_user(user.id).unwrap().is_empty());
        assert_eq!(storage.current_user_id().unwrap(), None);
        assert!(!storage.delete_user(user.id).unwrap());
    }
}
