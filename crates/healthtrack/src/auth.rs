//! Local accounts, password hashing and the session.
//!
//! Passwords are stored as Argon2id PHC strings. The session is a single
//! preference row naming the logged-in user.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use regex::Regex;
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::records::User;
use crate::storage::Storage;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// # Panics
///
/// Panics if the built-in pattern is invalid.
fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("Invalid regex pattern"))
}

/// Hash a password using Argon2id.
///
/// Returns the PHC-formatted hash string that includes the salt and parameters.
///
/// # Errors
///
/// Returns [`Error::Credential`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Credential(format!("failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns [`Error::Credential`] if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| Error::Credential(format!("invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Trim, lowercase and check an email address.
///
/// # Errors
///
/// Returns a validation error if the address is blank or malformed.
pub fn normalize_email(input: &str) -> Result<String> {
    let email = input.trim().to_lowercase();
    if email.is_empty() {
        return Err(Error::validation("email", "is required"));
    }
    if !email_regex().is_match(&email) {
        return Err(Error::validation("email", "must look like name@example.com"));
    }
    Ok(email)
}

/// Normalize an account phone number to `<country_code><10 digits>`.
///
/// Spaces and dashes are removed, then a leading `country_code` if present.
///
/// # Errors
///
/// Returns a validation error unless exactly 10 digits remain.
pub fn normalize_phone(input: &str, country_code: &str) -> Result<String> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if cleaned.is_empty() {
        return Err(Error::validation("phone", "is required"));
    }

    let local = cleaned.strip_prefix(country_code).unwrap_or(&cleaned);
    if local.len() != 10 || !local.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::validation("phone", "must be 10 digits"));
    }
    Ok(format!("{country_code}{local}"))
}

/// Check password strength.
///
/// # Errors
///
/// Returns a validation error naming the first unmet rule.
pub fn validate_password(password: &str, min_length: usize) -> Result<()> {
    if password.trim().is_empty() {
        return Err(Error::validation("password", "is required"));
    }
    if password.chars().count() < min_length {
        return Err(Error::validation(
            "password",
            format!("must be at least {min_length} characters"),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(Error::validation("password", "must contain a capital letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(Error::validation("password", "must contain a number"));
    }
    Ok(())
}

/// Account operations bound to a store and auth settings.
#[derive(Debug, Clone, Copy)]
pub struct Auth<'a> {
    storage: &'a Storage,
    config: &'a AuthConfig,
}

impl<'a> Auth<'a> {
    /// Create an account service.
    #[must_use]
    pub fn new(storage: &'a Storage, config: &'a AuthConfig) -> Self {
        Self { storage, config }
    }

    /// Create an account and log it in.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, [`Error::AlreadyExists`] if
    /// the email or phone is taken, or a storage error.
    pub fn signup(&self, email: &str, phone: &str, password: &str) -> Result<User> {
        let email = normalize_email(email)?;
        let phone = normalize_phone(phone, &self.config.country_code)?;
        validate_password(password, self.config.min_password_length)?;

        if self.storage.find_user_by_email(&email)?.is_some() {
            return Err(Error::AlreadyExists { field: "email" });
        }
        if self.storage.find_user_by_phone(&phone)?.is_some() {
            return Err(Error::AlreadyExists { field: "phone" });
        }

        let hash = hash_password(password)?;
        let user = self.storage.insert_user(&email, &phone, &hash, Utc::now())?;
        self.storage.set_current_user(user.id)?;

        info!(user_id = user.id, "Account created");
        Ok(user)
    }

    /// Log in by email or phone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] or [`Error::InvalidCredentials`], or a
    /// storage error.
    pub fn login(&self, identifier: &str, password: &str) -> Result<User> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(Error::validation("identifier", "is required"));
        }

        let user = match self.lookup(identifier)? {
            Some(user) => user,
            None => {
                return Err(Error::UserNotFound {
                    identifier: identifier.to_string(),
                })
            }
        };

        if !verify_password(password, &user.password_hash)? {
            debug!(user_id = user.id, "Password mismatch");
            return Err(Error::InvalidCredentials);
        }

        self.storage.set_current_user(user.id)?;
        info!(user_id = user.id, "Logged in");
        Ok(user)
    }

    /// Clear the session. Returns whether someone was logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn logout(&self) -> Result<bool> {
        let was_logged_in = self.storage.clear_current_user()?;
        if was_logged_in {
            info!("Logged out");
        }
        Ok(was_logged_in)
    }

    /// The logged-in user, if the session names an existing account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn current_user(&self) -> Result<Option<User>> {
        match self.storage.current_user_id()? {
            Some(id) => self.storage.get_user(id),
            None => Ok(None),
        }
    }

    /// The logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] when there is no valid session.
    pub fn require_user(&self) -> Result<User> {
        self.current_user()?.ok_or(Error::NotLoggedIn)
    }

    fn lookup(&self, identifier: &str) -> Result<Option<User>> {
        let looks_like_phone = identifier
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '+');

        if looks_like_phone {
            if let Ok(phone) = normalize_phone(identifier, &self.config.country_code) {
                return self.storage.find_user_by_phone(&phone);
            }
        }
        self.storage
            .find_user_by_email(&identifier.to_lowercase())
    }
}
