use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::require;

/// Loose phone shape: optional `+`, up to three digit groups separated by
/// a space, dash or dot, the first two optionally parenthesised.
const CONTACT_PHONE_PATTERN: &str =
    r"^\+?\(?[0-9]{1,4}\)?[-\s.]?\(?[0-9]{1,4}\)?[-\s.]?[0-9]{1,9}$";

/// # Panics
///
/// Panics if the built-in pattern is invalid.
fn contact_phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CONTACT_PHONE_PATTERN).expect("Invalid regex pattern"))
}

/// Fields supplied when creating or editing an emergency contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    /// Contact name.
    pub name: String,
    /// Relationship to the user, e.g. "sister". May be empty.
    pub relationship: String,
    /// Phone number as typed.
    pub phone: String,
}

impl NewContact {
    /// Validate the contact and normalize its phone number.
    ///
    /// Every number must match the loose phone shape as typed. Numbers that
    /// do not start with `+` get `country_code` prepended.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is blank or the phone number
    /// has fewer than 10 digits or an unrecognized shape.
    pub fn validated(self, country_code: &str) -> Result<Self> {
        let phone = require("phone", &self.phone)?;

        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if digits < 10 {
            return Err(Error::validation("phone", "must have at least 10 digits"));
        }
        if !contact_phone_regex().is_match(&phone) {
            return Err(Error::validation("phone", "invalid phone number format"));
        }

        let phone = if phone.starts_with('+') {
            phone
        } else {
            format!("{country_code}{phone}")
        };

        Self { phone, ..self }.validated_details()
    }

    /// Validate the name and relationship, keeping the phone number as is.
    ///
    /// Used when editing a contact whose stored number is not changing.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is blank.
    pub fn validated_details(self) -> Result<Self> {
        Ok(Self {
            name: require("name", &self.name)?,
            relationship: self.relationship.trim().to_string(),
            phone: self.phone,
        })
    }
}

/// A person to call in an emergency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    /// Database id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Contact name.
    pub name: String,
    /// Relationship to the user.
    pub relationship: String,
    /// Phone number including country code.
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(phone: &str) -> NewContact {
        NewContact {
            name: "Ravi".to_string(),
            relationship: " brother ".to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn test_builtin_pattern_compiles() {
        assert!(Regex::new(CONTACT_PHONE_PATTERN).is_ok());
    }

    #[test]
    fn test_bare_number_gets_country_code() {
        let c = contact("9876543210").validated("+91").unwrap();
        assert_eq!(c.phone, "+919876543210");
        assert_eq!(c.relationship, "brother");
    }

    #[test]
    fn test_formatted_number_accepted() {
        let c = contact("(987) 654-3210").validated("+1").unwrap();
        assert_eq!(c.phone, "+1(987) 654-3210");
    }

    #[test]
    fn test_international_number_kept() {
        let c = contact("+44 2079 460958").validated("+91").unwrap();
        assert_eq!(c.phone, "+44 2079 460958");
    }

    #[test]
    fn test_short_number_rejected() {
        let err = contact("12345").validated("+91").unwrap_err();
        assert!(err.to_string().contains("at least 10 digits"));
    }

    #[test]
    fn test_bad_shape_rejected() {
        let err = contact("98-76-54-32-10").validated("+91").unwrap_err();
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_name_required() {
        let mut c = contact("9876543210");
        c.name = " ".to_string();
        assert!(c.validated("+91").is_err());
    }

    #[test]
    fn test_plus_prefix_does_not_skip_format_check() {
        let err = contact("+1 call me at 555-123-4567 ext 9")
            .validated("+91")
            .unwrap_err();
        assert!(err.to_string().contains("format"));

        let err = contact("+44 20 7946 0958").validated("+91").unwrap_err();
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_details_keep_stored_phone() {
        let stored = contact("9876543210").validated("+1").unwrap();
        let edited = NewContact {
            name: " Ravi K ".to_string(),
            ..stored
        }
        .validated_details()
        .unwrap();
        assert_eq!(edited.name, "Ravi K");
        assert_eq!(edited.phone, "+19876543210");

        let mut blank = contact("+919876543210");
        blank.name = String::new();
        assert!(blank.validated_details().is_err());
    }
}
