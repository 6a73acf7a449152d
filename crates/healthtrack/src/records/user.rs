use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A local account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Database id.
    pub id: i64,
    /// Email address, unique across accounts.
    pub email: String,
    /// Phone number including country code, unique across accounts.
    pub phone: String,
    /// Argon2id PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
