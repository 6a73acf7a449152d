//! `SQLite` schema definitions for healthtrack.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the users table.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    phone TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the heart-rate readings table.
pub const CREATE_HEART_RATES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS heart_rates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    bpm INTEGER NOT NULL,
    recorded_at TEXT NOT NULL
)
";

/// SQL statement to index readings by owner and time.
pub const CREATE_HEART_RATES_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_heart_rates_user_time ON heart_rates(user_id, recorded_at)
";

/// SQL statement to create the medications table.
pub const CREATE_MEDICATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS medications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    dose TEXT NOT NULL,
    time TEXT NOT NULL,
    meal_type TEXT NOT NULL,
    meal_timing TEXT NOT NULL
)
";

/// SQL statement to index medications by owner.
pub const CREATE_MEDICATIONS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_medications_user ON medications(user_id)
";

/// SQL statement to create the dose log table.
///
/// The unique constraint enforces one entry per medication per day.
pub const CREATE_DOSE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS dose_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    medication_id INTEGER NOT NULL REFERENCES medications(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    taken INTEGER NOT NULL,
    recorded_at TEXT NOT NULL,
    UNIQUE (medication_id, date)
)
";

/// SQL statement to create the emergency contacts table.
pub const CREATE_CONTACTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    relationship TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL
)
";

/// SQL statement to index contacts by owner.
pub const CREATE_CONTACTS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_contacts_user ON contacts(user_id)
";

/// SQL statement to create the preferences key-value table.
pub const CREATE_PREFERENCES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_HEART_RATES_TABLE,
    CREATE_HEART_RATES_INDEX,
    CREATE_MEDICATIONS_TABLE,
    CREATE_MEDICATIONS_INDEX,
    CREATE_DOSE_RECORDS_TABLE,
    CREATE_CONTACTS_TABLE,
    CREATE_CONTACTS_INDEX,
    CREATE_PREFERENCES_TABLE,
    CREATE_METADATA_TABLE,
];
