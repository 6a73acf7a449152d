use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::error::Result;
use crate::records::HeartRateReading;

use super::{format_datetime, parse_datetime_column, Storage};

const READING_COLUMNS: &str = "id, user_id, bpm, recorded_at";

impl Storage {
    /// Insert a heart-rate reading and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_reading(&self, reading: &HeartRateReading) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO heart_rates (user_id, bpm, recorded_at) VALUES (?1, ?2, ?3)",
            params![
                reading.user_id,
                reading.bpm,
                format_datetime(reading.recorded_at)
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted reading with id {}", id);
        Ok(id)
    }

    /// Get a reading owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_reading(&self, user_id: i64, id: i64) -> Result<Option<HeartRateReading>> {
        let reading = self
            .conn
            .query_row(
                &format!(
                    "SELECT {READING_COLUMNS} FROM heart_rates WHERE id = ?1 AND user_id = ?2"
                ),
                [id, user_id],
                Self::row_to_reading,
            )
            .optional()?;
        Ok(reading)
    }

    /// Change the bpm of a reading, keeping its timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_reading_bpm(&self, user_id: i64, id: i64, bpm: u32) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE heart_rates SET bpm = ?1 WHERE id = ?2 AND user_id = ?3",
            params![bpm, id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// Change both the bpm and the timestamp of a reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_reading(
        &self,
        user_id: i64,
        id: i64,
        bpm: u32,
        recorded_at: NaiveDateTime,
    ) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE heart_rates SET bpm = ?1, recorded_at = ?2 WHERE id = ?3 AND user_id = ?4",
            params![bpm, format_datetime(recorded_at), id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// Delete a reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_reading(&self, user_id: i64, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM heart_rates WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// All readings of a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn readings_for_user(&self, user_id: i64) -> Result<Vec<HeartRateReading>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {READING_COLUMNS} FROM heart_rates WHERE user_id = ?1 ORDER BY recorded_at ASC, id ASC"
        ))?;
        let readings = stmt
            .query_map([user_id], Self::row_to_reading)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(readings)
    }

    /// Readings with `from <= recorded_at < to`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn readings_between(
        &self,
        user_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<HeartRateReading>> {
        let mut stmt = self.conn.prepare(&format!(
            r"
            SELECT {READING_COLUMNS} FROM heart_rates
            WHERE user_id = ?1 AND recorded_at >= ?2 AND recorded_at < ?3
            ORDER BY recorded_at ASC, id ASC
            "
        ))?;
        let readings = stmt
            .query_map(
                params![user_id, format_datetime(from), format_datetime(to)],
                Self::row_to_reading,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(readings)
    }

    fn row_to_reading(row: &rusqlite::Row) -> rusqlite::Result<HeartRateReading> {
        let recorded_at: String = row.get(3)?;
        Ok(HeartRateReading {
            id: Some(row.get(0)?),
            user_id: row.get(1)?,
            bpm: row.get(2)?,
            recorded_at: parse_datetime_column(3, &recorded_at)?,
        })
    }
}
