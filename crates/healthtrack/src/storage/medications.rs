use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::error::Result;
use crate::records::{DoseRecord, Medication, NewMedication};

use super::{
    conversion_error, format_date, format_datetime, format_time, parse_date_column,
    parse_datetime_column, parse_time_column, Storage,
};

const MEDICATION_COLUMNS: &str = "id, user_id, name, dose, time, meal_type, meal_timing";

impl Storage {
    /// Insert a medication with an empty dose log.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_medication(&self, user_id: i64, new: &NewMedication) -> Result<Medication> {
        self.conn.execute(
            r"
            INSERT INTO medications (user_id, name, dose, time, meal_type, meal_timing)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                user_id,
                new.name,
                new.dose,
                format_time(new.time),
                new.meal_type.to_string(),
                new.meal_timing.to_string(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted medication with id {}", id);
        Ok(Medication {
            id,
            user_id,
            name: new.name.clone(),
            dose: new.dose.clone(),
            time: new.time,
            meal_type: new.meal_type,
            meal_timing: new.meal_timing,
            records: Vec::new(),
        })
    }

    /// Get a medication owned by `user_id`, with its dose log.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_medication(&self, user_id: i64, id: i64) -> Result<Option<Medication>> {
        let medication = self
            .conn
            .query_row(
                &format!(
                    "SELECT {MEDICATION_COLUMNS} FROM medications WHERE id = ?1 AND user_id = ?2"
                ),
                [id, user_id],
                Self::row_to_medication,
            )
            .optional()?;

        match medication {
            Some(mut medication) => {
                medication.records = self.dose_records(medication.id)?;
                Ok(Some(medication))
            }
            None => Ok(None),
        }
    }

    /// Replace the editable fields of a medication. The dose log is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_medication(&self, user_id: i64, id: i64, new: &NewMedication) -> Result<bool> {
        let rows = self.conn.execute(
            r"
            UPDATE medications
            SET name = ?1, dose = ?2, time = ?3, meal_type = ?4, meal_timing = ?5
            WHERE id = ?6 AND user_id = ?7
            ",
            params![
                new.name,
                new.dose,
                format_time(new.time),
                new.meal_type.to_string(),
                new.meal_timing.to_string(),
                id,
                user_id,
            ],
        )?;
        Ok(rows > 0)
    }

    /// Delete a medication and its dose log.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_medication(&self, user_id: i64, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM medications WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// All medications of a user ordered by scheduled time, each with its
    /// dose log loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn medications_for_user(&self, user_id: i64) -> Result<Vec<Medication>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications WHERE user_id = ?1 ORDER BY time ASC, id ASC"
        ))?;
        let mut medications = stmt
            .query_map([user_id], Self::row_to_medication)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for medication in &mut medications {
            medication.records = self.dose_records(medication.id)?;
        }
        Ok(medications)
    }

    /// Mark a dose as taken or missed for `date`, replacing any earlier
    /// entry for that day.
    ///
    /// Returns `false` if the medication does not belong to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn record_dose(
        &self,
        user_id: i64,
        medication_id: i64,
        date: NaiveDate,
        taken: bool,
        at: NaiveDateTime,
    ) -> Result<bool> {
        let rows = self.conn.execute(
            r"
            INSERT INTO dose_records (medication_id, date, taken, recorded_at)
            SELECT id, ?3, ?4, ?5 FROM medications WHERE id = ?1 AND user_id = ?2
            ON CONFLICT (medication_id, date)
            DO UPDATE SET taken = excluded.taken, recorded_at = excluded.recorded_at
            ",
            params![
                medication_id,
                user_id,
                format_date(date),
                taken,
                format_datetime(at)
            ],
        )?;
        if rows > 0 {
            debug!(medication_id, %date, taken, "Recorded dose");
        }
        Ok(rows > 0)
    }

    /// Write a missed entry for every medication of `user_id` that has no
    /// entry for `date`. Existing entries are left alone.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn record_missing_as_missed(
        &self,
        user_id: i64,
        date: NaiveDate,
        at: NaiveDateTime,
    ) -> Result<usize> {
        let rows = self.conn.execute(
            r"
            INSERT OR IGNORE INTO dose_records (medication_id, date, taken, recorded_at)
            SELECT id, ?2, 0, ?3 FROM medications WHERE user_id = ?1
            ",
            params![user_id, format_date(date), format_datetime(at)],
        )?;
        Ok(rows)
    }

    fn dose_records(&self, medication_id: i64) -> Result<Vec<DoseRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, taken, recorded_at FROM dose_records WHERE medication_id = ?1 ORDER BY date ASC",
        )?;
        let records = stmt
            .query_map([medication_id], |row| {
                let date: String = row.get(0)?;
                let recorded_at: String = row.get(2)?;
                Ok(DoseRecord {
                    date: parse_date_column(0, &date)?,
                    taken: row.get(1)?,
                    recorded_at: parse_datetime_column(2, &recorded_at)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn row_to_medication(row: &rusqlite::Row) -> rusqlite::Result<Medication> {
        let time: String = row.get(4)?;
        let meal_type: String = row.get(5)?;
        let meal_timing: String = row.get(6)?;

        Ok(Medication {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            dose: row.get(3)?,
            time: parse_time_column(4, &time)?,
            meal_type: meal_type
                .parse()
                .map_err(|e: crate::error::Error| conversion_error(5, e.to_string()))?,
            meal_timing: meal_timing
                .parse()
                .map_err(|e: crate::error::Error| conversion_error(6, e.to_string()))?,
            records: Vec::new(),
        })
    }
}
