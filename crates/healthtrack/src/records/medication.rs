use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::require;

/// The meal a dose is scheduled around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    /// Morning meal.
    #[default]
    Breakfast,
    /// Midday meal.
    Lunch,
    /// Evening meal.
    Dinner,
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Breakfast => write!(f, "breakfast"),
            Self::Lunch => write!(f, "lunch"),
            Self::Dinner => write!(f, "dinner"),
        }
    }
}

impl FromStr for MealType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            other => Err(Error::validation(
                "meal",
                format!("unknown meal '{other}'"),
            )),
        }
    }
}

/// Whether a dose is taken before or after its meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealTiming {
    /// Before the meal.
    #[default]
    Before,
    /// After the meal.
    After,
}

impl fmt::Display for MealTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

impl FromStr for MealTiming {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            other => Err(Error::validation(
                "timing",
                format!("unknown meal timing '{other}'"),
            )),
        }
    }
}

/// One day's entry in a medication's dose log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseRecord {
    /// The calendar day this entry covers.
    pub date: NaiveDate,
    /// `true` if the dose was taken, `false` if it was missed.
    pub taken: bool,
    /// When the entry was written.
    pub recorded_at: NaiveDateTime,
}

/// Fields supplied when creating or editing a medication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedication {
    /// Medication name.
    pub name: String,
    /// Free-form dose, e.g. "500mg".
    pub dose: String,
    /// Scheduled time of day.
    pub time: NaiveTime,
    /// Meal the dose is tied to.
    pub meal_type: MealType,
    /// Before or after the meal.
    pub meal_timing: MealTiming,
}

impl NewMedication {
    /// Trim and check the required text fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error if name or dose is blank.
    pub fn validated(self) -> Result<Self> {
        Ok(Self {
            name: require("name", &self.name)?,
            dose: require("dose", &self.dose)?,
            ..self
        })
    }
}

/// A medication with its daily dose log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    /// Database id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Medication name.
    pub name: String,
    /// Free-form dose.
    pub dose: String,
    /// Scheduled time of day.
    pub time: NaiveTime,
    /// Meal the dose is tied to.
    pub meal_type: MealType,
    /// Before or after the meal.
    pub meal_timing: MealTiming,
    /// Dose log, at most one entry per date, ordered by date.
    pub records: Vec<DoseRecord>,
}

impl Medication {
    /// The dose log entry for `date`, if any.
    #[must_use]
    pub fn record_for(&self, date: NaiveDate) -> Option<&DoseRecord> {
        self.records.iter().find(|r| r.date == date)
    }

    /// Whether the dose for `date` was marked taken.
    #[must_use]
    pub fn taken_on(&self, date: NaiveDate) -> bool {
        self.record_for(date).is_some_and(|r| r.taken)
    }

    /// Human-readable meal qualifier, e.g. "before breakfast".
    #[must_use]
    pub fn meal_label(&self) -> String {
        format!("{} {}", self.meal_timing, self.meal_type)
    }

    /// `HH:MM` label of the scheduled time.
    #[must_use]
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn medication(records: Vec<DoseRecord>) -> Medication {
        Medication {
            id: 1,
            user_id: 1,
            name: "Metformin".to_string(),
            dose: "500mg".to_string(),
            time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            meal_type: MealType::Breakfast,
            meal_timing: MealTiming::After,
            records,
        }
    }

    fn record(d: u32, taken: bool) -> DoseRecord {
        DoseRecord {
            date: day(d),
            taken,
            recorded_at: day(d).and_hms_opt(9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_meal_type_round_trip_strings() {
        for meal in [MealType::Breakfast, MealType::Lunch, MealType::Dinner] {
            assert_eq!(meal.to_string().parse::<MealType>().unwrap(), meal);
        }
        assert!("brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn test_meal_timing_parse() {
        assert_eq!("after".parse::<MealTiming>().unwrap(), MealTiming::After);
        assert!("during".parse::<MealTiming>().is_err());
    }

    #[test]
    fn test_record_for_and_taken_on() {
        let med = medication(vec![record(1, true), record(2, false)]);

        assert!(med.taken_on(day(1)));
        assert!(!med.taken_on(day(2)));
        assert!(med.record_for(day(2)).is_some());
        assert!(med.record_for(day(3)).is_none());
        assert!(!med.taken_on(day(3)));
    }

    #[test]
    fn test_meal_label() {
        let med = medication(Vec::new());
        assert_eq!(med.meal_label(), "after breakfast");
        assert_eq!(med.time_label(), "08:00");
    }

    #[test]
    fn test_new_medication_validated_trims() {
        let new = NewMedication {
            name: "  Aspirin ".to_string(),
            dose: " 75mg".to_string(),
            time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            meal_type: MealType::Dinner,
            meal_timing: MealTiming::After,
        }
        .validated()
        .unwrap();

        assert_eq!(new.name, "Aspirin");
        assert_eq!(new.dose, "75mg");
    }

    #[test]
    fn test_new_medication_requires_dose() {
        let err = NewMedication {
            name: "Aspirin".to_string(),
            dose: "  ".to_string(),
            time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            meal_type: MealType::Dinner,
            meal_timing: MealTiming::After,
        }
        .validated()
        .unwrap_err();

        assert!(err.to_string().contains("dose"));
    }
}
