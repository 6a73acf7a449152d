//! Medication reminders.
//!
//! [`due_reminders`] and [`upcoming`] are pure functions of the medication
//! list and the current local time. [`ReminderScheduler`] drives them from a
//! timer, delivers through a [`Notifier`] and runs the end-of-day sweep that
//! turns unrecorded doses into missed ones.

mod notifier;
mod scheduler;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::records::Medication;

pub use notifier::{ChannelNotifier, LogNotifier, Notifier};
pub use scheduler::{ReminderScheduler, SchedulerHandle, TickOutcome};

/// Title of every medication reminder.
pub const REMINDER_TITLE: &str = "Medication Reminder";

/// A reminder ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    /// Medication the reminder is for.
    pub medication_id: i64,
    /// Day the dose is due.
    pub date: NaiveDate,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
}

impl Reminder {
    /// Build the reminder for `medication` on `date`.
    #[must_use]
    pub fn for_medication(medication: &Medication, date: NaiveDate) -> Self {
        Self {
            medication_id: medication.id,
            date,
            title: REMINDER_TITLE.to_string(),
            body: format!(
                "Time to take {} ({}) - {}",
                medication.name,
                medication.dose,
                medication.meal_label()
            ),
        }
    }
}

/// Reminders for medications scheduled at the current minute and not yet
/// taken today.
#[must_use]
pub fn due_reminders(medications: &[Medication], now: NaiveDateTime) -> Vec<Reminder> {
    let today = now.date();
    medications
        .iter()
        .filter(|m| m.time.hour() == now.hour() && m.time.minute() == now.minute())
        .filter(|m| !m.taken_on(today))
        .map(|m| Reminder::for_medication(m, today))
        .collect()
}

/// Medications still to come later today, earliest first.
#[must_use]
pub fn upcoming(medications: &[Medication], now: NaiveDateTime) -> Vec<&Medication> {
    let today = now.date();
    let current = (now.hour(), now.minute());
    let mut pending: Vec<&Medication> = medications
        .iter()
        .filter(|m| (m.time.hour(), m.time.minute()) > current)
        .filter(|m| !m.taken_on(today))
        .collect();
    pending.sort_by_key(|m| (m.time, m.id));
    pending
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    use crate::records::{DoseRecord, MealTiming, MealType, Medication};

    pub fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    pub fn medication(id: i64, h: u32, m: u32) -> Medication {
        Medication {
            id,
            user_id: 1,
            name: format!("Med {id}"),
            dose: "5mg".to_string(),
            time: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            meal_type: MealType::Lunch,
            meal_timing: MealTiming::Before,
            records: Vec::new(),
        }
    }

    pub fn taken_today(mut med: Medication) -> Medication {
        med.records.push(DoseRecord {
            date: at(0, 0).date(),
            taken: true,
            recorded_at: at(0, 0),
        });
        med
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_reminder_text() {
        let mut med = medication(1, 13, 0);
        med.name = "Metformin".to_string();
        med.dose = "500mg".to_string();

        let reminder = Reminder::for_medication(&med, at(13, 0).date());
        assert_eq!(reminder.title, "Medication Reminder");
        assert_eq!(reminder.body, "Time to take Metformin (500mg) - before lunch");
    }

    #[test]
    fn test_due_matches_minute() {
        let meds = vec![medication(1, 8, 0), medication(2, 8, 1), medication(3, 20, 0)];

        let due = due_reminders(&meds, at(8, 0) + chrono::Duration::seconds(42));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].medication_id, 1);
        assert!(due_reminders(&meds, at(9, 0)).is_empty());
    }

    #[test]
    fn test_due_skips_taken() {
        let meds = vec![taken_today(medication(1, 8, 0)), medication(2, 8, 0)];

        let due = due_reminders(&meds, at(8, 0));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].medication_id, 2);
    }

    #[test]
    fn test_upcoming_sorted_and_filtered() {
        let meds = vec![
            medication(1, 21, 0),
            medication(2, 7, 0),
            medication(3, 13, 0),
            taken_today(medication(4, 18, 0)),
            medication(5, 12, 0),
        ];

        let ids: Vec<i64> = upcoming(&meds, at(12, 0)).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
