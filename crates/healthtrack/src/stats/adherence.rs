//! Medication dose status and adherence rates.
//!
//! A day with no dose log entry counts as missed once it is in the past.
//! Today without an entry is still pending and is left out of the rate.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::records::Medication;

/// Status of one medication on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    /// Marked taken.
    Taken,
    /// Marked missed, or a past day with no entry.
    Missed,
    /// Today or a future day with no entry.
    Pending,
}

impl fmt::Display for DoseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Taken => write!(f, "Taken"),
            Self::Missed => write!(f, "Missed"),
            Self::Pending => write!(f, "Pending"),
        }
    }
}

/// Status of `medication` on `date`, judged as of `today`.
#[must_use]
pub fn dose_status(medication: &Medication, date: NaiveDate, today: NaiveDate) -> DoseStatus {
    match medication.record_for(date) {
        Some(record) if record.taken => DoseStatus::Taken,
        Some(_) => DoseStatus::Missed,
        None if date >= today => DoseStatus::Pending,
        None => DoseStatus::Missed,
    }
}

/// Per-status counts for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DoseCounts {
    /// Doses taken.
    pub taken: usize,
    /// Doses marked missed.
    pub missed: usize,
    /// Doses not yet recorded.
    pub pending: usize,
}

/// Count today's doses by status.
#[must_use]
pub fn today_counts(medications: &[Medication], today: NaiveDate) -> DoseCounts {
    medications
        .iter()
        .fold(DoseCounts::default(), |mut counts, medication| {
            match dose_status(medication, today, today) {
                DoseStatus::Taken => counts.taken += 1,
                DoseStatus::Missed => counts.missed += 1,
                DoseStatus::Pending => counts.pending += 1,
            }
            counts
        })
}

/// Taken and missed doses on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyAdherence {
    /// The day.
    pub date: NaiveDate,
    /// Doses taken.
    pub taken: usize,
    /// Doses missed, including past days with no entry.
    pub missed: usize,
}

/// Per-day counts for the `days` days ending today, oldest first.
#[must_use]
pub fn daily_series(
    medications: &[Medication],
    today: NaiveDate,
    days: u32,
) -> Vec<DailyAdherence> {
    (0..i64::from(days))
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let mut day = DailyAdherence {
                date,
                taken: 0,
                missed: 0,
            };
            for medication in medications {
                match dose_status(medication, date, today) {
                    DoseStatus::Taken => day.taken += 1,
                    DoseStatus::Missed => day.missed += 1,
                    DoseStatus::Pending => {}
                }
            }
            day
        })
        .collect()
}

/// Adherence over a window of days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adherence {
    /// Window length in days.
    pub days: u32,
    /// Doses taken in the window.
    pub taken: usize,
    /// Doses missed in the window.
    pub missed: usize,
    /// `taken / (taken + missed)` as a percentage with one decimal.
    pub rate: f64,
    /// Per-day breakdown, oldest first.
    pub daily: Vec<DailyAdherence>,
}

impl Adherence {
    /// The encouragement tier for this rate.
    #[must_use]
    pub fn tier(&self) -> AdherenceTier {
        AdherenceTier::from_rate(self.rate)
    }

    /// Encouragement message for this rate.
    #[must_use]
    pub fn message(&self) -> String {
        self.tier().message(self)
    }
}

/// Compute adherence for the `days` days ending today.
#[must_use]
pub fn adherence(medications: &[Medication], today: NaiveDate, days: u32) -> Adherence {
    let daily = daily_series(medications, today, days);
    let taken: usize = daily.iter().map(|d| d.taken).sum();
    let missed: usize = daily.iter().map(|d| d.missed).sum();

    Adherence {
        days,
        taken,
        missed,
        rate: adherence_rate(taken, missed),
        daily,
    }
}

#[allow(clippy::cast_precision_loss)]
fn adherence_rate(taken: usize, missed: usize) -> f64 {
    let due = taken + missed;
    if due == 0 {
        return 0.0;
    }
    let percent = taken as f64 / due as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}

/// Encouragement tier derived from an adherence rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdherenceTier {
    /// 90% and above.
    Excellent,
    /// 70% up to 90%.
    Good,
    /// 50% up to 70%.
    Warning,
    /// Below 50%.
    NeedsEncouragement,
}

impl AdherenceTier {
    /// Tier for a percentage rate.
    #[must_use]
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 90.0 {
            Self::Excellent
        } else if rate >= 70.0 {
            Self::Good
        } else if rate >= 50.0 {
            Self::Warning
        } else {
            Self::NeedsEncouragement
        }
    }

    /// Message naming the rate and dose counts over the adherence window.
    #[must_use]
    pub fn message(self, adherence: &Adherence) -> String {
        let Adherence {
            days,
            rate,
            taken,
            missed,
            ..
        } = adherence;
        let (window, next) = if *days == 7 {
            ("this week".to_string(), "next week".to_string())
        } else {
            (
                format!("over the last {days} days"),
                format!("over the next {days} days"),
            )
        };
        match self {
            Self::Excellent => format!(
                "Congratulations! You've achieved {rate}% adherence {window}. \
                 You took {taken} medications on time. Keep up the excellent work!"
            ),
            Self::Good => format!(
                "Good job! {rate}% adherence {window}. You missed {missed} doses. \
                 Let's aim for 90%+ {next}!"
            ),
            Self::Warning => format!(
                "Keep pushing! You've achieved {rate}% adherence, but you missed {missed} \
                 medications {window}. Set reminders and try to stick to your schedule."
            ),
            Self::NeedsEncouragement => format!(
                "Don't give up! You missed {missed} medications {window} ({rate}% adherence). \
                 Start fresh today: every medication taken is a step towards better health."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::records::{DoseRecord, MealTiming, MealType};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn medication(id: i64, records: &[(u32, bool)]) -> Medication {
        Medication {
            id,
            user_id: 1,
            name: format!("Med {id}"),
            dose: "10mg".to_string(),
            time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            meal_type: MealType::Breakfast,
            meal_timing: MealTiming::Before,
            records: records
                .iter()
                .map(|&(d, taken)| DoseRecord {
                    date: day(d),
                    taken,
                    recorded_at: day(d).and_hms_opt(9, 0, 0).unwrap(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_dose_status_rules() {
        let today = day(10);
        let med = medication(1, &[(8, true), (9, false), (10, false)]);

        assert_eq!(dose_status(&med, day(8), today), DoseStatus::Taken);
        assert_eq!(dose_status(&med, day(9), today), DoseStatus::Missed);
        assert_eq!(dose_status(&med, day(7), today), DoseStatus::Missed);
        assert_eq!(dose_status(&med, day(10), today), DoseStatus::Missed);
        assert_eq!(dose_status(&med, day(11), today), DoseStatus::Pending);

        let fresh = medication(2, &[]);
        assert_eq!(dose_status(&fresh, today, today), DoseStatus::Pending);
    }

    #[test]
    fn test_today_counts() {
        let today = day(10);
        let meds = vec![
            medication(1, &[(10, true)]),
            medication(2, &[(10, false)]),
            medication(3, &[]),
            medication(4, &[]),
        ];

        let counts = today_counts(&meds, today);
        assert_eq!(
            counts,
            DoseCounts {
                taken: 1,
                missed: 1,
                pending: 2
            }
        );
    }

    #[test]
    fn test_daily_series_counts_gaps_as_missed() {
        let today = day(10);
        let meds = vec![medication(1, &[(8, true), (10, true)]), medication(2, &[])];

        let series = daily_series(&meds, today, 3);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].date, day(8));
        assert_eq!((series[0].taken, series[0].missed), (1, 1));
        assert_eq!((series[1].taken, series[1].missed), (0, 2));
        // Today: med 2 has no entry yet and is not counted.
        assert_eq!((series[2].taken, series[2].missed), (1, 0));
    }

    #[test]
    fn test_adherence_rate_one_decimal() {
        let today = day(10);
        let meds = vec![medication(1, &[(8, true), (9, true), (10, false)])];

        let a = adherence(&meds, today, 3);
        assert_eq!(a.taken, 2);
        assert_eq!(a.missed, 1);
        assert!((a.rate - 66.7).abs() < f64::EPSILON);
        assert_eq!(a.tier(), AdherenceTier::Warning);
    }

    #[test]
    fn test_adherence_empty_is_zero() {
        let a = adherence(&[], day(10), 7);
        assert_eq!(a.rate, 0.0);
        assert_eq!(a.daily.len(), 7);
        assert_eq!(a.tier(), AdherenceTier::NeedsEncouragement);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(AdherenceTier::from_rate(100.0), AdherenceTier::Excellent);
        assert_eq!(AdherenceTier::from_rate(90.0), AdherenceTier::Excellent);
        assert_eq!(AdherenceTier::from_rate(89.9), AdherenceTier::Good);
        assert_eq!(AdherenceTier::from_rate(70.0), AdherenceTier::Good);
        assert_eq!(AdherenceTier::from_rate(50.0), AdherenceTier::Warning);
        assert_eq!(AdherenceTier::from_rate(49.9), AdherenceTier::NeedsEncouragement);
    }

    #[test]
    fn test_messages_name_counts() {
        let today = day(10);
        let meds = vec![medication(1, &[(9, true), (10, true)])];
        let a = adherence(&meds, today, 2);

        assert_eq!(a.tier(), AdherenceTier::Excellent);
        let message = a.message();
        assert!(message.contains("100% adherence"));
        assert!(message.contains("took 2 medications"));

        let poor = Adherence {
            days: 7,
            taken: 1,
            missed: 6,
            rate: 14.3,
            daily: Vec::new(),
        };
        assert!(poor.message().contains("missed 6 medications"));
        assert!(poor.message().contains("14.3% adherence"));
    }

    #[test]
    fn test_messages_follow_window_length() {
        let month = Adherence {
            days: 30,
            taken: 20,
            missed: 10,
            rate: 66.7,
            daily: Vec::new(),
        };
        let message = month.message();
        assert_eq!(month.tier(), AdherenceTier::Warning);
        assert!(message.contains("missed 10 medications over the last 30 days"));
        assert!(!message.contains("week"));

        let good = Adherence {
            days: 14,
            taken: 8,
            missed: 2,
            rate: 80.0,
            daily: Vec::new(),
        };
        assert!(good.message().contains("aim for 90%+ over the next 14 days"));

        let week = Adherence { days: 7, ..month };
        assert!(week.message().contains("medications this week"));
    }
}
