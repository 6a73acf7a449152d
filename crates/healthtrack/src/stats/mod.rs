//! Derived views over stored records.
//!
//! Everything here is a pure function of records plus an explicit "now",
//! so the same numbers come out of the CLI, the reminder daemon and tests.

pub mod adherence;
pub mod heart_rate;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::records::{EmergencyContact, HeartRateReading, Medication};

pub use adherence::{
    adherence, daily_series, dose_status, today_counts, Adherence, AdherenceTier,
    DailyAdherence, DoseCounts, DoseStatus,
};
pub use heart_rate::{
    classify, latest, period_view, summary, BandThresholds, ChartPoint, DailyBucket,
    HeartRateBand, HeartRateSummary, PeriodView, ViewPeriod,
};

/// Days covered by the dashboard adherence figure.
pub const ADHERENCE_WINDOW_DAYS: u32 = 7;

/// Latest reading together with its band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestReading {
    /// The reading.
    pub reading: HeartRateReading,
    /// Its classification.
    pub band: HeartRateBand,
}

/// Overview shown by `htrack status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Most recent heart-rate reading.
    pub latest: Option<LatestReading>,
    /// Heart-rate summary.
    pub heart_rate: HeartRateSummary,
    /// Number of medications scheduled each day.
    pub medications_today: usize,
    /// Today's dose counts.
    pub today: DoseCounts,
    /// Adherence over [`ADHERENCE_WINDOW_DAYS`].
    pub adherence: Adherence,
    /// Number of emergency contacts.
    pub contacts: usize,
}

/// Build the dashboard for one user's records.
#[must_use]
pub fn dashboard(
    readings: &[HeartRateReading],
    medications: &[Medication],
    contacts: &[EmergencyContact],
    now: NaiveDateTime,
    thresholds: &BandThresholds,
) -> Dashboard {
    let today = now.date();
    Dashboard {
        latest: latest(readings).map(|reading| LatestReading {
            reading: reading.clone(),
            band: classify(reading.bpm, thresholds),
        }),
        heart_rate: summary(readings, now),
        medications_today: medications.len(),
        today: today_counts(medications, today),
        adherence: adherence(medications, today, ADHERENCE_WINDOW_DAYS),
        contacts: contacts.len(),
    }
}
