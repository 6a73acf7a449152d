//! Heart-rate classification, period views and summaries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::records::HeartRateReading;

/// Number of individual readings charted for [`ViewPeriod::Today`].
pub const TODAY_CHART_POINTS: usize = 15;

/// Number of readings listed as "recent".
pub const RECENT_READINGS: usize = 5;

/// Inclusive bounds of the normal resting range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandThresholds {
    /// Lowest normal bpm.
    pub low: u32,
    /// Highest normal bpm.
    pub high: u32,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self { low: 60, high: 100 }
    }
}

/// Clinical band of a heart-rate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartRateBand {
    /// Below the normal range.
    Bradycardia,
    /// Within the normal range.
    Normal,
    /// Above the normal range.
    Tachycardia,
}

impl HeartRateBand {
    /// Whether this band warrants an alert.
    #[must_use]
    pub fn needs_attention(self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// Short description shown next to a reading.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Bradycardia => "heart rate is below the normal range",
            Self::Normal => "heart rate is within the normal range",
            Self::Tachycardia => "heart rate is above the normal range",
        }
    }
}

impl fmt::Display for HeartRateBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bradycardia => write!(f, "Bradycardia"),
            Self::Normal => write!(f, "Normal"),
            Self::Tachycardia => write!(f, "Tachycardia"),
        }
    }
}

/// Classify a bpm value.
#[must_use]
pub fn classify(bpm: u32, thresholds: &BandThresholds) -> HeartRateBand {
    if bpm < thresholds.low {
        HeartRateBand::Bradycardia
    } else if bpm > thresholds.high {
        HeartRateBand::Tachycardia
    } else {
        HeartRateBand::Normal
    }
}

/// Time window a chart covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPeriod {
    /// Same calendar date as now.
    #[default]
    Today,
    /// The last 7 days.
    Weekly,
    /// The last 30 days.
    Monthly,
}

impl ViewPeriod {
    /// Whether a reading taken at `at` falls in this period.
    #[must_use]
    pub fn contains(self, at: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            Self::Today => at.date() == now.date(),
            Self::Weekly => at >= now - Duration::days(7),
            Self::Monthly => at >= now - Duration::days(30),
        }
    }
}

impl fmt::Display for ViewPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => write!(f, "today"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for ViewPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "today" => Ok(Self::Today),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(Error::validation(
                "period",
                format!("unknown period '{other}'"),
            )),
        }
    }
}

/// One point on a heart-rate chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    /// Axis label: `HH:MM`, a day, or a week.
    pub label: String,
    /// The reading, or the rounded mean of the bucket.
    pub bpm: u32,
    /// Number of readings behind this point.
    pub count: usize,
}

/// Readings of one period prepared for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodView {
    /// The period shown.
    pub period: ViewPeriod,
    /// Readings in the period, oldest first.
    pub readings: Vec<HeartRateReading>,
    /// Whether any reading in the period is outside the normal band.
    pub has_abnormal: bool,
    /// Chart points, oldest first.
    pub points: Vec<ChartPoint>,
    /// The most recent readings, newest first.
    pub recent: Vec<HeartRateReading>,
}

/// Filter, bucket and chart the readings of a period.
#[must_use]
pub fn period_view(
    readings: &[HeartRateReading],
    period: ViewPeriod,
    now: NaiveDateTime,
    thresholds: &BandThresholds,
) -> PeriodView {
    let mut filtered: Vec<HeartRateReading> = readings
        .iter()
        .filter(|r| period.contains(r.recorded_at, now))
        .cloned()
        .collect();
    filtered.sort_by_key(|r| r.recorded_at);

    let has_abnormal = filtered
        .iter()
        .any(|r| classify(r.bpm, thresholds).needs_attention());

    let points = match period {
        ViewPeriod::Today => {
            let skip = filtered.len().saturating_sub(TODAY_CHART_POINTS);
            filtered[skip..]
                .iter()
                .map(|r| ChartPoint {
                    label: r.time_label(),
                    bpm: r.bpm,
                    count: 1,
                })
                .collect()
        }
        ViewPeriod::Weekly => bucket_points(
            &filtered,
            HeartRateReading::date,
            |d| d.format("%b %d").to_string(),
        ),
        ViewPeriod::Monthly => bucket_points(
            &filtered,
            |r| week_start(r.date()),
            |d| format!("Week of {}", d.format("%b %d")),
        ),
    };

    let recent = filtered.iter().rev().take(RECENT_READINGS).cloned().collect();

    PeriodView {
        period,
        readings: filtered,
        has_abnormal,
        points,
        recent,
    }
}

/// The Sunday on or before `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

fn bucket_points(
    readings: &[HeartRateReading],
    key: impl Fn(&HeartRateReading) -> NaiveDate,
    label: impl Fn(NaiveDate) -> String,
) -> Vec<ChartPoint> {
    let mut buckets: BTreeMap<NaiveDate, (u64, usize)> = BTreeMap::new();
    for reading in readings {
        let entry = buckets.entry(key(reading)).or_default();
        entry.0 += u64::from(reading.bpm);
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(date, (sum, count))| ChartPoint {
            label: label(date),
            bpm: rounded_mean(sum, count),
            count,
        })
        .collect()
}

/// Mean of one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    /// The day.
    pub date: NaiveDate,
    /// Rounded mean bpm, 0 when the day has no readings.
    pub average: u32,
    /// Number of readings that day.
    pub count: usize,
}

/// Dashboard summary of a user's heart-rate history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeartRateSummary {
    /// Rounded mean over the last 30 days.
    pub average: u32,
    /// Lowest bpm over the last 30 days.
    pub min: u32,
    /// Highest bpm over the last 30 days.
    pub max: u32,
    /// Today and the six previous days, oldest first.
    pub daily: Vec<DailyBucket>,
    /// Number of readings ever recorded.
    pub total: usize,
    /// Suggested upper bound for the daily chart axis.
    pub chart_ceiling: u32,
}

/// Summarize readings as of `now`.
#[must_use]
pub fn summary(readings: &[HeartRateReading], now: NaiveDateTime) -> HeartRateSummary {
    let window: Vec<u32> = readings
        .iter()
        .filter(|r| ViewPeriod::Monthly.contains(r.recorded_at, now))
        .map(|r| r.bpm)
        .collect();

    let average = rounded_mean(window.iter().copied().map(u64::from).sum(), window.len());
    let min = window.iter().copied().min().unwrap_or(0);
    let max = window.iter().copied().max().unwrap_or(0);

    let today = now.date();
    let daily: Vec<DailyBucket> = (0..7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let (sum, count) = readings
                .iter()
                .filter(|r| r.date() == date)
                .fold((0_u64, 0_usize), |(sum, count), r| {
                    (sum + u64::from(r.bpm), count + 1)
                });
            DailyBucket {
                date,
                average: rounded_mean(sum, count),
                count,
            }
        })
        .collect();

    let busiest = daily.iter().map(|d| d.average).max().unwrap_or(0);

    HeartRateSummary {
        average,
        min,
        max,
        daily,
        total: readings.len(),
        chart_ceiling: chart_ceiling(busiest),
    }
}

/// The most recent reading.
#[must_use]
pub fn latest(readings: &[HeartRateReading]) -> Option<&HeartRateReading> {
    readings.iter().max_by_key(|r| (r.recorded_at, r.id))
}

/// 120% of the highest daily mean, never below 100.
fn chart_ceiling(max_daily_mean: u32) -> u32 {
    let scaled = (u64::from(max_daily_mean) * 12 + 5) / 10;
    u32::try_from(scaled).unwrap_or(u32::MAX).max(100)
}

/// Integer mean rounded half away from zero. 0 for an empty set.
pub(crate) fn rounded_mean(sum: u64, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    let count = count as u64;
    u32::try_from((sum * 2 + count) / (count * 2)).unwrap_or(u32::MAX)
}
