//! Text, table and JSON rendering for command output.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::records::{EmergencyContact, HeartRateReading, Medication, User};
use crate::reminder::Reminder;
use crate::stats::{
    classify, dose_status, Adherence, BandThresholds, Dashboard, HeartRateSummary, PeriodView,
};

use super::OutputFormat;

const DATETIME_DISPLAY: &str = "%Y-%m-%d %H:%M";

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Lay out rows under headers with space-padded columns.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut lines = vec![
        table_line(headers.iter().copied(), &widths),
        table_line(rule.iter().map(String::as_str), &widths),
    ];
    lines.extend(
        rows.iter()
            .map(|row| table_line(row.iter().map(String::as_str), &widths)),
    );
    lines.join("\n")
}

fn table_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Render heart-rate readings.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn readings(
    readings: &[HeartRateReading],
    thresholds: &BandThresholds,
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        return json(readings);
    }
    if readings.is_empty() {
        return Ok("No readings.".to_string());
    }

    let rows: Vec<Vec<String>> = readings
        .iter()
        .map(|r| {
            vec![
                r.id.map(|id| id.to_string()).unwrap_or_default(),
                r.recorded_at.format(DATETIME_DISPLAY).to_string(),
                r.bpm.to_string(),
                classify(r.bpm, thresholds).to_string(),
            ]
        })
        .collect();

    Ok(match format {
        OutputFormat::Table => table(&["ID", "TIME", "BPM", "BAND"], &rows),
        _ => rows
            .iter()
            .map(|r| format!("#{}  {}  {} bpm  {}", r[0], r[1], r[2], r[3]))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

/// Render a period chart together with the overall summary.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn period_stats(
    view: &PeriodView,
    summary: &HeartRateSummary,
    format: OutputFormat,
) -> Result<String> {
    #[derive(Serialize)]
    struct Stats<'a> {
        view: &'a PeriodView,
        summary: &'a HeartRateSummary,
    }

    if format == OutputFormat::Json {
        return json(&Stats { view, summary });
    }

    let mut out = String::new();
    if view.points.is_empty() {
        let _ = writeln!(out, "No readings for {}.", view.period);
    } else {
        let rows: Vec<Vec<String>> = view
            .points
            .iter()
            .map(|p| vec![p.label.clone(), p.bpm.to_string(), p.count.to_string()])
            .collect();
        if format == OutputFormat::Table {
            out.push_str(&table(&["PERIOD", "BPM", "READINGS"], &rows));
            out.push('\n');
        } else {
            for row in &rows {
                let _ = writeln!(out, "{}: {} bpm ({} readings)", row[0], row[1], row[2]);
            }
        }
    }

    if view.has_abnormal {
        out.push_str("Warning: some readings in this period are outside the normal range.\n");
    }
    let _ = write!(
        out,
        "30-day average: {} bpm (min {}, max {}), {} readings in total",
        summary.average, summary.min, summary.max, summary.total
    );
    Ok(out)
}

/// Render medications with their status on `date`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn medications(
    medications: &[Medication],
    date: NaiveDate,
    today: NaiveDate,
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        return json(medications);
    }
    if medications.is_empty() {
        return Ok("No medications.".to_string());
    }

    let rows: Vec<Vec<String>> = medications
        .iter()
        .map(|m| {
            vec![
                m.id.to_string(),
                m.name.clone(),
                m.dose.clone(),
                m.time_label(),
                m.meal_label(),
                dose_status(m, date, today).to_string(),
            ]
        })
        .collect();

    Ok(match format {
        OutputFormat::Table => table(&["ID", "NAME", "DOSE", "TIME", "MEAL", "STATUS"], &rows),
        _ => rows
            .iter()
            .map(|r| format!("#{} {} ({}) at {}, {} [{}]", r[0], r[1], r[2], r[3], r[4], r[5]))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

/// Render an adherence report.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn adherence(adherence: &Adherence, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(adherence);
    }

    let mut out = String::new();
    if format == OutputFormat::Table {
        let rows: Vec<Vec<String>> = adherence
            .daily
            .iter()
            .map(|d| {
                vec![
                    d.date.format("%b %d").to_string(),
                    d.taken.to_string(),
                    d.missed.to_string(),
                ]
            })
            .collect();
        out.push_str(&table(&["DAY", "TAKEN", "MISSED"], &rows));
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "Adherence over {} days: {}% ({} taken, {} missed)",
        adherence.days, adherence.rate, adherence.taken, adherence.missed
    );
    out.push_str(&adherence.message());
    Ok(out)
}

/// Render emergency contacts.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn contacts(contacts: &[EmergencyContact], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(contacts);
    }
    if contacts.is_empty() {
        return Ok("No emergency contacts.".to_string());
    }

    let rows: Vec<Vec<String>> = contacts
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.relationship.clone(),
                c.phone.clone(),
            ]
        })
        .collect();

    Ok(match format {
        OutputFormat::Table => table(&["ID", "NAME", "RELATIONSHIP", "PHONE"], &rows),
        _ => contacts
            .iter()
            .map(|c| {
                if c.relationship.is_empty() {
                    format!("#{} {}: {}", c.id, c.name, c.phone)
                } else {
                    format!("#{} {} ({}): {}", c.id, c.name, c.relationship, c.phone)
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

/// Render due reminders and the rest of today's schedule.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn reminders(
    due: &[Reminder],
    upcoming: &[&Medication],
    format: OutputFormat,
) -> Result<String> {
    #[derive(Serialize)]
    struct Schedule<'a> {
        due: &'a [Reminder],
        upcoming: &'a [&'a Medication],
    }

    if format == OutputFormat::Json {
        return json(&Schedule { due, upcoming });
    }

    let mut out = String::new();
    if due.is_empty() {
        out.push_str("Nothing due right now.\n");
    } else {
        for reminder in due {
            let _ = writeln!(out, "{}: {}", reminder.title, reminder.body);
        }
    }
    match upcoming.first() {
        Some(next) => {
            let _ = write!(
                out,
                "Next: {} ({}) at {}, {}",
                next.name,
                next.dose,
                next.time_label(),
                next.meal_label()
            );
            if upcoming.len() > 1 {
                let _ = write!(out, " (+{} more today)", upcoming.len() - 1);
            }
        }
        None => out.push_str("No more doses scheduled today."),
    }
    Ok(out)
}

/// Render an account.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn user(user: &User, as_json: bool) -> Result<String> {
    if as_json {
        return json(user);
    }
    Ok(format!(
        "{} ({}), member since {}",
        user.email,
        user.phone,
        user.created_at.format("%Y-%m-%d")
    ))
}

/// Render the dashboard.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn dashboard(user: &User, dashboard: &Dashboard, as_json: bool) -> Result<String> {
    #[derive(Serialize)]
    struct Status<'a> {
        user: &'a User,
        dashboard: &'a Dashboard,
    }

    if as_json {
        return json(&Status { user, dashboard });
    }

    let mut out = String::new();
    let _ = writeln!(out, "htrack status for {}", user.email);
    let _ = writeln!(out, "{}", "-".repeat(18 + user.email.len()));

    match &dashboard.latest {
        Some(latest) => {
            let _ = writeln!(
                out,
                "Heart rate:    {} bpm at {} ({}: {})",
                latest.reading.bpm,
                latest.reading.recorded_at.format(DATETIME_DISPLAY),
                latest.band,
                latest.band.description()
            );
        }
        None => out.push_str("Heart rate:    no readings yet\n"),
    }
    let hr = &dashboard.heart_rate;
    let _ = writeln!(
        out,
        "30-day range:  avg {} / min {} / max {} bpm",
        hr.average, hr.min, hr.max
    );
    let _ = writeln!(
        out,
        "Medications:   {} scheduled today ({} taken, {} missed, {} pending)",
        dashboard.medications_today,
        dashboard.today.taken,
        dashboard.today.missed,
        dashboard.today.pending
    );
    let _ = writeln!(
        out,
        "Adherence:     {}% over {} days",
        dashboard.adherence.rate, dashboard.adherence.days
    );
    let _ = write!(out, "Contacts:      {}", dashboard.contacts);
    Ok(out)
}
