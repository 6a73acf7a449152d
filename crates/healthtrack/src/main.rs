//! `htrack` - CLI for healthtrack
//!
//! This binary provides the command-line interface for recording heart-rate
//! readings, managing medications and contacts, and running reminders.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Parser;
use tracing::info;

use healthtrack::cli::{
    render, AccountCommand, Cli, Command, ConfigCommand, ContactCommand, HeartRateCommand,
    MedicationCommand, RemindCommand,
};
use healthtrack::records::{
    parse_date, parse_local_datetime, parse_time_of_day, HeartRateReading, NewContact,
    NewMedication,
};
use healthtrack::reminder::{self, LogNotifier, Notifier, Reminder, ReminderScheduler};
use healthtrack::{init_logging, stats, Auth, Config, Error, Storage, User};

// Platform-specific imports using conditional compilation
#[cfg(target_os = "linux")]
use healthtrack_linux as platform;

#[cfg(target_os = "macos")]
use healthtrack_mac as platform;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Config commands load the configuration file themselves
    match cli.command {
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
        command => handle_user_command(cli.config, command),
    }
}

fn handle_user_command(config_path: Option<PathBuf>, command: Command) -> anyhow::Result<()> {
    let config = Config::load_from(config_path.clone())?;
    let config = &config;
    let storage = Storage::open(config.database_path())?;

    match command {
        Command::Account(cmd) => handle_account(&storage, config, cmd),
        Command::HeartRate(cmd) => {
            let user = logged_in(&storage, config)?;
            handle_heart_rate(&storage, config, &user, cmd)
        }
        Command::Medication(cmd) => {
            let user = logged_in(&storage, config)?;
            handle_medication(&storage, &user, cmd)
        }
        Command::Contact(cmd) => {
            let user = logged_in(&storage, config)?;
            handle_contact(&storage, config, &user, cmd)
        }
        Command::Remind(cmd) => {
            let user = logged_in(&storage, config)?;
            handle_remind(storage, config, &user, cmd)
        }
        Command::Status(status_cmd) => {
            let user = logged_in(&storage, config)?;
            handle_status(&storage, config, &user, status_cmd.json)
        }
        Command::Config(config_cmd) => handle_config(config_path, config_cmd),
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn logged_in(storage: &Storage, config: &Config) -> anyhow::Result<User> {
    Ok(Auth::new(storage, &config.auth).require_user()?)
}

/// Use the `--password` value, or read one line from stdin.
fn read_password(provided: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn handle_account(storage: &Storage, config: &Config, cmd: AccountCommand) -> anyhow::Result<()> {
    let auth = Auth::new(storage, &config.auth);
    match cmd {
        AccountCommand::Signup {
            email,
            phone,
            password,
        } => {
            let password = read_password(password)?;
            let user = auth.signup(&email, &phone, &password)?;
            println!("Account created. Logged in as {} ({}).", user.email, user.phone);
        }
        AccountCommand::Login {
            identifier,
            password,
        } => {
            let password = read_password(password)?;
            let user = auth.login(&identifier, &password)?;
            println!("Logged in as {}.", user.email);
        }
        AccountCommand::Logout => {
            if auth.logout()? {
                println!("Logged out.");
            } else {
                println!("Not logged in.");
            }
        }
        AccountCommand::Whoami { json } => {
            let user = auth.require_user()?;
            println!("{}", render::user(&user, json)?);
        }
    }
    Ok(())
}

fn handle_heart_rate(
    storage: &Storage,
    config: &Config,
    user: &User,
    cmd: HeartRateCommand,
) -> anyhow::Result<()> {
    let thresholds = config.heart_rate.thresholds();
    match cmd {
        HeartRateCommand::Add { bpm, at } => {
            let recorded_at = match at {
                Some(at) => parse_local_datetime("at", &at)?,
                None => now(),
            };
            let reading =
                HeartRateReading::checked(user.id, bpm, recorded_at, &config.heart_rate)?;
            let id = storage.insert_reading(&reading)?;

            let band = stats::classify(bpm, &thresholds);
            println!("Recorded {bpm} bpm at {} (#{id}, {band}).", reading.time_label());
            if band.needs_attention() {
                println!("{}", band.description());
            }
        }
        HeartRateCommand::Edit { id, bpm, at } => {
            let existing = storage
                .get_reading(user.id, id)?
                .ok_or_else(|| Error::not_found("reading", id))?;
            if bpm.is_none() && at.is_none() {
                bail!("nothing to change; pass --bpm and/or --at");
            }

            let bpm = bpm.unwrap_or(existing.bpm);
            HeartRateReading::check_bpm(bpm, &config.heart_rate)?;
            match at {
                Some(at) => {
                    let recorded_at = parse_local_datetime("at", &at)?;
                    storage.update_reading(user.id, id, bpm, recorded_at)?;
                }
                None => {
                    storage.update_reading_bpm(user.id, id, bpm)?;
                }
            }
            println!("Updated reading #{id}.");
        }
        HeartRateCommand::Delete { id } => {
            if !storage.delete_reading(user.id, id)? {
                return Err(Error::not_found("reading", id).into());
            }
            println!("Deleted reading #{id}.");
        }
        HeartRateCommand::List(args) => {
            let readings = storage.readings_for_user(user.id)?;
            let view = stats::period_view(&readings, args.period.into(), now(), &thresholds);
            println!("{}", render::readings(&view.readings, &thresholds, args.format)?);
        }
        HeartRateCommand::Stats(args) => {
            let readings = storage.readings_for_user(user.id)?;
            let now = now();
            let view = stats::period_view(&readings, args.period.into(), now, &thresholds);
            let summary = stats::summary(&readings, now);
            println!("{}", render::period_stats(&view, &summary, args.format)?);
        }
    }
    Ok(())
}

fn dose_date(date: Option<&str>, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let date = match date {
        Some(date) => parse_date("date", date)?,
        None => today,
    };
    if date > today {
        return Err(Error::validation("date", "cannot record a dose in the future").into());
    }
    Ok(date)
}

fn handle_medication(storage: &Storage, user: &User, cmd: MedicationCommand) -> anyhow::Result<()> {
    let today = now().date();
    match cmd {
        MedicationCommand::Add(args) => {
            let time = parse_time_of_day(&args.time)
                .ok_or_else(|| Error::validation("time", "must be HH:MM"))?;
            let new = NewMedication {
                name: args.name,
                dose: args.dose,
                time,
                meal_type: args.meal.into(),
                meal_timing: args.timing.into(),
            }
            .validated()?;
            let medication = storage.insert_medication(user.id, &new)?;
            println!(
                "Added {} ({}) at {}, {} (#{}).",
                medication.name,
                medication.dose,
                medication.time_label(),
                medication.meal_label(),
                medication.id
            );
        }
        MedicationCommand::Edit {
            id,
            name,
            dose,
            time,
            meal,
            timing,
        } => {
            let existing = storage
                .get_medication(user.id, id)?
                .ok_or_else(|| Error::not_found("medication", id))?;
            let time = match time {
                Some(time) => parse_time_of_day(&time)
                    .ok_or_else(|| Error::validation("time", "must be HH:MM"))?,
                None => existing.time,
            };
            let updated = NewMedication {
                name: name.unwrap_or(existing.name),
                dose: dose.unwrap_or(existing.dose),
                time,
                meal_type: meal.map_or(existing.meal_type, Into::into),
                meal_timing: timing.map_or(existing.meal_timing, Into::into),
            }
            .validated()?;
            storage.update_medication(user.id, id, &updated)?;
            println!("Updated medication #{id}.");
        }
        MedicationCommand::Delete { id } => {
            if !storage.delete_medication(user.id, id)? {
                return Err(Error::not_found("medication", id).into());
            }
            println!("Deleted medication #{id} and its dose log.");
        }
        MedicationCommand::List { date, format } => {
            let date = match date {
                Some(date) => parse_date("date", &date)?,
                None => today,
            };
            let medications = storage.medications_for_user(user.id)?;
            println!("{}", render::medications(&medications, date, today, format)?);
        }
        MedicationCommand::Take { id, date } => {
            let date = dose_date(date.as_deref(), today)?;
            if !storage.record_dose(user.id, id, date, true, now())? {
                return Err(Error::not_found("medication", id).into());
            }
            println!("Marked medication #{id} as taken on {date}.");
        }
        MedicationCommand::Miss { id, date } => {
            let date = dose_date(date.as_deref(), today)?;
            if !storage.record_dose(user.id, id, date, false, now())? {
                return Err(Error::not_found("medication", id).into());
            }
            println!("Marked medication #{id} as missed on {date}.");
        }
        MedicationCommand::Adherence { days, format } => {
            let medications = storage.medications_for_user(user.id)?;
            let adherence = stats::adherence(&medications, today, days);
            println!("{}", render::adherence(&adherence, format)?);
        }
    }
    Ok(())
}

fn handle_contact(
    storage: &Storage,
    config: &Config,
    user: &User,
    cmd: ContactCommand,
) -> anyhow::Result<()> {
    let country_code = &config.auth.country_code;
    match cmd {
        ContactCommand::Add {
            name,
            phone,
            relationship,
        } => {
            let contact = NewContact {
                name,
                relationship,
                phone,
            }
            .validated(country_code)?;
            let contact = storage.insert_contact(user.id, &contact)?;
            println!("Added {} ({}) (#{}).", contact.name, contact.phone, contact.id);
        }
        ContactCommand::Edit {
            id,
            name,
            phone,
            relationship,
        } => {
            let existing = storage
                .get_contact(user.id, id)?
                .ok_or_else(|| Error::not_found("contact", id))?;
            let name = name.unwrap_or(existing.name);
            let relationship = relationship.unwrap_or(existing.relationship);
            let updated = match phone {
                Some(phone) => NewContact {
                    name,
                    relationship,
                    phone,
                }
                .validated(country_code)?,
                None => NewContact {
                    name,
                    relationship,
                    phone: existing.phone,
                }
                .validated_details()?,
            };
            storage.update_contact(user.id, id, &updated)?;
            println!("Updated contact #{id}.");
        }
        ContactCommand::Delete { id } => {
            if !storage.delete_contact(user.id, id)? {
                return Err(Error::not_found("contact", id).into());
            }
            println!("Deleted contact #{id}.");
        }
        ContactCommand::List { format } => {
            let contacts = storage.contacts_for_user(user.id)?;
            println!("{}", render::contacts(&contacts, format)?);
        }
    }
    Ok(())
}

/// Shows reminders as desktop notifications through the platform crate.
#[derive(Debug, Clone, Copy, Default)]
struct DesktopNotifier;

#[async_trait::async_trait]
impl Notifier for DesktopNotifier {
    fn name(&self) -> &'static str {
        "desktop"
    }

    async fn notify(&self, reminder: &Reminder) -> healthtrack::Result<()> {
        let title = reminder.title.clone();
        let body = reminder.body.clone();
        tokio::task::spawn_blocking(move || platform::notify(&title, &body))
            .await
            .map_err(|e| Error::notification(e.to_string()))?
            .map_err(|e| Error::notification(e.to_string()))
    }
}

fn build_notifier(config: &Config) -> Box<dyn Notifier> {
    if config.reminders.desktop_notifications {
        Box::new(DesktopNotifier)
    } else {
        Box::new(LogNotifier)
    }
}

fn handle_remind(
    storage: Storage,
    config: &Config,
    user: &User,
    cmd: RemindCommand,
) -> anyhow::Result<()> {
    match cmd {
        RemindCommand::Run => {
            if !config.reminders.enabled {
                println!("Reminders are disabled in the configuration.");
                return Ok(());
            }
            platform::init().map_err(|e| anyhow::anyhow!("platform init failed: {e}"))?;

            let scheduler = ReminderScheduler::new(
                storage,
                user.id,
                build_notifier(config),
                config.check_interval(),
                config.end_of_day(),
            );
            let handle = scheduler.handle();

            println!(
                "Watching medication schedule for {} on {}. Press Ctrl-C to stop.",
                user.email,
                platform::platform_name()
            );

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(async move {
                let task = tokio::spawn(scheduler.run());
                tokio::signal::ctrl_c().await?;
                info!("Interrupt received, stopping reminders");
                handle.stop();
                task.await??;
                Ok::<(), anyhow::Error>(())
            })?;
        }
        RemindCommand::Due { format } => {
            let medications = storage.medications_for_user(user.id)?;
            let now = now();
            let due = reminder::due_reminders(&medications, now);
            let upcoming = reminder::upcoming(&medications, now);
            println!("{}", render::reminders(&due, &upcoming, format)?);
        }
        RemindCommand::Test => {
            let notifier = build_notifier(config);
            let test = Reminder {
                medication_id: 0,
                date: now().date(),
                title: reminder::REMINDER_TITLE.to_string(),
                body: "This is a test reminder from htrack.".to_string(),
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(notifier.notify(&test))?;
            println!("Sent a test reminder via the {} notifier.", notifier.name());
        }
    }
    Ok(())
}

fn handle_status(
    storage: &Storage,
    config: &Config,
    user: &User,
    json: bool,
) -> anyhow::Result<()> {
    let readings = storage.readings_for_user(user.id)?;
    let medications = storage.medications_for_user(user.id)?;
    let contacts = storage.contacts_for_user(user.id)?;
    let dashboard = stats::dashboard(
        &readings,
        &medications,
        &contacts,
        now(),
        &config.heart_rate.thresholds(),
    );

    println!("{}", render::dashboard(user, &dashboard, json)?);
    if !json {
        println!("Platform:      {}", platform::platform_name());
        println!("Database:      {}", storage.path().display());
    }
    Ok(())
}

/// Load `path` with the usual defaults and environment layers and validate it.
fn validate_config(path: &Path) -> anyhow::Result<Config> {
    Config::load_from(Some(path.to_path_buf()))
        .with_context(|| format!("configuration error in {}", path.display()))
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                show_config(&config);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            validate_config(&path)?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn show_config(config: &Config) {
    let hr = &config.heart_rate;
    let reminders = &config.reminders;
    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("[Storage]");
    println!("  Database path:      {}", config.database_path().display());
    println!();
    println!("[Heart rate]");
    println!("  Normal range:       {}-{} bpm", hr.low_bpm, hr.high_bpm);
    println!(
        "  Accepted range:     {}-{} bpm",
        hr.min_valid_bpm, hr.max_valid_bpm
    );
    println!();
    println!("[Reminders]");
    println!("  Enabled:            {}", reminders.enabled);
    println!("  Check interval:     {}s", reminders.check_interval_secs);
    println!("  End of day:         {}", reminders.end_of_day);
    println!("  Desktop:            {}", reminders.desktop_notifications);
    println!();
    println!("[Auth]");
    println!("  Country code:       {}", config.auth.country_code);
    println!(
        "  Min password:       {} characters",
        config.auth.min_password_length
    );
}
