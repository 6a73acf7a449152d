//! Command-line interface for healthtrack.
//!
//! This module provides the CLI structure and output rendering for the
//! `htrack` binary.

mod commands;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AccountCommand, ConfigCommand, ContactCommand, HeartRateCommand, MealArg, MedicationArgs,
    MedicationCommand, OutputFormat, PeriodArg, PeriodArgs, RemindCommand, StatusCommand,
    TimingArg,
};

/// htrack - Track heart rate, medications and emergency contacts
///
/// Keeps a local record of heart-rate readings and medication doses,
/// reminds you when a dose is due and summarizes how you are doing.
#[derive(Debug, Parser)]
#[command(name = "htrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign up, log in and out
    #[command(subcommand)]
    Account(AccountCommand),

    /// Record and review heart-rate readings
    #[command(subcommand)]
    #[command(name = "hr")]
    HeartRate(HeartRateCommand),

    /// Manage medications and their doses
    #[command(subcommand)]
    #[command(name = "med")]
    Medication(MedicationCommand),

    /// Manage emergency contacts
    #[command(subcommand)]
    Contact(ContactCommand),

    /// Medication reminders
    #[command(subcommand)]
    Remind(RemindCommand),

    /// Show the health dashboard
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}
