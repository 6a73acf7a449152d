//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::records::{MealTiming, MealType};
use crate::stats::ViewPeriod;

/// Account commands.
#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Create an account and log in
    Signup {
        /// Email address
        #[arg(long)]
        email: String,

        /// Phone number (10 digits, country code optional)
        #[arg(long)]
        phone: String,

        /// Password (read from stdin if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in with email or phone
    Login {
        /// Email address or phone number
        identifier: String,

        /// Password (read from stdin if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out
    Logout,

    /// Show the logged-in account
    Whoami {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Heart-rate commands.
#[derive(Debug, Subcommand)]
pub enum HeartRateCommand {
    /// Record a reading
    Add {
        /// Beats per minute
        bpm: u32,

        /// When it was measured ("YYYY-MM-DD HH:MM", default now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Change a reading
    Edit {
        /// Reading id
        id: i64,

        /// New beats per minute
        #[arg(long)]
        bpm: Option<u32>,

        /// New measurement time ("YYYY-MM-DD HH:MM")
        #[arg(long)]
        at: Option<String>,
    },

    /// Delete a reading
    Delete {
        /// Reading id
        id: i64,
    },

    /// List readings in a period
    List(PeriodArgs),

    /// Show charted averages and a summary
    Stats(PeriodArgs),
}

/// Period selection shared by `hr list` and `hr stats`.
#[derive(Debug, Args)]
pub struct PeriodArgs {
    /// Time window
    #[arg(short, long, value_enum, default_value = "today")]
    pub period: PeriodArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Fields of a new medication.
#[derive(Debug, Args)]
pub struct MedicationArgs {
    /// Medication name
    pub name: String,

    /// Dose, e.g. "500mg"
    #[arg(long)]
    pub dose: String,

    /// Scheduled time of day (HH:MM)
    #[arg(long)]
    pub time: String,

    /// Meal the dose is tied to
    #[arg(long, value_enum, default_value = "breakfast")]
    pub meal: MealArg,

    /// Before or after the meal
    #[arg(long, value_enum, default_value = "before")]
    pub timing: TimingArg,
}

/// Medication commands.
#[derive(Debug, Subcommand)]
pub enum MedicationCommand {
    /// Add a medication
    Add(MedicationArgs),

    /// Change a medication
    Edit {
        /// Medication id
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New dose
        #[arg(long)]
        dose: Option<String>,

        /// New time of day (HH:MM)
        #[arg(long)]
        time: Option<String>,

        /// New meal
        #[arg(long, value_enum)]
        meal: Option<MealArg>,

        /// New meal timing
        #[arg(long, value_enum)]
        timing: Option<TimingArg>,
    },

    /// Delete a medication and its dose log
    Delete {
        /// Medication id
        id: i64,
    },

    /// List medications with their status for a day
    List {
        /// Day to show (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Mark a dose as taken
    Take {
        /// Medication id
        id: i64,

        /// Day of the dose (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Mark a dose as missed
    Miss {
        /// Medication id
        id: i64,

        /// Day of the dose (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show adherence over recent days
    Adherence {
        /// Number of days ending today
        #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..=365))]
        days: u32,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Emergency contact commands.
#[derive(Debug, Subcommand)]
pub enum ContactCommand {
    /// Add a contact
    Add {
        /// Contact name
        name: String,

        /// Phone number
        #[arg(long)]
        phone: String,

        /// Relationship, e.g. "sister"
        #[arg(long, default_value = "")]
        relationship: String,
    },

    /// Change a contact
    Edit {
        /// Contact id
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New phone number
        #[arg(long)]
        phone: Option<String>,

        /// New relationship
        #[arg(long)]
        relationship: Option<String>,
    },

    /// Delete a contact
    Delete {
        /// Contact id
        id: i64,
    },

    /// List contacts
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Reminder commands.
#[derive(Debug, Subcommand)]
pub enum RemindCommand {
    /// Run the reminder scheduler in the foreground until Ctrl-C
    Run,

    /// Show reminders due now and the rest of today's schedule
    Due {
        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Send a test notification
    Test,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Chart period argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeriodArg {
    /// Today's readings
    Today,
    /// The last 7 days
    Weekly,
    /// The last 30 days
    Monthly,
}

impl From<PeriodArg> for ViewPeriod {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Today => Self::Today,
            PeriodArg::Weekly => Self::Weekly,
            PeriodArg::Monthly => Self::Monthly,
        }
    }
}

/// Meal argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MealArg {
    /// Breakfast
    Breakfast,
    /// Lunch
    Lunch,
    /// Dinner
    Dinner,
}

impl From<MealArg> for MealType {
    fn from(arg: MealArg) -> Self {
        match arg {
            MealArg::Breakfast => Self::Breakfast,
            MealArg::Lunch => Self::Lunch,
            MealArg::Dinner => Self::Dinner,
        }
    }
}

/// Meal timing argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimingArg {
    /// Before the meal
    Before,
    /// After the meal
    After,
}

impl From<TimingArg> for MealTiming {
    fn from(arg: TimingArg) -> Self {
        match arg {
            TimingArg::Before => Self::Before,
            TimingArg::After => Self::After,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_arg_conversion() {
        assert_eq!(ViewPeriod::from(PeriodArg::Today), ViewPeriod::Today);
        assert_eq!(ViewPeriod::from(PeriodArg::Weekly), ViewPeriod::Weekly);
        assert_eq!(ViewPeriod::from(PeriodArg::Monthly), ViewPeriod::Monthly);
    }

    #[test]
    fn test_meal_arg_conversion() {
        assert_eq!(MealType::from(MealArg::Breakfast), MealType::Breakfast);
        assert_eq!(MealType::from(MealArg::Lunch), MealType::Lunch);
        assert_eq!(MealType::from(MealArg::Dinner), MealType::Dinner);
    }

    #[test]
    fn test_timing_arg_conversion() {
        assert_eq!(MealTiming::from(TimingArg::Before), MealTiming::Before);
        assert_eq!(MealTiming::from(TimingArg::After), MealTiming::After);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_hr_command_debug() {
        let cmd = HeartRateCommand::Add {
            bpm: 72,
            at: None,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Add"));
        assert!(debug_str.contains("72"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
