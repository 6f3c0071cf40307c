//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::target::ActivityLevel;
use crate::trend::Period;
use crate::units::WeightUnit;

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Intake change arguments, shared by `add` and `remove`.
#[derive(Debug, Args)]
pub struct IntakeCommand {
    /// Amount in milliliters (defaults to the configured step, one glass)
    pub ml: Option<u32>,
}

/// Target commands.
#[derive(Debug, Subcommand)]
pub enum TargetCommand {
    /// Calculate the daily target from your details
    Set(TargetSetCommand),

    /// Show the current target and the inputs it came from
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Target calculation inputs.
#[derive(Debug, Args)]
pub struct TargetSetCommand {
    /// Age in years
    #[arg(long)]
    pub age: f64,

    /// Body weight in the selected unit
    #[arg(long)]
    pub weight: f64,

    /// Weight unit (keeps the current unit when omitted)
    #[arg(short, long, value_enum)]
    pub unit: Option<UnitArg>,

    /// Typical activity level
    #[arg(short, long, value_enum, default_value = "moderate")]
    pub activity: ActivityArg,

    /// It is hot today
    #[arg(long)]
    pub hot: bool,
}

/// Unit command arguments.
#[derive(Debug, Args)]
pub struct UnitCommand {
    /// The weight unit to switch to
    #[arg(value_enum)]
    pub unit: UnitArg,
}

/// History command arguments.
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Show days from this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Show days through this date (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Trend command arguments.
#[derive(Debug, Args)]
pub struct TrendCommand {
    /// Lookback window
    #[arg(short, long, value_enum, default_value = "week")]
    pub period: PeriodArg,

    /// Last day of the window (defaults to today)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Reminder commands.
#[derive(Debug, Subcommand)]
pub enum ReminderCommand {
    /// Set the reminder interval in hours (0 turns reminders off)
    Set {
        /// Hours between reminders
        hours: u32,
    },

    /// Show the reminder interval
    Show,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// JSON file previously written by `export`
    pub file: PathBuf,
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

/// Weight unit argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    /// Kilograms
    Kg,
    /// Pounds
    Lb,
}

impl From<UnitArg> for WeightUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Kg => Self::Kg,
            UnitArg::Lb => Self::Lb,
        }
    }
}

/// Activity level argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActivityArg {
    /// Little or no exercise
    Sedentary,
    /// Exercise a few times a week
    Moderate,
    /// Daily hard exercise
    High,
}

impl From<ActivityArg> for ActivityLevel {
    fn from(arg: ActivityArg) -> Self {
        match arg {
            ActivityArg::Sedentary => Self::Sedentary,
            ActivityArg::Moderate => Self::Moderate,
            ActivityArg::High => Self::High,
        }
    }
}

/// Trend period argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeriodArg {
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    /// Last 365 days
    Year,
}

impl From<PeriodArg> for Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Week => Self::Week,
            PeriodArg::Month => Self::Month,
            PeriodArg::Year => Self::Year,
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
