//! Command-line interface for watermedic.
//!
//! This module provides the CLI structure for the `watermedic` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ActivityArg, ConfigCommand, ExportCommand, HistoryCommand, ImportCommand, IntakeCommand,
    OutputFormat, PeriodArg, ReminderCommand, StatusCommand, TargetCommand, TargetSetCommand,
    TrendCommand, UnitArg, UnitCommand,
};

/// watermedic - Keep track of how much water you drink
///
/// Calculates a daily water target from your weight and activity, tracks
/// intake through the day, keeps a history of past days and reminds you to
/// drink.
#[derive(Debug, Parser)]
#[command(name = "watermedic")]
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
    /// Show today's progress
    Status(StatusCommand),

    /// Record water you drank
    Add(IntakeCommand),

    /// Take back a recorded amount
    Remove(IntakeCommand),

    /// Calculate or show the daily target
    #[command(subcommand)]
    Target(TargetCommand),

    /// Switch the weight unit and recalculate the target
    Unit(UnitCommand),

    /// List archived daily totals
    History(HistoryCommand),

    /// Show intake over the last week, month or year
    Trend(TrendCommand),

    /// Configure hydration reminders
    #[command(subcommand)]
    Reminder(ReminderCommand),

    /// Run in the foreground, resetting at midnight and sending reminders
    Watch,

    /// Write the saved state as JSON
    Export(ExportCommand),

    /// Replace the saved state from an exported JSON file
    Import(ImportCommand),

    /// View or modify configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use chrono::NaiveDate;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "watermedic");
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(3, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_default_amount() {
        let cli = Cli::try_parse_from(["watermedic", "add"]).unwrap();
        assert!(matches!(cli.command, Command::Add(IntakeCommand { ml: None })));
    }

    #[test]
    fn test_parse_remove_amount() {
        let cli = Cli::try_parse_from(["watermedic", "remove", "500"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Remove(IntakeCommand { ml: Some(500) })
        ));
    }

    #[test]
    fn test_parse_target_set() {
        let cli = Cli::try_parse_from([
            "watermedic", "target", "set", "--age", "30", "--weight", "154", "--unit", "lb",
            "--activity", "high", "--hot",
        ])
        .unwrap();

        let Command::Target(TargetCommand::Set(args)) = cli.command else {
            panic!("expected target set");
        };
        assert!((args.weight - 154.0).abs() < f64::EPSILON);
        assert_eq!(args.unit, Some(UnitArg::Lb));
        assert_eq!(args.activity, ActivityArg::High);
        assert!(args.hot);
    }

    #[test]
    fn test_parse_target_set_requires_weight() {
        assert!(Cli::try_parse_from(["watermedic", "target", "set", "--age", "30"]).is_err());
    }

    #[test]
    fn test_parse_unit() {
        let cli = Cli::try_parse_from(["watermedic", "unit", "lb"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Unit(UnitCommand { unit: UnitArg::Lb })
        ));
        assert!(Cli::try_parse_from(["watermedic", "unit", "stone"]).is_err());
    }

    #[test]
    fn test_parse_history_dates() {
        let cli = Cli::try_parse_from([
            "watermedic",
            "history",
            "--since",
            "2024-01-01",
            "--format",
            "json",
        ])
        .unwrap();

        let Command::History(args) = cli.command else {
            panic!("expected history");
        };
        assert_eq!(args.since, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(args.until.is_none());
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_history_rejects_bad_date() {
        assert!(Cli::try_parse_from(["watermedic", "history", "--since", "yesterday"]).is_err());
    }

    #[test]
    fn test_parse_trend_defaults() {
        let cli = Cli::try_parse_from(["watermedic", "trend"]).unwrap();
        let Command::Trend(args) = cli.command else {
            panic!("expected trend");
        };
        assert_eq!(args.period, PeriodArg::Week);
        assert!(args.date.is_none());
        assert_eq!(args.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_reminder_set() {
        let cli = Cli::try_parse_from(["watermedic", "reminder", "set", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Reminder(ReminderCommand::Set { hours: 2 })
        ));
    }

    #[test]
    fn test_parse_watch_and_import() {
        let cli = Cli::try_parse_from(["watermedic", "watch"]).unwrap();
        assert!(matches!(cli.command, Command::Watch));

        let cli = Cli::try_parse_from(["watermedic", "import", "state.json"]).unwrap();
        let Command::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.file, PathBuf::from("state.json"));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["watermedic", "-c", "/custom/config.toml", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let cli = Cli::try_parse_from(["watermedic", "-vv", "status"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(["watermedic", "status", "-q"]).unwrap();
        assert!(cli.quiet);
    }
}
