//! `watermedic` - CLI for the hydration tracker
//!
//! Each invocation loads the saved state, brings it up to today, applies one
//! command and saves the result.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::warn;

use watermedic::cli::{
    Cli, Command, ConfigCommand, HistoryCommand, OutputFormat, ReminderCommand, TargetCommand,
    TargetSetCommand, TrendCommand,
};
use watermedic::history::HydrationRecord;
use watermedic::reminder::{ConsoleNotifier, Permission};
use watermedic::storage::PersistedState;
use watermedic::target::CalculatorInputs;
use watermedic::trend::{Period, SeriesStats, TrendPoint};
use watermedic::{init_logging, watch, Config, Storage, Tracker};

const BAR_WIDTH: u32 = 30;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    if skips_config_load(&cli.command) {
        if let Command::Config(config_cmd) = &cli.command {
            handle_config_file(config_cmd, cli.config.as_deref());
        }
        return Ok(());
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    if let Command::Config(config_cmd) = cli.command {
        return handle_config(&config, config_cmd);
    }

    let storage = open_storage(&config.database_path())?;
    let mut tracker = Tracker::restore(storage, today());

    let result = match cli.command {
        Command::Status(cmd) => handle_status(&tracker, cmd.json),
        Command::Add(cmd) => {
            let ml = cmd.ml.unwrap_or(config.tracker.step_ml);
            tracker.add_intake(i64::from(ml));
            println!("Added {ml} ml.");
            print_progress_line(&tracker);
            Ok(())
        }
        Command::Remove(cmd) => {
            let ml = cmd.ml.unwrap_or(config.tracker.step_ml);
            tracker.add_intake(-i64::from(ml));
            println!("Removed {ml} ml.");
            print_progress_line(&tracker);
            Ok(())
        }
        Command::Target(TargetCommand::Set(args)) => {
            handle_target_set(&mut tracker, &args);
            Ok(())
        }
        Command::Target(TargetCommand::Show { json }) => handle_target_show(&tracker, json),
        Command::Unit(cmd) => {
            // Failure is reported through the queued notice
            let _ = tracker.set_unit(cmd.unit.into());
            println!("Weight unit: {}", tracker.state().weight_unit);
            Ok(())
        }
        Command::History(cmd) => handle_history(&tracker, &cmd),
        Command::Trend(cmd) => handle_trend(&tracker, &cmd),
        Command::Reminder(cmd) => {
            handle_reminder(&mut tracker, &config, &cmd);
            Ok(())
        }
        Command::Watch => handle_watch(&mut tracker, &config),
        Command::Export(cmd) => handle_export(&tracker, cmd.file.as_deref()),
        Command::Import(cmd) => handle_import(&mut tracker, &cmd.file),
        Command::Config(_) => Ok(()),
    };

    print_notices(&mut tracker);
    result
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Commands that read config files themselves and must work even when the
/// active configuration is broken.
fn skips_config_load(command: &Command) -> bool {
    matches!(
        command,
        Command::Config(ConfigCommand::Path | ConfigCommand::Validate { .. })
    )
}

/// Open the database, falling back to an unsaved in-memory store when the
/// file cannot be used.
fn open_storage(path: &Path) -> anyhow::Result<Storage> {
    match Storage::open(path) {
        Ok(storage) => Ok(storage),
        Err(e) if e.is_persistence_error() => {
            warn!("Failed to open {}: {}", path.display(), e);
            eprintln!(
                "Could not open {}; changes in this session will not be saved.",
                path.display()
            );
            Storage::open_in_memory().context("failed to open in-memory database")
        }
        Err(e) => Err(e).with_context(|| format!("failed to open {}", path.display())),
    }
}

/// Notices go to stderr so JSON on stdout stays parseable.
fn print_notices(tracker: &mut Tracker<Storage>) {
    for notice in tracker.take_notices() {
        eprintln!("{notice}");
    }
}

fn print_progress_line(tracker: &Tracker<Storage>) {
    let progress = tracker.progress();
    println!(
        "Today: {} / {} ml ({}%)",
        progress.current_intake_ml, progress.target_ml, progress.percent
    );
}

fn handle_status(tracker: &Tracker<Storage>, json: bool) -> anyhow::Result<()> {
    let state = tracker.state();
    let progress = tracker.progress();
    let stats = tracker.gateway().stats()?;

    if json {
        let status = serde_json::json!({
            "date": state.ledger.last_reset_date,
            "progress": progress,
            "remaining_ml": progress.remaining_ml(),
            "history_days": state.history.len(),
            "reminder_interval_hours": state.reminder_interval_hours,
            "database_path": tracker.gateway().path(),
            "last_saved": stats.last_saved,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("watermedic status");
    println!("-----------------");
    if let Some(date) = state.ledger.last_reset_date {
        println!("Date:          {date}");
    }
    if progress.target_ml == 0 {
        println!("Target:        not set (run `watermedic target set`)");
    } else {
        println!("Target:        {} ml", progress.target_ml);
    }
    println!(
        "Intake:        {} ml ({}%)",
        progress.current_intake_ml, progress.percent
    );
    println!(
        "Glasses:       {} / {}",
        progress.glasses_consumed, progress.glasses_target
    );
    if progress.is_complete() {
        println!("Remaining:     done for today");
    } else {
        println!("Remaining:     {} ml", progress.remaining_ml());
    }
    if state.reminder_interval_hours == 0 {
        println!("Reminders:     off");
    } else {
        println!(
            "Reminders:     every {} hour(s)",
            state.reminder_interval_hours
        );
    }
    println!("History:       {} day(s)", state.history.len());
    println!("Database:      {}", tracker.gateway().path().display());
    Ok(())
}

fn handle_target_set(tracker: &mut Tracker<Storage>, args: &TargetSetCommand) {
    let inputs = CalculatorInputs {
        age: args.age,
        weight: args.weight,
        activity_level: args.activity.into(),
        weather_hot: args.hot,
    };
    let unit = args
        .unit
        .map_or(tracker.state().weight_unit, Into::into);

    // Rejected inputs are reported through the queued notice
    let _ = tracker.set_inputs(inputs, unit);
}

fn handle_target_show(tracker: &Tracker<Storage>, json: bool) -> anyhow::Result<()> {
    let state = tracker.state();

    if json {
        let target = serde_json::json!({
            "daily_target_ml": state.target.daily_target_ml,
            "weight_unit": state.weight_unit,
            "inputs": state.inputs,
        });
        println!("{}", serde_json::to_string_pretty(&target)?);
        return Ok(());
    }

    if state.target.is_set() {
        println!("Daily target:  {} ml", state.target.daily_target_ml);
    } else {
        println!("Daily target:  not set");
    }
    println!("Age:           {}", state.inputs.age);
    println!("Weight:        {} {}", state.inputs.weight, state.weight_unit);
    println!("Activity:      {}", state.inputs.activity_level);
    println!(
        "Hot weather:   {}",
        if state.inputs.weather_hot { "yes" } else { "no" }
    );
    Ok(())
}

fn handle_history(tracker: &Tracker<Storage>, cmd: &HistoryCommand) -> anyhow::Result<()> {
    let since = cmd.since.unwrap_or(NaiveDate::MIN);
    let until = cmd.until.unwrap_or(NaiveDate::MAX);

    let mut records = tracker.state().history.query(since, until);
    records.sort_by_key(|r| r.date);

    if records.is_empty() && cmd.format != OutputFormat::Json {
        println!("No history recorded.");
        return Ok(());
    }

    let target_ml = tracker.state().target.daily_target_ml;
    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Plain => {
            for record in &records {
                println!("{} {}", record.date, record.intake);
            }
        }
        OutputFormat::Table => print_history_table(&records, target_ml),
    }
    Ok(())
}

fn print_history_table(records: &[HydrationRecord], target_ml: u32) {
    println!("{:<12} {:>10}  {}", "DATE", "INTAKE", "TARGET");
    for record in records {
        let met = target_ml > 0 && record.intake >= target_ml;
        println!(
            "{:<12} {:>7} ml  {}",
            record.date.to_string(),
            record.intake,
            if met { "met" } else { "" }
        );
    }
}

fn handle_trend(tracker: &Tracker<Storage>, cmd: &TrendCommand) -> anyhow::Result<()> {
    let period = Period::from(cmd.period);
    let reference = cmd.date.unwrap_or_else(today);
    let (series, stats) = tracker.trend(period, reference);
    let target_ml = tracker.state().target.daily_target_ml;

    match cmd.format {
        OutputFormat::Json => {
            let points: Vec<_> = series
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "date": p.date,
                        "intake": p.intake,
                        "met_target": p.met_target(target_ml),
                    })
                })
                .collect();
            let trend = serde_json::json!({
                "period": period,
                "reference_date": reference,
                "target_ml": target_ml,
                "series": points,
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&trend)?);
        }
        OutputFormat::Plain => {
            for point in &series {
                println!("{} {}", point.date, point.intake);
            }
        }
        OutputFormat::Table => print_trend_table(&series, &stats, period, target_ml),
    }
    Ok(())
}

fn print_trend_table(series: &[TrendPoint], stats: &SeriesStats, period: Period, target_ml: u32) {
    println!("Intake over the last {period} (axis max {} ml)", stats.axis_max_ml);
    println!();
    for point in series {
        let marker = if point.met_target(target_ml) { '*' } else { ' ' };
        println!(
            "{} {:>6} ml {}|{}",
            point.date,
            point.intake,
            marker,
            bar(point.intake, stats.axis_max_ml)
        );
    }
    println!();
    println!("Total:         {} ml", stats.total_ml);
    println!("Daily average: {} ml", stats.average_ml);
    println!("Peak:          {} ml", stats.peak_ml);
    if target_ml > 0 {
        println!(
            "Target met:    {} of {} day(s)",
            stats.days_met_target, stats.days
        );
    }
}

fn bar(intake: u32, axis_max: u32) -> String {
    if axis_max == 0 {
        return String::new();
    }
    let filled = u64::from(intake) * u64::from(BAR_WIDTH) / u64::from(axis_max);
    let filled = usize::try_from(filled.min(u64::from(BAR_WIDTH))).unwrap_or(0);
    "#".repeat(filled)
}

fn handle_reminder(tracker: &mut Tracker<Storage>, config: &Config, cmd: &ReminderCommand) {
    match cmd {
        ReminderCommand::Set { hours } => {
            let permission = Permission::from_allowed(config.reminders.notifications_allowed);
            // Denial is reported through the queued notice
            if tracker.set_reminder_interval(*hours, permission).is_ok() && *hours > 0 {
                println!("Run `watermedic watch` to receive reminders.");
            }
        }
        ReminderCommand::Show => {
            let hours = tracker.state().reminder_interval_hours;
            if hours == 0 {
                println!("Reminders are off.");
            } else {
                println!("Reminders every {hours} hour(s).");
            }
        }
    }
}

fn handle_watch(tracker: &mut Tracker<Storage>, config: &Config) -> anyhow::Result<()> {
    let notifier = ConsoleNotifier::new(Permission::from_allowed(
        config.reminders.notifications_allowed,
    ));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    println!("Watching hydration. Press Ctrl-C to stop.");
    runtime.block_on(watch::watch(
        tracker,
        &notifier,
        config.rollover_check_interval(),
        today,
        shutdown_signal(),
    ));
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn handle_export(tracker: &Tracker<Storage>, file: Option<&Path>) -> anyhow::Result<()> {
    let json = PersistedState::from(tracker.state()).to_json_pretty()?;
    match file {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported state to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn handle_import(tracker: &mut Tracker<Storage>, file: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let persisted = PersistedState::from_json(&json)
        .with_context(|| format!("{} is not a valid watermedic export", file.display()))?;

    let days = persisted.hydration_history.len();
    tracker.import(persisted, today());
    println!("Imported state with {days} day(s) of history.");
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Tracker]");
                println!("  Step (ml):          {}", config.tracker.step_ml);
                println!(
                    "  Rollover check:     every {} minute(s)",
                    config.tracker.rollover_check_minutes
                );
                println!();
                println!("[Reminders]");
                println!(
                    "  Notifications:      {}",
                    if config.reminders.notifications_allowed {
                        "allowed"
                    } else {
                        "blocked"
                    }
                );
            }
        }
        ConfigCommand::Path | ConfigCommand::Validate { .. } => {
            handle_config_file(&cmd, None);
        }
    }
    Ok(())
}

/// Handle the config commands that work on a file path rather than on the
/// loaded configuration. `active` is the `--config` path, if given.
fn handle_config_file(cmd: &ConfigCommand, active: Option<&Path>) {
    match cmd {
        ConfigCommand::Path => {
            println!("{}", active_config_path(active).display());
        }
        ConfigCommand::Validate { file } => {
            let (path, result) = validate_config_file(file.as_deref(), active);
            println!("Validating configuration: {}", path.display());
            match result {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
        ConfigCommand::Show { .. } => {}
    }
}

fn active_config_path(active: Option<&Path>) -> PathBuf {
    active.map_or_else(Config::default_config_path, Path::to_path_buf)
}

/// Load `file`, or the active config file when none is named.
fn validate_config_file(
    file: Option<&Path>,
    active: Option<&Path>,
) -> (PathBuf, watermedic::Result<Config>) {
    let path = file.map_or_else(|| active_config_path(active), Path::to_path_buf);
    let result = Config::load_from(Some(path.clone()));
    (path, result)
}
