//! Application state and the tracker that owns it.
//!
//! [`AppState`] holds everything the components operate on. [`Tracker`]
//! wraps it together with a [`StateGateway`] and applies each user action
//! as one commit: mutate memory, persist, queue notices. Persistence and
//! input problems never abort an action; they become [`Notice`]s and the
//! in-memory state stays authoritative.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::history::History;
use crate::ledger::{self, LedgerState};
use crate::notice::Notice;
use crate::progress::Progress;
use crate::reminder::Permission;
use crate::rollover::{self, RolloverOutcome};
use crate::storage::{PersistedState, StateGateway};
use crate::target::{CalculatorInputs, TargetState};
use crate::trend::{self, Period, SeriesStats, TrendPoint};
use crate::units::WeightUnit;

/// Everything the tracker operates on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    /// Current daily target.
    pub target: TargetState,
    /// Today's running total.
    pub ledger: LedgerState,
    /// Archived daily totals.
    pub history: History,
    /// Unit the weight input is expressed in.
    pub weight_unit: WeightUnit,
    /// Inputs last used for the target calculation.
    pub inputs: CalculatorInputs,
    /// Reminder interval in hours; 0 disables reminders.
    pub reminder_interval_hours: u32,
}

impl AppState {
    /// Progress figures for the current state.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::new(self.ledger.current_intake_ml, self.target.daily_target_ml)
    }
}

impl From<PersistedState> for AppState {
    fn from(persisted: PersistedState) -> Self {
        Self {
            target: TargetState {
                daily_target_ml: persisted.daily_target_ml,
            },
            ledger: LedgerState {
                current_intake_ml: persisted.current_intake_ml,
                last_reset_date: persisted.last_reset_date,
            },
            history: persisted.hydration_history,
            weight_unit: persisted.weight_unit,
            inputs: persisted.calculator_inputs,
            reminder_interval_hours: persisted.reminder_interval,
        }
    }
}

impl From<&AppState> for PersistedState {
    fn from(state: &AppState) -> Self {
        Self {
            daily_target_ml: state.target.daily_target_ml,
            current_intake_ml: state.ledger.current_intake_ml,
            weight_unit: state.weight_unit,
            last_reset_date: state.ledger.last_reset_date,
            hydration_history: state.history.clone(),
            reminder_interval: state.reminder_interval_hours,
            calculator_inputs: state.inputs,
        }
    }
}

/// Owner of the application state and its persistence.
#[derive(Debug)]
pub struct Tracker<G: StateGateway> {
    state: AppState,
    gateway: G,
    notices: Vec<Notice>,
    /// Set while memory holds changes the last save failed to store.
    dirty: bool,
}

impl<G: StateGateway> Tracker<G> {
    /// Load state from `gateway` and bring it up to `today`.
    ///
    /// Missing state starts from defaults. Unreadable state also starts from
    /// defaults and queues [`Notice::LoadFailed`]. Discarding a corrupt
    /// record is left to the gateway.
    pub fn restore(gateway: G, today: NaiveDate) -> Self {
        let mut notices = Vec::new();
        let state = match gateway.load() {
            Ok(Some(persisted)) => AppState::from(persisted),
            Ok(None) => {
                debug!("No saved state, starting with defaults");
                AppState::default()
            }
            Err(e) => {
                warn!("Failed to load saved state: {}", e);
                notices.push(Notice::LoadFailed {
                    message: e.to_string(),
                });
                AppState::default()
            }
        };

        let mut tracker = Self {
            state,
            gateway,
            notices,
            dirty: false,
        };
        tracker.check_rollover(today);
        tracker
    }

    /// Replace the in-memory state with whatever is currently stored.
    ///
    /// Used by long-running callers so changes made by other invocations
    /// are observed. Memory is kept when nothing is stored or the load fails.
    ///
    /// While memory is ahead of storage after a failed save, nothing is
    /// loaded. The save is retried instead and memory stays authoritative.
    pub fn reload(&mut self) {
        if self.dirty {
            match self.gateway.save(&PersistedState::from(&self.state)) {
                Ok(()) => {
                    debug!("Stored state caught up with memory");
                    self.dirty = false;
                }
                Err(e) => debug!("State still unsaved, keeping memory: {}", e),
            }
            return;
        }

        match self.gateway.load() {
            Ok(Some(persisted)) => self.state = AppState::from(persisted),
            Ok(None) => debug!("Nothing stored, keeping in-memory state"),
            Err(e) => {
                warn!("Failed to reload state: {}", e);
                self.notices.push(Notice::LoadFailed {
                    message: e.to_string(),
                });
            }
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The persistence gateway.
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Archive the previous day and reset the ledger if `today` is a new day.
    pub fn check_rollover(&mut self, today: NaiveDate) -> RolloverOutcome {
        let first_run = self.state.ledger.last_reset_date.is_none();
        let outcome = rollover::check_rollover(
            today,
            &mut self.state.ledger,
            &mut self.state.history,
            self.state.target.daily_target_ml,
        );

        if outcome.rolled {
            if !first_run {
                self.notices.push(Notice::DailyReset {
                    archived: outcome.archived,
                });
            }
            self.persist();
        }
        outcome
    }

    /// Recompute the target from the stored inputs and unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the stored inputs are invalid;
    /// the previous target is kept and [`Notice::InvalidInput`] is queued.
    pub fn recalculate_target(&mut self) -> Result<u32> {
        let target_ml = self.apply_target(self.state.inputs, self.state.weight_unit)?;
        self.persist();
        Ok(target_ml)
    }

    /// Store new calculator inputs, with weight given in `unit`, and
    /// recompute the target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the inputs are invalid; the
    /// inputs, unit and target all stay as they were.
    pub fn set_inputs(&mut self, inputs: CalculatorInputs, unit: WeightUnit) -> Result<u32> {
        let target_ml = self.apply_target(inputs, unit)?;
        self.state.inputs = inputs;
        self.state.weight_unit = unit;
        self.persist();
        Ok(target_ml)
    }

    /// Switch the weight unit and recompute the target immediately.
    ///
    /// The unit change is kept even if the recalculation fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the stored inputs are invalid.
    pub fn set_unit(&mut self, unit: WeightUnit) -> Result<u32> {
        self.state.weight_unit = unit;
        let result = self.apply_target(self.state.inputs, unit);
        self.persist();
        result
    }

    /// Add `delta_ml` to today's intake, never going below zero.
    ///
    /// Returns the new intake.
    pub fn add_intake(&mut self, delta_ml: i64) -> u32 {
        self.state.ledger = ledger::add(self.state.ledger, delta_ml);
        debug!(
            "Intake changed by {} ml to {} ml",
            delta_ml, self.state.ledger.current_intake_ml
        );
        self.persist();
        self.state.ledger.current_intake_ml
    }

    /// Set the reminder interval in hours; 0 turns reminders off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] when `hours` is positive and
    /// `permission` is denied. The interval is then forced to 0 and that
    /// choice is persisted.
    pub fn set_reminder_interval(&mut self, hours: u32, permission: Permission) -> Result<()> {
        if hours > 0 && permission == Permission::Denied {
            warn!("Notification permission denied, turning reminders off");
            self.state.reminder_interval_hours = 0;
            self.persist();
            self.notices.push(Notice::PermissionDenied);
            return Err(Error::permission_denied(
                "notifications are not allowed; reminders turned off",
            ));
        }

        self.state.reminder_interval_hours = hours;
        self.persist();
        if hours == 0 {
            info!("Reminders turned off");
            self.notices.push(Notice::RemindersOff);
        } else {
            info!("Reminders set for every {} hour(s)", hours);
            self.notices.push(Notice::RemindersSet { hours });
        }
        Ok(())
    }

    /// Replace the whole state with `persisted`, then bring it up to `today`.
    pub fn import(&mut self, persisted: PersistedState, today: NaiveDate) {
        info!(
            "Importing state with {} history record(s)",
            persisted.hydration_history.len()
        );
        self.state = AppState::from(persisted);
        self.persist();
        self.check_rollover(today);
    }

    /// Progress figures for display.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.state.progress()
    }

    /// Gap-filled series for `period` ending at `reference`, with its summary.
    #[must_use]
    pub fn trend(&self, period: Period, reference: NaiveDate) -> (Vec<TrendPoint>, SeriesStats) {
        let series = trend::build_series(&self.state.history, period, reference);
        let stats = trend::summarize(&series, self.state.target.daily_target_ml);
        (series, stats)
    }

    /// Save the current state.
    ///
    /// A failure is logged and queued as [`Notice::SaveFailed`]; memory is
    /// not rolled back. Returns whether the save succeeded.
    pub fn persist(&mut self) -> bool {
        let saved = match self.gateway.save(&PersistedState::from(&self.state)) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save state: {}", e);
                self.notices.push(Notice::SaveFailed {
                    message: e.to_string(),
                });
                false
            }
        };
        self.dirty = !saved;
        saved
    }

    /// Whether memory holds changes that are not stored yet.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Drain the queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn apply_target(&mut self, inputs: CalculatorInputs, unit: WeightUnit) -> Result<u32> {
        match inputs.compute(unit) {
            Ok(target_ml) => {
                info!("Daily target set to {} ml", target_ml);
                self.state.target.daily_target_ml = target_ml;
                self.notices.push(Notice::TargetUpdated { target_ml });
                Ok(target_ml)
            }
            Err(e) => {
                debug!("Rejected calculator inputs: {}", e);
                if let Error::InvalidInput { message } = &e {
                    self.notices.push(Notice::InvalidInput {
                        message: message.clone(),
                    });
                }
                Err(e)
            }
        }
    }
}
