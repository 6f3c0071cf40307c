//! Day boundary detection and archival.
//!
//! When the calendar date moves past the ledger's reset date, the finished
//! day's total is written to history and the ledger starts over at zero.
//! Checking again on the same date does nothing, so the check can run at
//! startup and on a timer without archiving a day twice.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::history::{History, HydrationRecord};
use crate::ledger::LedgerState;

/// Result of a rollover check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RolloverOutcome {
    /// Whether the ledger was reset for a new day.
    pub rolled: bool,
    /// The record written to history, if any.
    pub archived: Option<HydrationRecord>,
}

/// Reset the ledger if `today` differs from its last reset date.
///
/// The previous day is archived only when a reset date exists and there was
/// something worth recording: intake above zero or a target in place. On the
/// first run there is no reset date, so only the date is initialized.
pub fn check_rollover(
    today: NaiveDate,
    ledger: &mut LedgerState,
    history: &mut History,
    daily_target_ml: u32,
) -> RolloverOutcome {
    if ledger.last_reset_date == Some(today) {
        return RolloverOutcome::default();
    }

    let mut archived = None;
    match ledger.last_reset_date {
        Some(previous) if ledger.current_intake_ml > 0 || daily_target_ml > 0 => {
            let record = HydrationRecord::new(previous, ledger.current_intake_ml);
            if let Some(replaced) = history.upsert(record) {
                debug!(
                    "Replaced archived intake for {}: {} -> {} ml",
                    previous, replaced, record.intake
                );
            }
            info!("Archived {} ml for {}", record.intake, previous);
            archived = Some(record);
        }
        Some(previous) => debug!("Nothing to archive for {}", previous),
        None => debug!("First run, initializing reset date to {}", today),
    }

    ledger.current_intake_ml = 0;
    ledger.last_reset_date = Some(today);

    RolloverOutcome {
        rolled: true,
        archived,
    }
}
