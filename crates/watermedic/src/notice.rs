//! Transient user-facing messages.
//!
//! Operations that recover from an error locally, or that change something
//! the user should hear about, queue a [`Notice`] instead of failing.

use crate::history::HydrationRecord;

/// A message to show the user once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The daily target was recalculated.
    TargetUpdated {
        /// New target in milliliters.
        target_ml: u32,
    },
    /// Calculator inputs were rejected and the target kept.
    InvalidInput {
        /// Why the inputs were rejected.
        message: String,
    },
    /// A new day started and the ledger was reset.
    DailyReset {
        /// The previous day's archived total, if any.
        archived: Option<HydrationRecord>,
    },
    /// Saved state could not be loaded; the tracker started fresh.
    LoadFailed {
        /// What went wrong.
        message: String,
    },
    /// State could not be saved; the change is kept in memory only.
    SaveFailed {
        /// What went wrong.
        message: String,
    },
    /// Reminders were scheduled.
    RemindersSet {
        /// Reminder interval in hours.
        hours: u32,
    },
    /// Reminders were turned off.
    RemindersOff,
    /// Notification permission is missing, so reminders were turned off.
    PermissionDenied,
}

impl Notice {
    /// Whether this notice reports a problem rather than a change.
    #[must_use]
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::LoadFailed { .. }
                | Self::SaveFailed { .. }
                | Self::PermissionDenied
        )
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetUpdated { target_ml } => {
                write!(f, "Daily target updated to {target_ml} ml.")
            }
            Self::InvalidInput { message } => {
                write!(f, "Please enter a valid age and weight ({message}).")
            }
            Self::DailyReset { archived: Some(record) } => write!(
                f,
                "New day started. Saved {} ml for {}.",
                record.intake, record.date
            ),
            Self::DailyReset { archived: None } => write!(f, "Daily intake reset for the new day."),
            Self::LoadFailed { message } => {
                write!(f, "Could not load saved data ({message}). Starting fresh.")
            }
            Self::SaveFailed { message } => write!(
                f,
                "Could not save data ({message}). Changes are kept until the program exits."
            ),
            Self::RemindersSet { hours } => {
                write!(f, "Hydration reminders set for every {hours} hour(s).")
            }
            Self::RemindersOff => write!(f, "Hydration reminders turned off."),
            Self::PermissionDenied => write!(
                f,
                "Notification permission denied. Reminders have been turned off."
            ),
        }
    }
}
