//! Periodic hydration reminders.
//!
//! [`ReminderScheduler`] owns the single active reminder schedule. Changing
//! the interval always drops the old schedule before creating the new one,
//! so two schedules never run at once. Delivery goes through a [`Notifier`],
//! which also reports whether the host allows notifications at all.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::state::AppState;

const SECS_PER_HOUR: u64 = 60 * 60;

/// Whether the host environment allows notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Notifications may be shown.
    Granted,
    /// Notifications are blocked.
    Denied,
}

impl Permission {
    /// Map a boolean grant to a permission.
    #[must_use]
    pub fn from_allowed(allowed: bool) -> Self {
        if allowed {
            Self::Granted
        } else {
            Self::Denied
        }
    }
}

/// Payload delivered with each reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reminder {
    /// Intake so far today in milliliters.
    pub current_intake_ml: u32,
    /// Daily target in milliliters.
    pub daily_target_ml: u32,
}

impl Reminder {
    /// Human-readable reminder text.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Time to drink some water! You've had {} ml of your {} ml target.",
            self.current_intake_ml, self.daily_target_ml
        )
    }
}

impl From<&AppState> for Reminder {
    fn from(state: &AppState) -> Self {
        Self {
            current_intake_ml: state.ledger.current_intake_ml,
            daily_target_ml: state.target.daily_target_ml,
        }
    }
}

/// Delivers reminders to the user.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Whether notifications are currently permitted.
    fn permission(&self) -> Permission;

    /// Deliver one reminder.
    ///
    /// # Errors
    ///
    /// Returns an error if the reminder could not be delivered.
    async fn notify(&self, reminder: &Reminder) -> Result<()>;
}

/// Notifier that prints reminders to stdout.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    permission: Permission,
}

impl ConsoleNotifier {
    /// Create a console notifier with a fixed permission.
    #[must_use]
    pub fn new(permission: Permission) -> Self {
        Self { permission }
    }
}

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    async fn notify(&self, reminder: &Reminder) -> Result<()> {
        info!(
            intake_ml = reminder.current_intake_ml,
            target_ml = reminder.daily_target_ml,
            "Sending hydration reminder"
        );
        println!("💧 {}", reminder.message());
        Ok(())
    }
}

/// Owner of the one active reminder schedule.
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    interval_hours: u32,
    ticker: Option<Interval>,
}

impl ReminderScheduler {
    /// Create a scheduler with reminders disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The scheduled interval in hours; 0 when disabled.
    #[must_use]
    pub fn interval_hours(&self) -> u32 {
        self.interval_hours
    }

    /// Whether a schedule is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.ticker.is_some()
    }

    /// Replace the current schedule with one firing every `hours` hours.
    ///
    /// The previous schedule is cancelled first. `0` leaves reminders off.
    /// The first reminder fires one full interval from now. Must be called
    /// from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] when `hours` is positive and
    /// `permission` is denied; reminders are left off.
    pub fn reschedule(&mut self, hours: u32, permission: Permission) -> Result<()> {
        self.cancel();

        if hours == 0 {
            return Ok(());
        }
        if permission == Permission::Denied {
            return Err(Error::permission_denied(
                "notifications are not allowed; reminders stay off",
            ));
        }

        let period = Duration::from_secs(u64::from(hours) * SECS_PER_HOUR);
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.ticker = Some(ticker);
        self.interval_hours = hours;
        debug!("Reminders scheduled every {} hour(s)", hours);
        Ok(())
    }

    /// Cancel the active schedule, if any.
    pub fn cancel(&mut self) {
        if self.ticker.take().is_some() {
            debug!("Cancelled reminders every {} hour(s)", self.interval_hours);
        }
        self.interval_hours = 0;
    }

    /// Wait for the next reminder. Never completes while reminders are off.
    pub async fn tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_from_allowed() {
        assert_eq!(Permission::from_allowed(true), Permission::Granted);
        assert_eq!(Permission::from_allowed(false), Permission::Denied);
    }

    #[test]
    fn test_reminder_message() {
        let reminder = Reminder {
            current_intake_ml: 750,
            daily_target_ml: 2695,
        };
        let msg = reminder.message();
        assert!(msg.contains("750 ml"));
        assert!(msg.contains("2695 ml"));
    }

    #[test]
    fn test_new_scheduler_is_idle() {
        let scheduler = ReminderScheduler::new();
        assert!(!scheduler.is_active());
        assert_eq!(scheduler.interval_hours(), 0);
    }

    #[tokio::test]
    async fn test_reschedule_replaces_schedule() {
        let mut scheduler = ReminderScheduler::new();
        scheduler.reschedule(2, Permission::Granted).unwrap();
        assert!(scheduler.is_active());
        assert_eq!(scheduler.interval_hours(), 2);

        scheduler.reschedule(4, Permission::Granted).unwrap();
        assert_eq!(scheduler.interval_hours(), 4);

        scheduler.reschedule(0, Permission::Granted).unwrap();
        assert!(!scheduler.is_active());
    }

    #[tokio::test]
    async fn test_denied_permission_leaves_reminders_off() {
        let mut scheduler = ReminderScheduler::new();
        scheduler.reschedule(1, Permission::Granted).unwrap();

        let err = scheduler.reschedule(3, Permission::Denied).unwrap_err();

        assert!(err.is_permission_error());
        assert!(!scheduler.is_active());
        assert_eq!(scheduler.interval_hours(), 0);
    }

    #[tokio::test]
    async fn test_disabling_needs_no_permission() {
        let mut scheduler = ReminderScheduler::new();
        assert!(scheduler.reschedule(0, Permission::Denied).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_full_interval() {
        let mut scheduler = ReminderScheduler::new();
        scheduler.reschedule(1, Permission::Granted).unwrap();

        let start = Instant::now();
        scheduler.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(3600));

        scheduler.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(7200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_scheduler_never_ticks() {
        let mut scheduler = ReminderScheduler::new();
        let fired = tokio::time::timeout(Duration::from_secs(10 * 3600), scheduler.tick()).await;
        assert!(fired.is_err());
    }

    #[tokio::test]
    async fn test_console_notifier() {
        let notifier = ConsoleNotifier::new(Permission::Granted);
        assert_eq!(notifier.permission(), Permission::Granted);
        notifier
            .notify(&Reminder {
                current_intake_ml: 0,
                daily_target_ml: 2000,
            })
            .await
            .unwrap();
    }
}
