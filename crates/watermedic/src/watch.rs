//! Long-running tracker loop.
//!
//! Two timers drive the loop: a rollover check on a fixed period and the
//! reminder schedule. Both run on one task, so their effects never
//! interleave. State is reloaded from storage before each tick so changes
//! made by other invocations are observed, unless memory holds changes that
//! could not be saved.

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::reminder::{Notifier, Reminder, ReminderScheduler};
use crate::state::Tracker;
use crate::storage::StateGateway;

/// Run the tracker until `shutdown` completes.
///
/// `today` supplies the current local date for each rollover check. The
/// first rollover check runs immediately.
pub async fn watch<G, N, F, S>(
    tracker: &mut Tracker<G>,
    notifier: &N,
    rollover_every: Duration,
    today: F,
    shutdown: S,
) where
    G: StateGateway,
    N: Notifier + ?Sized,
    F: Fn() -> NaiveDate,
    S: Future<Output = ()>,
{
    debug!(
        rollover_secs = rollover_every.as_secs(),
        "Starting watch loop"
    );

    let mut scheduler = ReminderScheduler::new();
    let mut rollover_ticker = interval(rollover_every);
    rollover_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("Stopping watch loop");
                break;
            }
            _ = rollover_ticker.tick() => {
                tracker.reload();
                tracker.check_rollover(today());
                sync_schedule(tracker, &mut scheduler, notifier);
            }
            () = scheduler.tick() => {
                tracker.reload();
                tracker.check_rollover(today());
                let reminder = Reminder::from(tracker.state());
                if let Err(e) = notifier.notify(&reminder).await {
                    warn!(error = %e, "Failed to deliver reminder");
                }
                sync_schedule(tracker, &mut scheduler, notifier);
            }
        }

        report_notices(tracker);
    }

    report_notices(tracker);
}

/// Bring the scheduler in line with the stored reminder interval.
fn sync_schedule<G, N>(tracker: &mut Tracker<G>, scheduler: &mut ReminderScheduler, notifier: &N)
where
    G: StateGateway,
    N: Notifier + ?Sized,
{
    let hours = tracker.state().reminder_interval_hours;
    if hours == scheduler.interval_hours() {
        return;
    }

    let permission = notifier.permission();
    if scheduler.reschedule(hours, permission).is_err() {
        // Forces the stored interval to 0 and queues the notice
        let _ = tracker.set_reminder_interval(hours, permission);
    }
}

fn report_notices<G: StateGateway>(tracker: &mut Tracker<G>) {
    for notice in tracker.take_notices() {
        if notice.is_problem() {
            warn!("{}", notice);
        } else {
            info!("{}", notice);
        }
    }
}
