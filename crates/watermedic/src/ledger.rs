//! Running intake total for the current day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Size of one glass, used to express intake and target in glasses.
pub const GLASS_SIZE_ML: u32 = 250;

/// Today's running intake and the date it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerState {
    /// Water consumed since the last reset, in milliliters.
    pub current_intake_ml: u32,
    /// Calendar date of the last reset; `None` before the first run.
    pub last_reset_date: Option<NaiveDate>,
}

/// Apply an intake change, flooring the total at zero.
///
/// There is no upper bound beyond what fits in a `u32`.
#[must_use]
pub fn add(ledger: LedgerState, delta_ml: i64) -> LedgerState {
    let total = i64::from(ledger.current_intake_ml).saturating_add(delta_ml);
    let current_intake_ml = u32::try_from(total.max(0)).unwrap_or(u32::MAX);
    LedgerState {
        current_intake_ml,
        ..ledger
    }
}

/// Number of full glasses in `intake_ml`.
#[must_use]
pub fn glasses_consumed(intake_ml: u32) -> u32 {
    intake_ml / GLASS_SIZE_ML
}

/// Number of glasses needed to reach `target_ml`, rounded up.
#[must_use]
pub fn glasses_target(target_ml: u32) -> u32 {
    target_ml.div_ceil(GLASS_SIZE_ML)
}
