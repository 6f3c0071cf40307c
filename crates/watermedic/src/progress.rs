//! Plain progress figures for display.

use serde::{Deserialize, Serialize};

use crate::ledger::{glasses_consumed, glasses_target};

/// Where today's intake stands against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Daily target in milliliters.
    pub target_ml: u32,
    /// Intake so far today in milliliters.
    pub current_intake_ml: u32,
    /// Full glasses consumed.
    pub glasses_consumed: u32,
    /// Glasses needed to reach the target.
    pub glasses_target: u32,
    /// Percent of target reached, clamped to 0..=100.
    pub percent: u8,
}

impl Progress {
    /// Compute progress for the given intake and target.
    #[must_use]
    pub fn new(current_intake_ml: u32, target_ml: u32) -> Self {
        let percent = if target_ml == 0 {
            0
        } else {
            let ratio = f64::from(current_intake_ml) / f64::from(target_ml) * 100.0;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let clamped = ratio.clamp(0.0, 100.0).round() as u8;
            clamped
        };

        Self {
            target_ml,
            current_intake_ml,
            glasses_consumed: glasses_consumed(current_intake_ml),
            glasses_target: glasses_target(target_ml),
            percent,
        }
    }

    /// Milliliters still needed to reach the target.
    #[must_use]
    pub fn remaining_ml(&self) -> u32 {
        self.target_ml.saturating_sub(self.current_intake_ml)
    }

    /// Whether the target has been reached.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.target_ml > 0 && self.current_intake_ml >= self.target_ml
    }
}
