//! Weight units and conversion to kilograms.

use serde::{Deserialize, Serialize};

/// Kilograms per pound.
pub const KG_PER_LB: f64 = 0.453_592;

/// Unit the user enters body weight in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    /// Kilograms.
    #[default]
    Kg,
    /// Pounds.
    Lb,
}

impl WeightUnit {
    /// Convert a weight in this unit to kilograms.
    #[must_use]
    pub fn to_kilograms(self, value: f64) -> f64 {
        match self {
            Self::Kg => value,
            Self::Lb => value * KG_PER_LB,
        }
    }
}

impl std::fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kg => write!(f, "kg"),
            Self::Lb => write!(f, "lb"),
        }
    }
}
