//! Daily water target calculation.
//!
//! The target is derived from body weight, scaled by activity level and
//! weather. Each factor multiplies the running value in a fixed order
//! (weight, base, activity, weather) so results are reproducible.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::units::WeightUnit;

/// Milliliters of water per kilogram of body weight.
pub const ML_PER_KG: f64 = 35.0;

/// Multiplier applied on hot days, after the activity multiplier.
pub const HOT_WEATHER_MULTIPLIER: f64 = 1.15;

/// Age used before the user has entered one.
pub const DEFAULT_AGE: f64 = 30.0;

/// Weight used before the user has entered one.
pub const DEFAULT_WEIGHT: f64 = 70.0;

/// How active the user is on a typical day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    /// Little or no exercise.
    Sedentary,
    /// Some exercise most days.
    #[default]
    Moderate,
    /// Heavy exercise or physical work.
    High,
}

impl ActivityLevel {
    /// Multiplier applied to the base target. Levels are exclusive.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.0,
            Self::Moderate => 1.10,
            Self::High => 1.20,
        }
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sedentary => write!(f, "sedentary"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
        }
    }
}

/// The biometric and context inputs the target is computed from.
///
/// Weight is kept in whatever unit the user entered; the unit lives
/// alongside these inputs in the application state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatorInputs {
    /// Age in years.
    #[serde(deserialize_with = "crate::compat::age")]
    pub age: f64,
    /// Body weight in the selected unit.
    #[serde(deserialize_with = "crate::compat::weight")]
    pub weight: f64,
    /// Typical activity level.
    pub activity_level: ActivityLevel,
    /// Whether it is hot today.
    pub weather_hot: bool,
}

impl Default for CalculatorInputs {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            weight: DEFAULT_WEIGHT,
            activity_level: ActivityLevel::default(),
            weather_hot: false,
        }
    }
}

impl CalculatorInputs {
    /// Compute the target for these inputs with weight given in `unit`.
    ///
    /// # Errors
    ///
    /// See [`compute`].
    pub fn compute(&self, unit: WeightUnit) -> Result<u32> {
        compute(
            self.age,
            self.weight,
            unit,
            self.activity_level,
            self.weather_hot,
        )
    }
}

/// The current daily target. Recomputed when inputs change, never historized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetState {
    /// Daily target in milliliters; zero means no target has been set.
    pub daily_target_ml: u32,
}

impl TargetState {
    /// Whether a target has been computed.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.daily_target_ml > 0
    }
}

/// Compute the daily target in milliliters.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when `age` or `weight` is not a finite,
/// strictly positive number.
pub fn compute(
    age: f64,
    weight: f64,
    unit: WeightUnit,
    activity: ActivityLevel,
    hot_weather: bool,
) -> Result<u32> {
    if !age.is_finite() || age <= 0.0 {
        return Err(Error::invalid_input(format!(
            "age must be a positive number, got {age}"
        )));
    }
    if !weight.is_finite() || weight <= 0.0 {
        return Err(Error::invalid_input(format!(
            "weight must be a positive number, got {weight}"
        )));
    }

    let weight_kg = unit.to_kilograms(weight);
    let mut target = weight_kg * ML_PER_KG;
    target *= activity.multiplier();
    if hot_weather {
        target *= HOT_WEATHER_MULTIPLIER;
    }

    let rounded = target.round();
    if rounded > f64::from(u32::MAX) {
        return Err(Error::invalid_input(format!(
            "weight {weight}{unit} is out of range"
        )));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let target_ml = rounded as u32;
    Ok(target_ml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::KG_PER_LB;

    #[test]
    fn test_moderate_kg() {
        assert_eq!(
            compute(30.0, 70.0, WeightUnit::Kg, ActivityLevel::Moderate, false).unwrap(),
            2695
        );
    }

    #[test]
    fn test_high_lb_hot() {
        // 154 lb = 69.853168 kg -> 2444.86 -> 2933.83 -> 3373.91
        let expected = (154.0 * KG_PER_LB * 35.0 * 1.20 * 1.15_f64).round();
        let got = compute(40.0, 154.0, WeightUnit::Lb, ActivityLevel::High, true).unwrap();
        assert!((f64::from(got) - expected).abs() < f64::EPSILON);
        assert_eq!(got, 3374);
    }

    #[test]
    fn test_sedentary_is_base() {
        assert_eq!(
            compute(25.0, 60.0, WeightUnit::Kg, ActivityLevel::Sedentary, false).unwrap(),
            2100
        );
    }

    #[test]
    fn test_hot_weather_applies_after_activity() {
        let got = compute(25.0, 60.0, WeightUnit::Kg, ActivityLevel::Sedentary, true).unwrap();
        assert_eq!(got, 2415);
    }

    #[test]
    fn test_deterministic() {
        let a = compute(51.0, 82.5, WeightUnit::Lb, ActivityLevel::High, true).unwrap();
        let b = compute(51.0, 82.5, WeightUnit::Lb, ActivityLevel::High, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_non_positive_age() {
        let err = compute(0.0, 70.0, WeightUnit::Kg, ActivityLevel::Moderate, false).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("age"));

        let err = compute(-3.0, 70.0, WeightUnit::Kg, ActivityLevel::Moderate, false).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_rejects_bad_weight() {
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err =
                compute(30.0, weight, WeightUnit::Kg, ActivityLevel::Moderate, false).unwrap_err();
            assert!(err.is_invalid_input(), "weight {weight} should be rejected");
        }
    }

    #[test]
    fn test_rejects_nan_age() {
        assert!(compute(f64::NAN, 70.0, WeightUnit::Kg, ActivityLevel::High, false).is_err());
    }

    #[test]
    fn test_activity_multipliers() {
        assert!((ActivityLevel::Sedentary.multiplier() - 1.0).abs() < f64::EPSILON);
        assert!((ActivityLevel::Moderate.multiplier() - 1.10).abs() < f64::EPSILON);
        assert!((ActivityLevel::High.multiplier() - 1.20).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_inputs() {
        let inputs = CalculatorInputs::default();
        assert_eq!(inputs.activity_level, ActivityLevel::Moderate);
        assert!(!inputs.weather_hot);
        assert_eq!(inputs.compute(WeightUnit::Kg).unwrap(), 2695);
    }

    #[test]
    fn test_inputs_from_browser_json() {
        let json = r#"{"age":"42","weight":"180","activityLevel":"high","weatherHot":true}"#;
        let inputs: CalculatorInputs = serde_json::from_str(json).unwrap();
        assert!((inputs.age - 42.0).abs() < f64::EPSILON);
        assert!((inputs.weight - 180.0).abs() < f64::EPSILON);
        assert_eq!(inputs.activity_level, ActivityLevel::High);
        assert!(inputs.weather_hot);
    }

    #[test]
    fn test_inputs_missing_fields_default() {
        let inputs: CalculatorInputs = serde_json::from_str("{}").unwrap();
        assert_eq!(inputs, CalculatorInputs::default());
    }

    #[test]
    fn test_target_state_is_set() {
        assert!(!TargetState::default().is_set());
        assert!(TargetState { daily_target_ml: 1 }.is_set());
    }
}
