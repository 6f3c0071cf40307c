//! The persisted form of the tracker state.
//!
//! Field names follow the JSON layout of the browser version so a state
//! exported there can be imported here and vice versa.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::history::History;
use crate::target::CalculatorInputs;
use crate::units::WeightUnit;

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    /// Current daily target in milliliters.
    #[serde(deserialize_with = "crate::compat::u32_or_zero")]
    pub daily_target_ml: u32,
    /// Intake recorded since the last reset.
    #[serde(deserialize_with = "crate::compat::u32_or_zero")]
    pub current_intake_ml: u32,
    /// Unit the weight input is expressed in.
    pub weight_unit: WeightUnit,
    /// Date of the last daily reset, stored as `""` when unset.
    #[serde(with = "date_or_empty")]
    pub last_reset_date: Option<NaiveDate>,
    /// Archived daily totals.
    pub hydration_history: History,
    /// Reminder interval in hours; 0 disables reminders.
    #[serde(deserialize_with = "crate::compat::u32_or_zero")]
    pub reminder_interval: u32,
    /// Inputs last used for the target calculation.
    pub calculator_inputs: CalculatorInputs,
}

impl PersistedState {
    /// Decode a state from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error when `json` is not a valid state document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Encode the state as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

mod date_or_empty {
    use chrono::NaiveDate;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.collect_str(&date.format(FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, FORMAT)
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid date '{raw}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HydrationRecord;
    use crate::target::ActivityLevel;

    fn sample() -> PersistedState {
        PersistedState {
            daily_target_ml: 2695,
            current_intake_ml: 750,
            weight_unit: WeightUnit::Lb,
            last_reset_date: NaiveDate::from_ymd_opt(2024, 4, 2),
            hydration_history: History::from_records([HydrationRecord::new(
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                2250,
            )]),
            reminder_interval: 2,
            calculator_inputs: CalculatorInputs {
                age: 35.0,
                weight: 160.0,
                activity_level: ActivityLevel::High,
                weather_hot: true,
            },
        }
    }

    #[test]
    fn test_json_round_trip() {
        let state = sample();
        let json = state.to_json_pretty().unwrap();
        assert_eq!(PersistedState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn test_field_names_are_camel_case() {
        let json = serde_json::to_string(&sample()).unwrap();
        for key in [
            "dailyTargetMl",
            "currentIntakeMl",
            "weightUnit",
            "lastResetDate",
            "hydrationHistory",
            "reminderInterval",
            "calculatorInputs",
            "activityLevel",
            "weatherHot",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
        assert!(json.contains(r#""lastResetDate":"2024-04-02""#));
    }

    #[test]
    fn test_unset_date_serializes_empty() {
        let json = serde_json::to_string(&PersistedState::default()).unwrap();
        assert!(json.contains(r#""lastResetDate":"""#));
    }

    #[test]
    fn test_missing_fields_default() {
        let state = PersistedState::from_json("{}").unwrap();
        assert_eq!(state, PersistedState::default());
        assert_eq!(state.last_reset_date, None);
        assert_eq!(state.calculator_inputs, CalculatorInputs::default());
    }

    #[test]
    fn test_browser_saved_blob() {
        let json = r#"{
            "dailyTargetMl": 2695,
            "currentIntakeMl": 500,
            "weightUnit": "kg",
            "lastResetDate": "2024-04-02",
            "hydrationHistory": [{"date": "2024-04-01", "intake": 2000}],
            "reminderInterval": "2",
            "calculatorInputs": {"age": "30", "weight": "70", "activityLevel": "moderate", "weatherHot": false}
        }"#;
        let state = PersistedState::from_json(json).unwrap();
        assert_eq!(state.reminder_interval, 2);
        assert_eq!(state.current_intake_ml, 500);
        assert_eq!(state.hydration_history.len(), 1);
        assert!((state.calculator_inputs.weight - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_null_numbers_default() {
        let json = r#"{"dailyTargetMl": null, "currentIntakeMl": null, "lastResetDate": null}"#;
        let state = PersistedState::from_json(json).unwrap();
        assert_eq!(state.daily_target_ml, 0);
        assert_eq!(state.current_intake_ml, 0);
        assert_eq!(state.last_reset_date, None);
    }

    #[test]
    fn test_invalid_date_is_error() {
        assert!(PersistedState::from_json(r#"{"lastResetDate": "yesterday"}"#).is_err());
    }

    #[test]
    fn test_not_an_object_is_error() {
        assert!(PersistedState::from_json("42").is_err());
        assert!(PersistedState::from_json("{not json").is_err());
    }
}
