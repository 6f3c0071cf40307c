//! Lenient decoding for saved state.
//!
//! The browser version of the tracker stored form values verbatim, so
//! numbers may arrive as strings (`"30"`), empty strings or `null`. Values
//! that are missing, empty or zero fall back to the field default.

use serde::{Deserialize, Deserializer};

use crate::target::{DEFAULT_AGE, DEFAULT_WEIGHT};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
}

fn loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Number(n)) => Some(n),
        Some(Loose::Text(s)) => s.trim().parse().ok(),
        None => None,
    };
    Ok(value.filter(|n| *n != 0.0))
}

/// Non-negative integer, zero when absent or unparseable.
pub(crate) fn u32_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = loose_number(deserializer)?
        .filter(|n| n.is_finite() && *n > 0.0)
        .map_or(0, |n| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = n.trunc().min(f64::from(u32::MAX)) as u32;
            whole
        });
    Ok(value)
}

/// Age input, defaulting when absent.
pub(crate) fn age<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_number(deserializer)?.unwrap_or(DEFAULT_AGE))
}

/// Weight input, defaulting when absent.
pub(crate) fn weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_number(deserializer)?.unwrap_or(DEFAULT_WEIGHT))
}
