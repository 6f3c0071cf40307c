//! Gap-filled intake series for charting.
//!
//! A series covers every calendar date in the period window, whether or not
//! history has a record for it. Missing days are reported as zero so charts
//! stay continuous and averages stay honest.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::history::History;

/// Axis ceiling used when neither history nor a target gives a scale.
pub const DEFAULT_AXIS_MAX_ML: u32 = 3000;

/// Lookback window for a trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The last 7 days.
    #[default]
    Week,
    /// The last 30 days.
    Month,
    /// The last 365 days.
    Year,
}

impl Period {
    /// Number of calendar days in the window, including the reference date.
    #[must_use]
    pub fn window_days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }

    /// First date of the window ending at `reference`.
    ///
    /// Saturates at the earliest representable date.
    #[must_use]
    pub fn start_date(self, reference: NaiveDate) -> NaiveDate {
        reference
            .checked_sub_days(Days::new(u64::from(self.window_days() - 1)))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
            Self::Year => write!(f, "year"),
        }
    }
}

/// One day on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Calendar date.
    pub date: NaiveDate,
    /// Intake for the day; zero when nothing was recorded.
    pub intake: u32,
}

impl TrendPoint {
    /// Whether this day reached `target_ml`. Never true without a target.
    #[must_use]
    pub fn met_target(&self, target_ml: u32) -> bool {
        target_ml > 0 && self.intake >= target_ml
    }
}

/// Build the dense, date-ascending series for `period` ending at `reference`.
#[must_use]
pub fn build_series(history: &History, period: Period, reference: NaiveDate) -> Vec<TrendPoint> {
    let start = period.start_date(reference);
    let recorded: BTreeMap<NaiveDate, u32> = history
        .query(start, reference)
        .into_iter()
        .map(|r| (r.date, r.intake))
        .collect();

    let mut series: Vec<TrendPoint> = start
        .iter_days()
        .take_while(|date| *date <= reference)
        .map(|date| TrendPoint {
            date,
            intake: recorded.get(&date).copied().unwrap_or(0),
        })
        .collect();

    series.sort_by_key(|p| p.date);
    series
}

/// Aggregate figures for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesStats {
    /// Number of days in the series.
    pub days: usize,
    /// Sum of intake across the series.
    pub total_ml: u64,
    /// Average intake per day, rounded down.
    pub average_ml: u32,
    /// Highest single-day intake.
    pub peak_ml: u32,
    /// Days that reached the target.
    pub days_met_target: usize,
    /// Upper bound for the chart's intake axis.
    pub axis_max_ml: u32,
}

/// Summarize `series` against `target_ml`.
#[must_use]
pub fn summarize(series: &[TrendPoint], target_ml: u32) -> SeriesStats {
    let days = series.len();
    let total_ml: u64 = series.iter().map(|p| u64::from(p.intake)).sum();
    let peak_ml = series.iter().map(|p| p.intake).max().unwrap_or(0);
    let average_ml = if days == 0 {
        0
    } else {
        u32::try_from(total_ml / days as u64).unwrap_or(u32::MAX)
    };
    let days_met_target = series.iter().filter(|p| p.met_target(target_ml)).count();

    SeriesStats {
        days,
        total_ml,
        average_ml,
        peak_ml,
        days_met_target,
        axis_max_ml: axis_max(peak_ml, target_ml),
    }
}

/// Give the chart 20% headroom above the peak, falling back to the target.
fn axis_max(peak_ml: u32, target_ml: u32) -> u32 {
    let scale = if peak_ml > 0 { peak_ml } else { target_ml };
    if scale == 0 {
        return DEFAULT_AXIS_MAX_ML;
    }
    u32::try_from(u64::from(scale) * 6 / 5).unwrap_or(u32::MAX)
}
