//! Archive of past daily totals.
//!
//! Records are keyed by calendar date. Storage order is whatever order the
//! records arrived in; consumers that need chronological order sort
//! explicitly or go through [`History::sorted`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Total intake recorded for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrationRecord {
    /// The calendar date this total belongs to.
    pub date: NaiveDate,
    /// Total intake for the day, in milliliters.
    pub intake: u32,
}

impl HydrationRecord {
    /// Create a record.
    #[must_use]
    pub fn new(date: NaiveDate, intake: u32) -> Self {
        Self { date, intake }
    }
}

/// Past daily totals with at most one record per date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<HydrationRecord>", into = "Vec<HydrationRecord>")]
pub struct History {
    records: Vec<HydrationRecord>,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from raw records, collapsing duplicate dates.
    ///
    /// When a date appears more than once the last occurrence wins.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = HydrationRecord>) -> Self {
        records.into_iter().fold(Self::new(), |mut history, record| {
            history.upsert(record);
            history
        })
    }

    /// Insert `record`, replacing any existing record for the same date.
    ///
    /// Returns the intake that was replaced, if any.
    pub fn upsert(&mut self, record: HydrationRecord) -> Option<u32> {
        if let Some(existing) = self.records.iter_mut().find(|r| r.date == record.date) {
            let previous = existing.intake;
            existing.intake = record.intake;
            Some(previous)
        } else {
            self.records.push(record);
            None
        }
    }

    /// Look up the record for `date`.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&HydrationRecord> {
        self.records.iter().find(|r| r.date == date)
    }

    /// Records whose date lies in `since..=through`, in storage order.
    #[must_use]
    pub fn query(&self, since: NaiveDate, through: NaiveDate) -> Vec<HydrationRecord> {
        self.records
            .iter()
            .filter(|r| r.date >= since && r.date <= through)
            .copied()
            .collect()
    }

    /// All records sorted ascending by date.
    #[must_use]
    pub fn sorted(&self) -> Vec<HydrationRecord> {
        let mut records = self.records.clone();
        records.sort_by_key(|r| r.date);
        records
    }

    /// Iterate records in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &HydrationRecord> {
        self.records.iter()
    }

    /// Number of archived days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no day has been archived yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<HydrationRecord>> for History {
    fn from(records: Vec<HydrationRecord>) -> Self {
        Self::from_records(records)
    }
}

impl From<History> for Vec<HydrationRecord> {
    fn from(history: History) -> Self {
        history.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_upsert_appends_new_date() {
        let mut history = History::new();
        assert_eq!(history.upsert(HydrationRecord::new(date(1), 2000)), None);
        assert_eq!(history.upsert(HydrationRecord::new(date(2), 1500)), None);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_upsert_replaces_same_date() {
        let mut history = History::new();
        history.upsert(HydrationRecord::new(date(1), 2000));
        assert_eq!(history.upsert(HydrationRecord::new(date(1), 750)), Some(2000));
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(date(1)).unwrap().intake, 750);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let record = HydrationRecord::new(date(3), 1250);
        let mut once = History::new();
        once.upsert(record);
        let mut twice = once.clone();
        twice.upsert(record);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_query_is_inclusive() {
        let history = History::from_records([
            HydrationRecord::new(date(5), 500),
            HydrationRecord::new(date(1), 100),
            HydrationRecord::new(date(3), 300),
            HydrationRecord::new(date(7), 700),
        ]);
        let mut found = history.query(date(3), date(5));
        found.sort_by_key(|r| r.date);
        assert_eq!(
            found,
            vec![
                HydrationRecord::new(date(3), 300),
                HydrationRecord::new(date(5), 500)
            ]
        );
        assert!(history.query(date(8), date(10)).is_empty());
    }

    #[test]
    fn test_from_records_collapses_duplicates() {
        let history = History::from_records([
            HydrationRecord::new(date(2), 100),
            HydrationRecord::new(date(2), 900),
            HydrationRecord::new(date(4), 400),
        ]);
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(date(2)).unwrap().intake, 900);
    }

    #[test]
    fn test_sorted() {
        let history = History::from_records([
            HydrationRecord::new(date(9), 1),
            HydrationRecord::new(date(2), 2),
            HydrationRecord::new(date(5), 3),
        ]);
        let dates: Vec<_> = history.sorted().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2), date(5), date(9)]);
    }

    #[test]
    fn test_serde_uses_plain_array() {
        let history = History::from_records([HydrationRecord::new(date(1), 2000)]);
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"[{"date":"2024-05-01","intake":2000}]"#);

        let dup = r#"[{"date":"2024-05-01","intake":1},{"date":"2024-05-01","intake":2}]"#;
        let parsed: History = serde_json::from_str(dup).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get(date(1)).unwrap().intake, 2);
    }
}
