use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One UTC calendar day's bundle of logged entries. `date` is the instant the first entry of the
/// day was added and is kept at full precision; the day itself is derived from it.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct Record {
    pub date: DateTime<Utc>,
    pub entries: Vec<String>,
}

impl Record {
    pub fn new(date: DateTime<Utc>, first_entry: String) -> Self {
        Self {
            date,
            entries: vec![first_entry],
        }
    }

    /// Calendar day of the record, always in UTC.
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Removes the first entry equal to `text`. Returns whether something was removed.
    pub fn remove_first(&mut self, text: &str) -> bool {
        match self.entries.iter().position(|entry| entry == text) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|entry| entry == text)
    }
}

/// Flattened view of a single entry, produced by
/// [RecordStore::all_entries](super::record_store::RecordStore::all_entries).
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct EntryView {
    pub text: String,
    pub day: NaiveDate,
    /// Creation instant of the record the entry belongs to.
    pub date: DateTime<Utc>,
    pub days_diff: u32,
}

/// Totals over the whole store.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct StoreSummary {
    pub total_records: usize,
    pub total_entries: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

/// Merges records that share a UTC day into the earliest one, keeping entries in stored order.
/// The result holds at most one record per day and keeps the order of first appearance.
pub fn merge_same_day(records: impl IntoIterator<Item = Record>) -> Vec<Record> {
    let mut merged: Vec<Record> = Vec::new();

    for record in records {
        match merged.iter_mut().find(|v| v.day() == record.day()) {
            Some(existing) => {
                existing.date = existing.date.min(record.date);
                existing.entries.extend(record.entries);
            }
            None => merged.push(record),
        }
    }

    merged.retain(|v| !v.entries.is_empty());
    merged
}
