use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::utils::{clock::Clock, time::utc_days_diff};

use super::{
    entities::{merge_same_day, EntryView, Record, StoreSummary},
    storage::KeyValueStorage,
};

pub const RECORDS_KEY: &str = "records";

/// Number of days a record stays visible before it is pruned.
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Owns the dated records. At most one [Record] exists per UTC day, and every read goes through
/// [RecordStore::prune_expired] first so stale data disappears on next access.
pub struct RecordStore<S: KeyValueStorage> {
    storage: S,
    clock: Box<dyn Clock>,
    records: Vec<Record>,
    retention_days: u32,
}

impl<S: KeyValueStorage> RecordStore<S> {
    /// Loads the persisted snapshot. Missing, unreadable or malformed data gives an empty store.
    pub fn load(storage: S, clock: Box<dyn Clock>) -> Self {
        let records = match storage.get(RECORDS_KEY) {
            Ok(Some(blob)) => parse_records(&blob),
            Ok(None) => vec![],
            Err(e) => {
                warn!("Couldn't read stored records, starting empty: {e:?}");
                vec![]
            }
        };

        debug!("Loaded {} records", records.len());

        Self {
            storage,
            clock,
            records,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }

    pub fn with_retention(self, retention_days: u32) -> Self {
        Self {
            retention_days,
            ..self
        }
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Adds `text` to today's record, creating the record if needed. Blank text is ignored and
    /// `false` is returned.
    pub fn add_entry(&mut self, text: &str) -> Result<bool> {
        let now = self.clock.time();
        self.add_entry_at(now, text)
    }

    /// Adds `text` to the record of the UTC day containing `instant`.
    #[instrument(skip(self))]
    pub fn add_entry_at(&mut self, instant: DateTime<Utc>, text: &str) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring blank entry");
            return Ok(false);
        }

        self.insert(instant, text.to_owned());
        self.persist()?;
        Ok(true)
    }

    /// Adds every entry not already present on the day of `instant`. Returns how many were added.
    pub fn add_missing_entries_at(
        &mut self,
        instant: DateTime<Utc>,
        entries: &[&str],
    ) -> Result<usize> {
        let day = instant.date_naive();
        let mut added = 0;
        for text in entries.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
            let present = self
                .find_day(day)
                .is_some_and(|index| self.records[index].contains(text));
            if !present {
                self.insert(instant, text.to_owned());
                added += 1;
            }
        }

        if added > 0 {
            self.persist()?;
        }
        Ok(added)
    }

    /// Removes one occurrence of `text` from the record of `day`. The first matching entry is the
    /// one removed. A record left without entries is dropped. Returns whether anything changed.
    #[instrument(skip(self))]
    pub fn remove_entry(&mut self, day: NaiveDate, text: &str) -> Result<bool> {
        let Some(index) = self.find_day(day) else {
            debug!("No record for {day}");
            return Ok(false);
        };

        if !self.records[index].remove_first(text) {
            debug!("No matching entry on {day}");
            return Ok(false);
        }

        if self.records[index].entries.is_empty() {
            info!("Record for {day} became empty, removing it");
            self.records.remove(index);
        }

        self.persist()?;
        Ok(true)
    }

    /// Drops every record further than `retention_days` UTC days away from `reference`. Returns
    /// the days that were removed. Failing to persist the pruned snapshot is only logged, the next
    /// read prunes again.
    pub fn prune_expired(
        &mut self,
        retention_days: u32,
        reference: DateTime<Utc>,
    ) -> BTreeSet<NaiveDate> {
        let mut removed = BTreeSet::new();
        self.records.retain(|record| {
            let keep = utc_days_diff(record.date, reference) <= retention_days;
            if !keep {
                removed.insert(record.day());
            }
            keep
        });

        if !removed.is_empty() {
            info!("Pruned records for {removed:?}");
            if let Err(e) = self.persist() {
                error!("Failed to persist pruned records {e:?}");
            }
        }
        removed
    }

    /// Flat list of every entry, after pruning with the configured retention window. Order is not
    /// meaningful.
    pub fn all_entries(&mut self) -> Vec<EntryView> {
        let now = self.clock.time();
        self.prune_expired(self.retention_days, now);

        self.records
            .iter()
            .flat_map(|record| {
                let days_diff = utc_days_diff(record.date, now);
                record.entries.iter().map(move |text| EntryView {
                    text: text.clone(),
                    day: record.day(),
                    date: record.date,
                    days_diff,
                })
            })
            .collect()
    }

    /// Counts what is left after pruning with the configured retention window.
    pub fn summary(&mut self) -> StoreSummary {
        let now = self.clock.time();
        self.prune_expired(self.retention_days, now);

        StoreSummary {
            total_records: self.records.len(),
            total_entries: self.records.iter().map(|v| v.entries.len()).sum(),
            oldest: self.records.iter().map(|v| v.date).min(),
            newest: self.records.iter().map(|v| v.date).max(),
        }
    }

    /// Removes every record together with the persisted snapshot.
    pub fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.storage.remove(RECORDS_KEY)
    }

    /// Whether `text` is still logged on `day`.
    pub fn contains_entry(&self, day: NaiveDate, text: &str) -> bool {
        self.find_day(day)
            .is_some_and(|i| self.records[i].contains(text))
    }

    /// Serialized form of the current snapshot.
    pub fn snapshot(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.records)?)
    }

    fn find_day(&self, day: NaiveDate) -> Option<usize> {
        self.records.iter().position(|v| v.day() == day)
    }

    fn insert(&mut self, instant: DateTime<Utc>, text: String) {
        match self.find_day(instant.date_naive()) {
            Some(index) => self.records[index].entries.push(text),
            None => self.records.push(Record::new(instant, text)),
        }
    }

    fn persist(&self) -> Result<()> {
        self.storage.set(RECORDS_KEY, &self.snapshot()?)
    }
}

/// Parses a stored snapshot. Anything that isn't a list of records is treated as no records at
/// all.
pub fn parse_records(blob: &str) -> Vec<Record> {
    match serde_json::from_str::<Vec<Record>>(blob) {
        Ok(records) => merge_same_day(records),
        Err(e) => {
            warn!("Stored records are malformed, starting empty: {e}");
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, rc::Rc};

    use anyhow::Result;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{
        store::storage::{FileStorage, KeyValueStorage, MemoryStorage},
        utils::{clock::ManualClock, logging::TEST_LOGGING},
    };

    use super::{RecordStore, RECORDS_KEY};

    fn test_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 7, 10, 0, 0).unwrap()
    }

    fn memory_store(
        now: DateTime<Utc>,
    ) -> (
        RecordStore<Rc<MemoryStorage>>,
        Rc<MemoryStorage>,
        std::sync::Arc<ManualClock>,
    ) {
        let storage = Rc::new(MemoryStorage::new());
        let clock = ManualClock::new(now);
        let store = RecordStore::load(storage.clone(), Box::new(clock.clone()));
        (store, storage, clock)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_day_entries_share_record() -> Result<()> {
        *TEST_LOGGING;
        let (mut store, _, clock) = memory_store(test_start());

        assert!(store.add_entry("شكر الله")?);
        clock.advance(Duration::hours(5));
        assert!(store.add_entry("نعمة")?);
        clock.advance(Duration::hours(1));
        assert!(store.add_entry("نعمة")?);

        assert_eq!(store.records().len(), 1);
        let record = &store.records()[0];
        assert_eq!(record.day(), day(2025, 3, 7));
        assert_eq!(record.date, test_start());
        assert_eq!(record.entries, vec!["شكر الله", "نعمة", "نعمة"]);
        Ok(())
    }

    #[test]
    fn test_blank_entries_rejected() -> Result<()> {
        let (mut store, storage, _) = memory_store(test_start());
        store.add_entry("first")?;

        assert!(!store.add_entry("")?);
        assert!(!store.add_entry("   ")?);
        assert!(!store.add_entry("\t\n")?);

        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].entries.len(), 1);
        assert_eq!(storage.get(RECORDS_KEY)?, Some(store.snapshot()?));
        Ok(())
    }

    #[test]
    fn test_entries_are_trimmed() -> Result<()> {
        let (mut store, _, _) = memory_store(test_start());
        store.add_entry("  صدقة ")?;
        assert_eq!(store.records()[0].entries, vec!["صدقة"]);
        Ok(())
    }

    #[test]
    fn test_new_day_creates_record() -> Result<()> {
        let (mut store, _, clock) = memory_store(test_start());
        store.add_entry("one")?;
        clock.set(Utc.with_ymd_and_hms(2025, 3, 8, 0, 0, 1).unwrap());
        store.add_entry("two")?;

        assert_eq!(store.records().len(), 2);
        assert_eq!(store.records()[1].day(), day(2025, 3, 8));
        Ok(())
    }

    #[test]
    fn test_prune_boundary() -> Result<()> {
        let (mut store, _, _) = memory_store(test_start());
        let reference = test_start();
        store.add_entry_at(reference - Duration::days(8), "eight")?;
        store.add_entry_at(reference - Duration::days(7), "seven")?;
        store.add_entry_at(reference - Duration::days(1), "one")?;

        let removed = store.prune_expired(7, reference);

        assert_eq!(removed.into_iter().collect::<Vec<_>>(), vec![day(2025, 2, 27)]);
        let days = store.records().iter().map(|v| v.day()).collect::<Vec<_>>();
        assert_eq!(days, vec![day(2025, 2, 28), day(2025, 3, 6)]);
        Ok(())
    }

    #[test]
    fn test_prune_uses_calendar_days() -> Result<()> {
        // 23:30 eight days back is less than 8 * 24 hours before 10:00 but still 8 calendar days.
        let (mut store, _, _) = memory_store(test_start());
        store.add_entry_at(Utc.with_ymd_and_hms(2025, 2, 27, 23, 30, 0).unwrap(), "old")?;
        let removed = store.prune_expired(7, test_start());
        assert_eq!(removed.len(), 1);
        assert!(store.records().is_empty());
        Ok(())
    }

    #[test]
    fn test_prune_persists() -> Result<()> {
        let (mut store, storage, _) = memory_store(test_start());
        store.add_entry("x")?;
        store.prune_expired(7, test_start() + Duration::days(8));
        assert_eq!(storage.get(RECORDS_KEY)?.as_deref(), Some("[]"));
        Ok(())
    }

    #[test]
    fn test_scenario_add_then_expire() -> Result<()> {
        let (mut store, _, _) = memory_store(test_start());
        store.add_entry("شكر الله")?;
        store.add_entry("نعمة")?;
        assert_eq!(store.records().len(), 1);

        let removed = store.prune_expired(7, test_start() + Duration::days(8));
        assert_eq!(removed.len(), 1);
        assert!(store.records().is_empty());
        Ok(())
    }

    #[test]
    fn test_all_entries_prunes_lazily() -> Result<()> {
        let (mut store, storage, clock) = memory_store(test_start());
        store.add_entry("old")?;
        clock.advance(Duration::days(3));
        store.add_entry("newer")?;
        clock.advance(Duration::days(5));

        let entries = store.all_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "newer");
        assert_eq!(entries[0].days_diff, 5);

        let reloaded = RecordStore::load(storage.clone(), Box::new(clock.clone()));
        assert_eq!(reloaded.records().len(), 1);
        Ok(())
    }

    #[test]
    fn test_custom_retention() -> Result<()> {
        let (store, _, clock) = memory_store(test_start());
        let mut store = store.with_retention(3);
        store.add_entry("x")?;
        clock.advance(Duration::days(3));
        assert_eq!(store.all_entries().len(), 1);
        clock.advance(Duration::days(1));
        assert!(store.all_entries().is_empty());
        Ok(())
    }

    #[test]
    fn test_remove_single_entry_drops_record() -> Result<()> {
        let (mut store, _, _) = memory_store(test_start());
        store.add_entry("only")?;
        assert!(store.remove_entry(day(2025, 3, 7), "only")?);
        assert!(store.records().is_empty());
        Ok(())
    }

    #[test]
    fn test_remove_first_duplicate() -> Result<()> {
        let (mut store, _, _) = memory_store(test_start());
        store.add_entry("a")?;
        store.add_entry("b")?;
        store.add_entry("a")?;
        assert!(store.remove_entry(day(2025, 3, 7), "a")?);
        assert_eq!(store.records()[0].entries, vec!["b", "a"]);
        Ok(())
    }

    #[test]
    fn test_remove_miss_is_noop() -> Result<()> {
        let (mut store, storage, _) = memory_store(test_start());
        store.add_entry("a")?;
        let before = storage.get(RECORDS_KEY)?;
        assert!(!store.remove_entry(day(2025, 3, 6), "a")?);
        assert!(!store.remove_entry(day(2025, 3, 7), "b")?);
        assert_eq!(storage.get(RECORDS_KEY)?, before);
        assert_eq!(store.records()[0].entries, vec!["a"]);
        Ok(())
    }

    #[test]
    fn test_malformed_blob_loads_empty() -> Result<()> {
        *TEST_LOGGING;
        for blob in ["not json at all", "{\"date\":1}", "[{\"entries\":[]}]", "42", ""] {
            let storage = Rc::new(MemoryStorage::new());
            storage.set(RECORDS_KEY, blob)?;
            let mut store =
                RecordStore::load(storage.clone(), Box::new(ManualClock::new(test_start())));
            assert!(store.records().is_empty(), "{blob}");
            assert!(store.all_entries().is_empty());
            assert!(store.add_entry("recovered")?);
            assert_eq!(store.records().len(), 1);
        }
        Ok(())
    }

    #[test]
    fn test_duplicate_days_merged_on_load() -> Result<()> {
        let storage = Rc::new(MemoryStorage::new());
        storage.set(
            RECORDS_KEY,
            r#"[{"date":"2025-03-07T12:00:00Z","entries":["b"]},
                {"date":"2025-03-07T08:00:00Z","entries":["a"]}]"#,
        )?;
        let store = RecordStore::load(storage, Box::new(ManualClock::new(test_start())));
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].entries, vec!["b", "a"]);
        Ok(())
    }

    #[test]
    fn test_round_trip_through_files() -> Result<()> {
        let dir = tempdir()?;
        let clock = ManualClock::new(test_start());
        let mut store = RecordStore::load(
            FileStorage::new(dir.path().to_owned())?,
            Box::new(clock.clone()),
        );
        store.add_entry_at(test_start() - Duration::days(2), "x")?;
        store.add_entry("y")?;
        store.add_entry("y")?;
        store.add_entry("z")?;

        let mut reloaded = RecordStore::load(
            FileStorage::new(dir.path().to_owned())?,
            Box::new(clock.clone()),
        );

        let multiset = |entries: Vec<crate::store::entities::EntryView>| {
            let mut map = HashMap::<(String, NaiveDate), usize>::new();
            for entry in entries {
                *map.entry((entry.text, entry.day)).or_default() += 1;
            }
            map
        };
        assert_eq!(multiset(store.all_entries()), multiset(reloaded.all_entries()));
        assert_eq!(reloaded.summary().total_entries, 4);
        Ok(())
    }

    #[test]
    fn test_summary_prunes_after_reload() -> Result<()> {
        let (mut store, storage, clock) = memory_store(test_start());
        store.add_entry("x")?;
        clock.advance(Duration::days(10));

        let mut reloaded = RecordStore::load(storage.clone(), Box::new(clock.clone()));
        let summary = reloaded.summary();
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.total_entries, 0);
        assert_eq!(summary.oldest, None);
        assert_eq!(storage.get(RECORDS_KEY)?.as_deref(), Some("[]"));
        Ok(())
    }

    #[test]
    fn test_add_missing_entries_skips_present() -> Result<()> {
        let (mut store, _, _) = memory_store(test_start());
        store.add_entry("a")?;
        let added = store.add_missing_entries_at(test_start(), &["a", "b", " ", "c"])?;
        assert_eq!(added, 2);
        assert_eq!(store.records()[0].entries, vec!["a", "b", "c"]);
        Ok(())
    }

    #[test]
    fn test_summary_and_clear() -> Result<()> {
        let (mut store, storage, _) = memory_store(test_start());
        store.add_entry_at(test_start() - Duration::days(3), "x")?;
        store.add_entry("y")?;
        store.add_entry("z")?;

        let summary = store.summary();
        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.total_entries, 3);
        assert_eq!(summary.oldest, Some(test_start() - Duration::days(3)));
        assert_eq!(summary.newest, Some(test_start()));

        store.clear()?;
        assert!(store.records().is_empty());
        assert_eq!(storage.get(RECORDS_KEY)?, None);
        Ok(())
    }
}
