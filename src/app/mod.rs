//! Application layer. [Tracker] wires the record store, the checklist and the settings to a
//! single storage and clock, the way the cli (or any other frontend) uses them.

pub mod checklist;
pub mod demo;
pub mod settings;

use std::{collections::BTreeSet, sync::Arc};

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use checklist::{Checklist, ChecklistItem};
use rand::Rng;
use settings::Settings;
use tracing::info;

use crate::{
    display::projector::{project, Projection},
    store::{
        entities::StoreSummary,
        record_store::RecordStore,
        storage::KeyValueStorage,
    },
    utils::clock::Clock,
};

pub struct Tracker<S: KeyValueStorage + Clone> {
    storage: S,
    clock: Arc<dyn Clock>,
    records: RecordStore<S>,
    checklist: Checklist<S>,
    settings: Settings,
}

impl<S: KeyValueStorage + Clone> Tracker<S> {
    pub fn load(storage: S, clock: Arc<dyn Clock>) -> Self {
        let records = RecordStore::load(storage.clone(), Box::new(clock.clone()));
        let checklist = Checklist::load(storage.clone(), Box::new(clock.clone()));
        let settings = Settings::load(&storage);
        Self {
            storage,
            clock,
            records,
            checklist,
            settings,
        }
    }

    /// The clock every component of this tracker reads time from.
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn records(&mut self) -> &mut RecordStore<S> {
        &mut self.records
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies `change` to the settings and saves them if it succeeds.
    pub fn update_settings<T>(
        &mut self,
        change: impl FnOnce(&mut Settings) -> Result<T>,
    ) -> Result<T> {
        let mut settings = self.settings.clone();
        let result = change(&mut settings)?;
        settings.save(&self.storage)?;
        self.settings = settings;
        Ok(result)
    }

    pub fn add_entry(&mut self, text: &str) -> Result<bool> {
        self.records.add_entry(text)
    }

    /// Removes one entry. Removing the last copy of something logged today also clears the
    /// matching checklist mark.
    pub fn remove_entry(&mut self, day: NaiveDate, text: &str) -> Result<bool> {
        let removed = self.records.remove_entry(day, text)?;
        if removed
            && day == self.today()
            && !self.records.contains_entry(day, text)
            && self.checklist.uncheck(text)?
        {
            info!("Unchecked {text:?} after removing it from today");
        }
        Ok(removed)
    }

    pub fn prune(&mut self) -> BTreeSet<NaiveDate> {
        let retention = self.records.retention_days();
        let now = self.clock.time();
        self.records.prune_expired(retention, now)
    }

    /// Projects the store for display, with headings written in `Tz`.
    pub fn view<Tz: TimeZone>(&mut self, rng: &mut impl Rng) -> Projection
    where
        DateTime<Tz>: From<DateTime<Utc>>,
        Tz::Offset: std::fmt::Display,
    {
        let entries = self.records.all_entries();
        project::<Tz>(entries, self.settings.language, rng)
    }

    pub fn checklist_items(&self) -> Vec<ChecklistItem> {
        self.checklist.items()
    }

    pub fn hidden_items(&self) -> &[String] {
        self.checklist.hidden()
    }

    /// Checks an item and logs it as today's entry. Returns `false` if nothing changed.
    pub fn check(&mut self, item: &str) -> Result<bool> {
        if !self.checklist.check(item)? {
            return Ok(false);
        }
        self.records.add_entry(item)?;
        Ok(true)
    }

    /// Unchecks an item and takes the matching entry back out of today's record.
    pub fn uncheck(&mut self, item: &str) -> Result<bool> {
        if !self.checklist.uncheck(item)? {
            return Ok(false);
        }
        let today = self.today();
        self.records.remove_entry(today, item)?;
        Ok(true)
    }

    pub fn add_checklist_item(&mut self, item: &str) -> Result<bool> {
        self.checklist.add_custom(item)
    }

    pub fn remove_checklist_item(&mut self, item: &str) -> Result<bool> {
        self.checklist.remove(item)
    }

    pub fn restore_checklist_item(&mut self, item: &str) -> Result<bool> {
        self.checklist.restore(item)
    }

    pub fn populate_demo_data(&mut self) -> Result<usize> {
        let now = self.clock.time();
        demo::populate_demo_data(&mut self.records, now)
    }

    pub fn clear_demo_data(&mut self) -> Result<()> {
        demo::clear_demo_data(&mut self.records)
    }

    pub fn demo_info(&mut self) -> StoreSummary {
        demo::demo_info(&mut self.records)
    }

    fn today(&self) -> NaiveDate {
        self.clock.time().date_naive()
    }
}
