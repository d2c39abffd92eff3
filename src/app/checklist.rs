use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::{
    store::storage::KeyValueStorage,
    utils::{clock::Clock, time::date_to_record_name},
};

pub const CUSTOM_ITEMS_KEY: &str = "checklist_custom";
pub const HIDDEN_ITEMS_KEY: &str = "checklist_hidden";
const CHECKED_KEY_PREFIX: &str = "checklist_";

/// Daily good deeds every checklist starts with.
pub const DEFAULT_ITEMS: [&str; 17] = [
    "صلاة الفجر في وقتها",
    "أذكار الصباح",
    "صلاة الضحى",
    "وِرد القرآن",
    "صلاة الظهر في وقتها",
    "الاستغفار",
    "الصدقة",
    "صلة الرحم",
    "صلاة العصر في وقتها",
    "أذكار المساء",
    "صلاة المغرب في وقتها",
    "سبحان الله وبحمده 100 مرة",
    "صلاة العشاء في وقتها",
    "الوتر",
    "صلاة قيام الليل",
    "بر الوالدين",
    "الأمر بالمعروف والنهي عن المنكر",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    BuiltinVisible,
    BuiltinHidden,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub text: String,
    pub kind: ItemKind,
    pub checked: bool,
}

/// Daily checklist. Checked marks are kept per UTC day, so every day starts unchecked.
pub struct Checklist<S: KeyValueStorage> {
    storage: S,
    clock: Box<dyn Clock>,
    custom: Vec<String>,
    hidden: Vec<String>,
}

impl<S: KeyValueStorage> Checklist<S> {
    pub fn load(storage: S, clock: Box<dyn Clock>) -> Self {
        let custom = load_list(&storage, CUSTOM_ITEMS_KEY);
        let hidden = load_list(&storage, HIDDEN_ITEMS_KEY);
        Self {
            storage,
            clock,
            custom,
            hidden,
        }
    }

    pub fn kind_of(&self, text: &str) -> Option<ItemKind> {
        if DEFAULT_ITEMS.contains(&text) {
            if self.hidden.iter().any(|v| v == text) {
                Some(ItemKind::BuiltinHidden)
            } else {
                Some(ItemKind::BuiltinVisible)
            }
        } else if self.custom.iter().any(|v| v == text) {
            Some(ItemKind::Custom)
        } else {
            None
        }
    }

    /// Visible built-in items followed by custom ones, with today's checked state.
    pub fn items(&self) -> Vec<ChecklistItem> {
        let checked = self.checked_today();
        DEFAULT_ITEMS
            .iter()
            .map(|v| v.to_string())
            .filter(|v| !self.hidden.contains(v))
            .map(|text| (text, ItemKind::BuiltinVisible))
            .chain(self.custom.iter().cloned().map(|v| (v, ItemKind::Custom)))
            .map(|(text, kind)| ChecklistItem {
                checked: checked.contains(&text),
                text,
                kind,
            })
            .collect()
    }

    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }

    pub fn checked_today(&self) -> Vec<String> {
        load_list(&self.storage, &self.checked_key())
    }

    pub fn is_checked(&self, text: &str) -> bool {
        self.checked_today().iter().any(|v| v == text)
    }

    /// Marks a visible item as done for today. Returns `false` when the item is unknown, hidden or
    /// already checked.
    pub fn check(&mut self, text: &str) -> Result<bool> {
        if !matches!(
            self.kind_of(text),
            Some(ItemKind::BuiltinVisible | ItemKind::Custom)
        ) {
            debug!("Can't check {text:?}, not a visible item");
            return Ok(false);
        }

        let mut checked = self.checked_today();
        if checked.iter().any(|v| v == text) {
            return Ok(false);
        }
        checked.push(text.to_owned());
        save_list(&self.storage, &self.checked_key(), &checked)?;
        Ok(true)
    }

    /// Clears today's mark. Returns whether the item was checked.
    pub fn uncheck(&mut self, text: &str) -> Result<bool> {
        let mut checked = self.checked_today();
        let Some(index) = checked.iter().position(|v| v == text) else {
            return Ok(false);
        };
        checked.remove(index);
        save_list(&self.storage, &self.checked_key(), &checked)?;
        Ok(true)
    }

    /// Adds a custom item. Blank text and text matching an existing item are ignored.
    pub fn add_custom(&mut self, text: &str) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() || self.kind_of(text).is_some() {
            return Ok(false);
        }
        self.custom.push(text.to_owned());
        info!("Added custom item {text:?}");
        save_list(&self.storage, CUSTOM_ITEMS_KEY, &self.custom)?;
        Ok(true)
    }

    /// Hides a built-in item or deletes a custom one.
    pub fn remove(&mut self, text: &str) -> Result<bool> {
        match self.kind_of(text) {
            Some(ItemKind::BuiltinVisible) => {
                self.hidden.push(text.to_owned());
                save_list(&self.storage, HIDDEN_ITEMS_KEY, &self.hidden)?;
                Ok(true)
            }
            Some(ItemKind::Custom) => {
                self.custom.retain(|v| v != text);
                save_list(&self.storage, CUSTOM_ITEMS_KEY, &self.custom)?;
                Ok(true)
            }
            Some(ItemKind::BuiltinHidden) | None => Ok(false),
        }
    }

    /// Makes a hidden built-in item visible again.
    pub fn restore(&mut self, text: &str) -> Result<bool> {
        if self.kind_of(text) != Some(ItemKind::BuiltinHidden) {
            return Ok(false);
        }
        self.hidden.retain(|v| v != text);
        save_list(&self.storage, HIDDEN_ITEMS_KEY, &self.hidden)?;
        Ok(true)
    }

    fn checked_key(&self) -> String {
        format!(
            "{CHECKED_KEY_PREFIX}{}",
            date_to_record_name(self.clock.time().date_naive())
        )
    }
}

fn load_list<T: DeserializeOwned>(storage: &impl KeyValueStorage, key: &str) -> Vec<T> {
    match storage.get(key) {
        Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
            warn!("Stored list {key} is malformed, ignoring it: {e}");
            vec![]
        }),
        Ok(None) => vec![],
        Err(e) => {
            warn!("Couldn't read {key}: {e:?}");
            vec![]
        }
    }
}

fn save_list<T: Serialize>(storage: &impl KeyValueStorage, key: &str, values: &[T]) -> Result<()> {
    storage.set(key, &serde_json::to_string(values)?)
}
