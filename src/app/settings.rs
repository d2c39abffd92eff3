use std::{fmt::Display, time::Duration};

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{display::locale::Language, store::storage::KeyValueStorage};

pub const SETTINGS_KEY: &str = "settings";

pub const DEFAULT_REMINDER_INTERVAL: u32 = 10;
pub const DEFAULT_STOPWATCH_DURATION: u32 = 5;
pub const MAX_STOPWATCH_DURATION: u32 = 120;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// User preferences, stored as a single json object. Fields missing from the stored object take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub language: Language,
    pub reminders_enabled: bool,
    /// Minutes between reminders.
    pub reminder_interval: u32,
    /// Minutes the focus stopwatch counts down from.
    pub stopwatch_duration: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: Language::default(),
            reminders_enabled: true,
            reminder_interval: DEFAULT_REMINDER_INTERVAL,
            stopwatch_duration: DEFAULT_STOPWATCH_DURATION,
        }
    }
}

impl Settings {
    /// Reads settings from storage. Malformed or unreadable data falls back to defaults, and
    /// out of range values are replaced with their defaults.
    pub fn load(storage: &impl KeyValueStorage) -> Self {
        let settings = match storage.get(SETTINGS_KEY) {
            Ok(Some(blob)) => serde_json::from_str::<Settings>(&blob).unwrap_or_else(|e| {
                warn!("Stored settings are malformed, using defaults: {e}");
                Settings::default()
            }),
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("Couldn't read settings, using defaults: {e:?}");
                Settings::default()
            }
        };
        settings.sanitized()
    }

    pub fn save(&self, storage: &impl KeyValueStorage) -> Result<()> {
        debug!("Saving settings {self:?}");
        storage.set(SETTINGS_KEY, &serde_json::to_string(self)?)
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = match self.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
        self.theme
    }

    pub fn toggle_reminders(&mut self) -> bool {
        self.reminders_enabled = !self.reminders_enabled;
        self.reminders_enabled
    }

    pub fn set_reminder_interval(&mut self, minutes: u32) -> Result<()> {
        if minutes == 0 {
            return Err(anyhow!("Reminder interval must be at least one minute"));
        }
        self.reminder_interval = minutes;
        Ok(())
    }

    pub fn set_stopwatch_duration(&mut self, minutes: u32) -> Result<()> {
        if !(1..=MAX_STOPWATCH_DURATION).contains(&minutes) {
            return Err(anyhow!(
                "Stopwatch duration must be between 1 and {MAX_STOPWATCH_DURATION} minutes, got {minutes}"
            ));
        }
        self.stopwatch_duration = minutes;
        Ok(())
    }

    pub fn reminder_period(&self) -> Duration {
        Duration::from_secs(u64::from(self.reminder_interval) * 60)
    }

    fn sanitized(mut self) -> Self {
        if self.reminder_interval == 0 {
            self.reminder_interval = DEFAULT_REMINDER_INTERVAL;
        }
        if !(1..=MAX_STOPWATCH_DURATION).contains(&self.stopwatch_duration) {
            self.stopwatch_duration = DEFAULT_STOPWATCH_DURATION;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::Result;

    use crate::{
        display::locale::Language,
        store::storage::{KeyValueStorage, MemoryStorage},
    };

    use super::{Settings, Theme, SETTINGS_KEY};

    #[test]
    fn test_defaults_when_missing() {
        let storage = MemoryStorage::new();
        let settings = Settings::load(&storage);
        assert_eq!(settings, Settings::default());
        assert!(settings.reminders_enabled);
        assert_eq!(settings.reminder_period(), Duration::from_secs(600));
    }

    #[test]
    fn test_partial_object() -> Result<()> {
        let storage = MemoryStorage::new();
        storage.set(SETTINGS_KEY, r#"{"theme":"dark","remindersEnabled":false}"#)?;
        let settings = Settings::load(&storage);
        assert_eq!(settings.theme, Theme::Dark);
        assert!(!settings.reminders_enabled);
        assert_eq!(settings.reminder_interval, 10);
        assert_eq!(settings.stopwatch_duration, 5);
        assert_eq!(settings.language, Language::En);
        Ok(())
    }

    #[test]
    fn test_malformed_and_out_of_range() -> Result<()> {
        let storage = MemoryStorage::new();
        storage.set(SETTINGS_KEY, "{{{")?;
        assert_eq!(Settings::load(&storage), Settings::default());

        storage.set(
            SETTINGS_KEY,
            r#"{"reminderInterval":0,"stopwatchDuration":500,"language":"ar"}"#,
        )?;
        let settings = Settings::load(&storage);
        assert_eq!(settings.reminder_interval, 10);
        assert_eq!(settings.stopwatch_duration, 5);
        assert_eq!(settings.language, Language::Ar);
        Ok(())
    }

    #[test]
    fn test_save_round_trip() -> Result<()> {
        let storage = MemoryStorage::new();
        let mut settings = Settings::default();
        assert_eq!(settings.toggle_theme(), Theme::Dark);
        assert!(!settings.toggle_reminders());
        settings.set_reminder_interval(25)?;
        settings.set_stopwatch_duration(120)?;
        settings.save(&storage)?;

        assert_eq!(Settings::load(&storage), settings);
        Ok(())
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        assert!(settings.set_reminder_interval(0).is_err());
        assert!(settings.set_stopwatch_duration(0).is_err());
        assert!(settings.set_stopwatch_duration(121).is_err());
        assert_eq!(settings, Settings::default());
    }
}
