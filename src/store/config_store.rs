//! Typed access to the key-value store
//!
//! The `load_*`/`save_*` methods return `Result`s. The plain getters (`timers`,
//! `active_timer`, `settings`) fail soft: malformed or unreadable data is logged and
//! the documented default is returned instead. Edits of the timer list read strictly
//! and run one at a time, so unreadable data is reported instead of overwritten.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::{KeyValueStore, ACTIVE_TIMER_KEY, SETTINGS_KEY, TIMERS_KEY};
use crate::{
    error::StoreError,
    state::{ActiveTimer, NotificationSettings, TimerConfig},
};

#[derive(Clone)]
pub struct ConfigStore {
    backend: Arc<dyn KeyValueStore>,
    timers_edit: Arc<Mutex<()>>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore").finish_non_exhaustive()
    }
}

impl ConfigStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            timers_edit: Arc::new(Mutex::new(())),
        }
    }

    fn lock_timers(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.timers_edit.lock().map_err(|_| StoreError::Poisoned)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                key: key.to_string(),
                source,
            })
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let serialized =
            serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
                key: key.to_string(),
                source,
            })?;
        self.backend.set(key, &serialized)
    }

    // Saved timers

    pub fn load_timers(&self) -> Result<Vec<TimerConfig>, StoreError> {
        Ok(self.read(TIMERS_KEY)?.unwrap_or_default())
    }

    pub fn timers(&self) -> Vec<TimerConfig> {
        self.load_timers().unwrap_or_else(|e| {
            warn!("Failed to load saved timers, using an empty list: {}", e);
            Vec::new()
        })
    }

    /// Persist the list, filtering intervals outside `0 < interval <= duration`
    pub fn save_timers(&self, timers: &[TimerConfig]) -> Result<(), StoreError> {
        let _edit = self.lock_timers()?;
        self.write_timers(timers)
    }

    fn write_timers(&self, timers: &[TimerConfig]) -> Result<(), StoreError> {
        let sanitized: Vec<TimerConfig> = timers
            .iter()
            .cloned()
            .map(|mut timer| {
                timer.sanitize_intervals();
                timer
            })
            .collect();
        self.write(TIMERS_KEY, &sanitized)
    }

    pub fn find_timer(&self, id: &str) -> Option<TimerConfig> {
        self.timers().into_iter().find(|timer| timer.id == id)
    }

    /// Insert or replace by id; new timers are appended
    pub fn upsert_timer(&self, config: TimerConfig) -> Result<TimerConfig, StoreError> {
        let _edit = self.lock_timers()?;
        let mut timers = self.load_timers()?;
        let mut config = config;
        config.sanitize_intervals();
        match timers.iter_mut().find(|timer| timer.id == config.id) {
            Some(existing) => *existing = config.clone(),
            None => timers.push(config.clone()),
        }
        self.write_timers(&timers)?;
        Ok(config)
    }

    /// Apply `edit` to the saved timer with this id and persist the result.
    /// Returns `Ok(None)` when no timer has that id; nothing is written when `edit` fails.
    pub fn modify_timer<E, F>(&self, id: &str, edit: F) -> Result<Option<TimerConfig>, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut TimerConfig) -> Result<(), E>,
    {
        let _edit = self.lock_timers()?;
        let mut timers = self.load_timers()?;
        let Some(timer) = timers.iter_mut().find(|timer| timer.id == id) else {
            return Ok(None);
        };
        edit(timer)?;
        timer.sanitize_intervals();
        let saved = timer.clone();
        self.write_timers(&timers)?;
        Ok(Some(saved))
    }

    /// Returns whether a timer was removed
    pub fn delete_timer(&self, id: &str) -> Result<bool, StoreError> {
        let _edit = self.lock_timers()?;
        let mut timers = self.load_timers()?;
        let before = timers.len();
        timers.retain(|timer| timer.id != id);
        if timers.len() == before {
            return Ok(false);
        }
        self.write_timers(&timers)?;
        Ok(true)
    }

    // Active timer snapshot

    pub fn load_active_timer(&self) -> Result<Option<ActiveTimer>, StoreError> {
        self.read(ACTIVE_TIMER_KEY)
    }

    pub fn active_timer(&self) -> Option<ActiveTimer> {
        self.load_active_timer().unwrap_or_else(|e| {
            warn!("Discarding unreadable active timer snapshot: {}", e);
            None
        })
    }

    pub fn save_active_timer(&self, timer: &ActiveTimer) -> Result<(), StoreError> {
        self.write(ACTIVE_TIMER_KEY, timer)
    }

    pub fn clear_active_timer(&self) -> Result<(), StoreError> {
        self.backend.remove(ACTIVE_TIMER_KEY)
    }

    // Settings

    pub fn load_settings(&self) -> Result<NotificationSettings, StoreError> {
        Ok(self
            .read::<NotificationSettings>(SETTINGS_KEY)?
            .unwrap_or_default()
            .normalized())
    }

    pub fn settings(&self) -> NotificationSettings {
        self.load_settings().unwrap_or_else(|e| {
            warn!("Failed to load settings, using defaults: {}", e);
            NotificationSettings::default()
        })
    }

    pub fn save_settings(&self, settings: &NotificationSettings) -> Result<(), StoreError> {
        self.write(SETTINGS_KEY, settings)
    }
}
