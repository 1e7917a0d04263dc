//! Main application state shared by the HTTP handlers

use std::{sync::Arc, time::Instant};

use tracing::info;
use uuid::Uuid;

use crate::{
    error::EditError,
    notify::NotificationDispatcher,
    runtime::TimerRuntime,
    store::ConfigStore,
};

use super::{TimerConfig, TimerDraft};

pub struct AppState {
    pub store: ConfigStore,
    pub runtime: TimerRuntime,
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
}

impl AppState {
    pub fn new(
        store: ConfigStore,
        runtime: TimerRuntime,
        dispatcher: Arc<NotificationDispatcher>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            store,
            runtime,
            dispatcher,
            start_time: Instant::now(),
            port,
            host,
        }
    }

    /// Validate and save a new timer under a fresh id
    pub fn create_timer(&self, draft: TimerDraft) -> Result<TimerConfig, EditError> {
        let config = draft.into_config(Uuid::new_v4().to_string())?;
        let saved = self.store.upsert_timer(config)?;
        info!("Created timer '{}' ({})", saved.name, saved.id);
        Ok(saved)
    }

    /// Replace an existing timer's definition, keeping its id.
    /// Returns `Ok(None)` when no timer has that id.
    pub fn update_timer(
        &self,
        id: &str,
        draft: TimerDraft,
    ) -> Result<Option<TimerConfig>, EditError> {
        if self.store.find_timer(id).is_none() {
            return Ok(None);
        }
        let config = draft.into_config(id.to_string())?;
        let saved = self.store.modify_timer(id, |timer| {
            *timer = config;
            Ok::<(), EditError>(())
        })?;
        if let Some(saved) = &saved {
            info!("Updated timer '{}' ({})", saved.name, saved.id);
        }
        Ok(saved)
    }

    /// Append an interval to a saved timer. Returns `Ok(None)` when no timer has that id.
    pub fn add_interval(
        &self,
        id: &str,
        minutes: f64,
    ) -> Result<Option<TimerConfig>, EditError> {
        let saved = self.store.modify_timer(id, |timer| {
            timer.add_interval(minutes).map_err(EditError::from)
        })?;
        if let Some(saved) = &saved {
            info!(
                "Timer '{}' now alerts at {:?} minutes",
                saved.name, saved.notifications.intervals
            );
        }
        Ok(saved)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
