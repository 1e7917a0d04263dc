//! Runtime snapshot of the single active timer

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::TimerConfig;
use crate::error::TimerError;

/// Interval values already alerted during the current run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct NotificationsSent(Vec<f64>);

impl NotificationsSent {
    pub fn contains(&self, interval: f64) -> bool {
        self.0.contains(&interval)
    }

    /// Returns false when the interval was already recorded
    pub fn insert(&mut self, interval: f64) -> bool {
        if self.contains(interval) {
            return false;
        }
        self.0.push(interval);
        true
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The working state of the active timer, persisted as a snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTimer {
    /// Session id, distinct from `config.id`
    pub id: String,
    pub config: TimerConfig,
    #[serde(deserialize_with = "coerce_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(deserialize_with = "coerce_timestamp")]
    pub end_time: DateTime<Utc>,
    pub is_running: bool,
    pub is_paused: bool,
    /// Milliseconds
    #[serde(deserialize_with = "coerce_millis")]
    pub remaining_time: u64,
    #[serde(default)]
    pub notifications_sent: NotificationsSent,
}

impl ActiveTimer {
    /// A stopped timer with the full duration remaining
    pub fn fresh(config: TimerConfig, now: DateTime<Utc>) -> Result<Self, TimerError> {
        let total_ms = config.total_ms()?;
        let end_time = i64::try_from(total_ms)
            .ok()
            .and_then(|ms| now.checked_add_signed(Duration::milliseconds(ms)))
            .ok_or(TimerError::InvalidDuration(config.duration))?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            config,
            start_time: now,
            end_time,
            is_running: false,
            is_paused: false,
            remaining_time: total_ms,
            notifications_sent: NotificationsSent::default(),
        })
    }
}

/// Accepts RFC 3339 strings and epoch milliseconds.
fn coerce_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(f64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(de::Error::custom),
        Raw::Millis(ms) => Utc
            .timestamp_millis_opt(ms as i64)
            .single()
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", ms))),
    }
}

/// Accepts integral or fractional millisecond counts; negatives are rejected.
fn coerce_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() || raw < 0.0 {
        return Err(de::Error::custom(format!("invalid remaining time: {}", raw)));
    }
    Ok(raw.round() as u64)
}
