//! Saved timer definitions and their validation

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PayloadError, TimerError, ValidationError};

const MS_PER_MINUTE: f64 = 60_000.0;

/// Sound played for an alert or when a timer starts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    #[default]
    Default,
    Beep,
    Chime,
    Alarm,
    Custom,
}

/// Base64 encoded binary payload (audio clip or video) as stored in the config files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    pub fn encode(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    pub fn decode(&self) -> Result<Vec<u8>, PayloadError> {
        Ok(STANDARD.decode(self.0.trim())?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EncodedPayload {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Older data files store "no payload" as an empty string.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()).map(T::from))
}

/// Which sound to play, resolved from a [`NotificationConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct SoundRequest {
    pub sound_type: SoundType,
    pub custom_audio: Option<EncodedPayload>,
}

impl SoundRequest {
    pub fn synthesized(sound_type: SoundType) -> Self {
        Self {
            sound_type,
            custom_audio: None,
        }
    }
}

/// Per-timer notification preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    pub enabled: bool,
    pub sound: bool,
    pub visual: bool,
    #[serde(default)]
    pub sound_type: SoundType,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub custom_audio_file: Option<EncodedPayload>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub custom_audio_name: Option<String>,
    #[serde(default)]
    pub start_sound_type: SoundType,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub start_custom_audio_file: Option<EncodedPayload>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub start_custom_audio_name: Option<String>,
    /// Minutes remaining at which an alert fires
    #[serde(default)]
    pub intervals: Vec<f64>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
            visual: true,
            sound_type: SoundType::Default,
            custom_audio_file: None,
            custom_audio_name: None,
            start_sound_type: SoundType::Default,
            start_custom_audio_file: None,
            start_custom_audio_name: None,
            intervals: vec![60.0, 30.0, 15.0, 5.0],
        }
    }
}

impl NotificationConfig {
    /// Sound used for interval alerts and completion
    pub fn alert_sound(&self) -> SoundRequest {
        SoundRequest {
            sound_type: self.sound_type,
            custom_audio: self.custom_audio_file.clone(),
        }
    }

    /// Sound used when the timer transitions to running
    pub fn start_sound(&self) -> SoundRequest {
        SoundRequest {
            sound_type: self.start_sound_type,
            custom_audio: self.start_custom_audio_file.clone(),
        }
    }
}

/// A saved timer definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    pub id: String,
    pub name: String,
    /// Minutes, fractional allowed
    pub duration: f64,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub video_file: Option<EncodedPayload>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub video_file_name: Option<String>,
    pub notifications: NotificationConfig,
}

impl TimerConfig {
    /// Total countdown length in milliseconds
    pub fn total_ms(&self) -> Result<u64, TimerError> {
        minutes_to_ms(self.duration)
    }

    pub fn has_video(&self) -> bool {
        self.video_file.is_some()
    }

    /// Drop intervals that are out of range, duplicated or not finite, largest first.
    pub fn sanitize_intervals(&mut self) {
        self.notifications.intervals =
            sanitize_intervals(&self.notifications.intervals, self.duration);
    }

    /// Add a single interval, rejecting values the countdown could never reach.
    pub fn add_interval(&mut self, minutes: f64) -> Result<(), ValidationError> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(ValidationError::IntervalNotPositive(minutes));
        }
        if minutes > self.duration {
            return Err(ValidationError::IntervalTooLarge {
                interval: minutes,
                duration: self.duration,
            });
        }
        if self.notifications.intervals.contains(&minutes) {
            return Err(ValidationError::DuplicateInterval(minutes));
        }
        self.notifications.intervals.push(minutes);
        self.notifications.intervals.sort_by(|a, b| b.total_cmp(a));
        Ok(())
    }
}

/// Incoming timer definition from the presentation layer, not yet validated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerDraft {
    pub name: String,
    pub duration: f64,
    #[serde(deserialize_with = "blank_as_none")]
    pub video_file: Option<EncodedPayload>,
    #[serde(deserialize_with = "blank_as_none")]
    pub video_file_name: Option<String>,
    pub notifications: NotificationConfig,
}

impl Default for TimerDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            duration: 60.0,
            video_file: None,
            video_file_name: None,
            notifications: NotificationConfig::default(),
        }
    }
}

impl TimerDraft {
    /// Validate the draft and turn it into a storable config with the given id
    pub fn into_config(self, id: String) -> Result<TimerConfig, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if minutes_to_ms(self.duration).is_err() {
            return Err(ValidationError::InvalidDuration(self.duration));
        }

        let video_file_name = match self.video_file {
            Some(_) => self.video_file_name,
            None => None,
        };

        let mut config = TimerConfig {
            id,
            name,
            duration: self.duration,
            video_file: self.video_file,
            video_file_name,
            notifications: self.notifications,
        };
        config.sanitize_intervals();
        Ok(config)
    }
}

pub fn minutes_to_ms(minutes: f64) -> Result<u64, TimerError> {
    let ms = (minutes * MS_PER_MINUTE).round();
    if !ms.is_finite() || ms < 1.0 || ms >= u64::MAX as f64 {
        return Err(TimerError::InvalidDuration(minutes));
    }
    Ok(ms as u64)
}

pub fn sanitize_intervals(intervals: &[f64], duration: f64) -> Vec<f64> {
    let mut kept: Vec<f64> = Vec::with_capacity(intervals.len());
    for &interval in intervals {
        if interval.is_finite() && interval > 0.0 && interval <= duration && !kept.contains(&interval)
        {
            kept.push(interval);
        }
    }
    kept.sort_by(|a, b| b.total_cmp(a));
    kept
}

#[cfg(test)]
pub(crate) fn sample_config(id: &str, duration: f64, intervals: &[f64]) -> TimerConfig {
    TimerConfig {
        id: id.to_string(),
        name: format!("Timer {}", id),
        duration,
        video_file: None,
        video_file_name: None,
        notifications: NotificationConfig {
            intervals: intervals.to_vec(),
            ..NotificationConfig::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_fractional_minutes() {
        assert_eq!(minutes_to_ms(1.0).unwrap(), 60_000);
        assert_eq!(minutes_to_ms(0.5).unwrap(), 30_000);
        assert_eq!(minutes_to_ms(2.25).unwrap(), 135_000);
        assert!(minutes_to_ms(0.0).is_err());
        assert!(minutes_to_ms(-3.0).is_err());
        assert!(minutes_to_ms(f64::NAN).is_err());
    }

    #[test]
    fn sanitize_filters_and_orders() {
        let kept = sanitize_intervals(&[5.0, 0.0, 15.0, 90.0, 5.0, -1.0, f64::INFINITY, 0.5], 60.0);
        assert_eq!(kept, vec![15.0, 5.0, 0.5]);
    }

    #[test]
    fn draft_validation() {
        let draft = TimerDraft {
            name: "  Focus  ".into(),
            duration: 10.0,
            ..TimerDraft::default()
        };
        let config = draft.into_config("abc".into()).unwrap();
        assert_eq!(config.name, "Focus");
        // the default 60/30/15 intervals exceed a 10 minute timer
        assert_eq!(config.notifications.intervals, vec![5.0]);

        let err = TimerDraft::default().into_config("x".into()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);

        let err = TimerDraft {
            name: "Zero".into(),
            duration: 0.0,
            ..TimerDraft::default()
        }
        .into_config("x".into())
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidDuration(0.0));
    }

    #[test]
    fn add_interval_rules() {
        let mut config = sample_config("a", 10.0, &[5.0]);
        config.add_interval(1.5).unwrap();
        config.add_interval(10.0).unwrap();
        assert_eq!(config.notifications.intervals, vec![10.0, 5.0, 1.5]);

        assert_eq!(
            config.add_interval(0.0),
            Err(ValidationError::IntervalNotPositive(0.0))
        );
        assert_eq!(
            config.add_interval(10.5),
            Err(ValidationError::IntervalTooLarge {
                interval: 10.5,
                duration: 10.0
            })
        );
        assert_eq!(
            config.add_interval(5.0),
            Err(ValidationError::DuplicateInterval(5.0))
        );
    }

    #[test]
    fn blank_payloads_are_absent() {
        let json = r#"{
            "id": "1",
            "name": "Tea",
            "duration": 3,
            "videoFile": "",
            "videoFileName": "",
            "notifications": {
                "enabled": true,
                "sound": true,
                "visual": false,
                "soundType": "custom",
                "customAudioFile": "",
                "intervals": [1]
            }
        }"#;
        let config: TimerConfig = serde_json::from_str(json).unwrap();
        assert!(config.video_file.is_none());
        assert!(config.video_file_name.is_none());
        assert_eq!(config.notifications.sound_type, SoundType::Custom);
        assert!(config.notifications.custom_audio_file.is_none());
        assert_eq!(config.notifications.start_sound_type, SoundType::Default);

        let out = serde_json::to_value(&config).unwrap();
        assert!(out.get("videoFile").is_none());
        assert_eq!(out["notifications"]["soundType"], "custom");
    }

    #[test]
    fn payload_round_trip() {
        let payload = EncodedPayload::encode(b"RIFF");
        assert_eq!(payload.as_str(), "UklGRg==");
        assert_eq!(payload.decode().unwrap(), b"RIFF");
        assert!(EncodedPayload::from("***".to_string()).decode().is_err());
    }
}
