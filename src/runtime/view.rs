//! What the presentation layer receives from the runtime

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::progress::Rgb;
use crate::state::EncodedPayload;

/// Per-tick display state of the active timer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub timer_id: String,
    pub session_id: String,
    pub name: String,
    /// Milliseconds
    pub remaining_time: u64,
    pub elapsed: u64,
    pub total_duration: u64,
    pub is_running: bool,
    pub is_paused: bool,
    pub progress: f64,
    pub color: Rgb,
    pub css_color: String,
    /// rem
    pub font_scale: f64,
    pub clock: String,
    pub next_alert_in: Option<u64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub has_video: bool,
}

/// Completion video to show, with its original filename
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionVideo {
    pub payload: EncodedPayload,
    pub file_name: Option<String>,
}

/// One-off signals for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PresentationSignal {
    ShowVideo(CompletionVideo),
    RequestFullscreen,
}
