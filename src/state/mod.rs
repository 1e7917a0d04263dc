//! State management module
//!
//! Persisted data model (timer definitions, the active-timer snapshot, global
//! notification settings) and the shared application state handed to the API.

pub mod active_timer;
pub mod app_state;
pub mod settings;
pub mod timer_config;

// Re-export main types
pub use active_timer::{ActiveTimer, NotificationsSent};
pub use app_state::AppState;
pub use settings::{NotificationSettings, SettingsPatch};
pub use timer_config::{
    EncodedPayload, NotificationConfig, SoundRequest, SoundType, TimerConfig, TimerDraft,
};
