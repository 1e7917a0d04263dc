//! Timer App - a countdown timer service with interval alerts
//!
//! Saved timer definitions live in a local JSON store. One timer at a time is active;
//! its countdown ticks on a background task, fires one-shot alerts as configured
//! thresholds are crossed (sound, desktop notification, title flash), persists a
//! snapshot so an interrupted run can resume, and is driven over an HTTP API.

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod runtime;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use notify::NotificationDispatcher;
pub use runtime::TimerRuntime;
pub use state::AppState;
pub use store::{ConfigStore, FileStore, MemoryStore};
pub use utils::signals::shutdown_signal;
