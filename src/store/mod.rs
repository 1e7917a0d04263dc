//! Configuration store
//!
//! Durable key-value persistence for saved timers, the active timer snapshot and
//! notification settings. Values are JSON documents.

pub mod config_store;
pub mod file;
pub mod memory;

pub use config_store::ConfigStore;
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

pub const TIMERS_KEY: &str = "timers";
pub const ACTIVE_TIMER_KEY: &str = "active_timer";
pub const SETTINGS_KEY: &str = "settings";

/// Raw string storage addressed by key
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
