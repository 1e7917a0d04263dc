//! System-level desktop notifications

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::DesktopError;

pub const APP_NAME: &str = "Timer App";

/// Notifications posted with this id replace each other instead of stacking.
pub const REPLACE_ID: u32 = 4242;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Not asked yet
    Default,
    Granted,
    Denied,
}

/// Abstraction over the platform notification service
#[async_trait]
pub trait DesktopBackend: Send {
    async fn request_permission(&mut self) -> Permission;
    async fn show(&mut self, title: &str, body: &str) -> Result<(), DesktopError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    NotifyRust,
    LogOnly,
}

/// notify-rust backed notifier that downgrades to logging if the service fails
#[derive(Debug)]
pub struct Notifier {
    kind: NotifierKind,
    replace_id: u32,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        debug!("Notifier created: using notify-rust backend initially");
        Self {
            kind: NotifierKind::NotifyRust,
            replace_id: REPLACE_ID,
        }
    }

    pub fn log_only() -> Self {
        Self {
            kind: NotifierKind::LogOnly,
            replace_id: REPLACE_ID,
        }
    }

    pub fn kind(&self) -> NotifierKind {
        self.kind
    }
}

#[async_trait]
impl DesktopBackend for Notifier {
    async fn request_permission(&mut self) -> Permission {
        // freedesktop, macOS and Windows toasts have no runtime prompt we can drive
        Permission::Granted
    }

    async fn show(&mut self, title: &str, body: &str) -> Result<(), DesktopError> {
        match self.kind {
            NotifierKind::NotifyRust => {
                let summary = title.to_string();
                let text = body.to_string();
                let replace_id = self.replace_id;
                let res = tokio::task::spawn_blocking(move || {
                    let mut n = notify_rust::Notification::new();
                    n.appname(APP_NAME).summary(&summary).body(&text);
                    #[cfg(all(unix, not(target_os = "macos")))]
                    n.id(replace_id);
                    #[cfg(not(all(unix, not(target_os = "macos"))))]
                    let _ = replace_id;
                    n.show().map(|_| ()).map_err(|e| e.to_string())
                })
                .await
                .map_err(|e| e.to_string())
                .and_then(|inner| inner);

                match res {
                    Ok(()) => {
                        debug!("Desktop notification shown");
                        Ok(())
                    }
                    Err(e) => {
                        warn!(error = %e, "notify-rust failed; downgrading to LogOnly notifier");
                        self.kind = NotifierKind::LogOnly;
                        info!("[ALERT] {}", body);
                        Err(DesktopError::Backend(e))
                    }
                }
            }
            NotifierKind::LogOnly => {
                info!("[ALERT] {}", body);
                Ok(())
            }
        }
    }
}
