//! Window title flashing

use std::{
    io::{IsTerminal, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tracing::debug;

pub const FLASH_MARKER: &str = "🔔 Timer!";
pub const FLASH_COUNT: u32 = 3;
pub const FLASH_PERIOD: Duration = Duration::from_millis(500);

/// A title that can be read and replaced
pub trait TitleSink: Send + Sync {
    fn current(&self) -> String;
    fn set(&self, title: &str);
}

/// The controlling terminal's title, set through the OSC 0 escape sequence.
/// Terminals cannot report their title, so the last value written is tracked here.
#[derive(Debug)]
pub struct TerminalTitle {
    title: Mutex<String>,
    enabled: bool,
}

impl TerminalTitle {
    pub fn new(initial: &str) -> Self {
        let sink = Self {
            title: Mutex::new(initial.to_string()),
            enabled: std::io::stderr().is_terminal(),
        };
        sink.set(initial);
        sink
    }
}

impl TitleSink for TerminalTitle {
    fn current(&self) -> String {
        self.title
            .lock()
            .map(|title| title.clone())
            .unwrap_or_default()
    }

    fn set(&self, title: &str) {
        if let Ok(mut guard) = self.title.lock() {
            *guard = title.to_string();
        }
        if self.enabled {
            let mut stderr = std::io::stderr().lock();
            let _ = write!(stderr, "\x1b]0;{}\x07", title);
            let _ = stderr.flush();
        }
    }
}

/// Alternates the title with a marker a fixed number of times, then restores it
pub struct TitleFlasher {
    sink: Arc<dyn TitleSink>,
    flashing: Arc<AtomicBool>,
}

impl TitleFlasher {
    pub fn new(sink: Arc<dyn TitleSink>) -> Self {
        Self {
            sink,
            flashing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flash the title. Returns false if a flash was already running.
    pub async fn flash(&self) -> bool {
        if self.flashing.swap(true, Ordering::SeqCst) {
            debug!("Title flash already in progress");
            return false;
        }

        let original = self.sink.current();
        for count in 0..FLASH_COUNT {
            let title = if count % 2 == 0 {
                FLASH_MARKER
            } else {
                original.as_str()
            };
            self.sink.set(title);
            tokio::time::sleep(FLASH_PERIOD).await;
        }
        self.sink.set(&original);

        self.flashing.store(false, Ordering::SeqCst);
        true
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every title written
    #[derive(Default)]
    pub struct RecordingTitle {
        pub history: Mutex<Vec<String>>,
    }

    impl RecordingTitle {
        pub fn new(initial: &str) -> Self {
            Self {
                history: Mutex::new(vec![initial.to_string()]),
            }
        }

        pub fn history(&self) -> Vec<String> {
            self.history.lock().unwrap().clone()
        }
    }

    impl TitleSink for RecordingTitle {
        fn current(&self) -> String {
            self.history.lock().unwrap().last().cloned().unwrap_or_default()
        }

        fn set(&self, title: &str) {
            self.history.lock().unwrap().push(title.to_string());
        }
    }
}
