//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use directories::ProjectDirs;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "timer-app")]
#[command(about = "Countdown timer service with interval alerts, sounds and desktop notifications")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding timers.json, active_timer.json and settings.json
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing is read from or written to disk
    #[arg(long, conflicts_with = "data_dir")]
    pub ephemeral: bool,

    /// Tick period in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Activate the saved timer with this id on startup
    #[arg(long, value_name = "TIMER_ID")]
    pub activate: Option<String>,

    /// Start the active timer right away
    #[arg(long)]
    pub start: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// `--data-dir`, else the platform data directory, else `./timer-data`
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        ProjectDirs::from("", "", "timer-app")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("timer-data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::parse_from(["timer-app"]);
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.log_level(), "info");
        assert!(config.activate.is_none());
        assert!(!config.start);
        assert!(!config.ephemeral);
    }

    #[test]
    fn explicit_flags() {
        let config = Config::parse_from([
            "timer-app",
            "--port",
            "9000",
            "--data-dir",
            "/tmp/timers",
            "--tick-ms",
            "250",
            "--activate",
            "abc",
            "--start",
            "-v",
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/timers"));
        assert_eq!(config.tick_period(), Duration::from_millis(250));
        assert_eq!(config.activate.as_deref(), Some("abc"));
        assert!(config.start);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn ephemeral_excludes_data_dir() {
        assert!(Config::try_parse_from(["timer-app", "--ephemeral"]).is_ok());
        assert!(
            Config::try_parse_from(["timer-app", "--ephemeral", "--data-dir", "/tmp/x"]).is_err()
        );
    }

    #[test]
    fn zero_tick_is_rejected() {
        assert!(Config::try_parse_from(["timer-app", "--tick-ms", "0"]).is_err());
    }
}
