//! Structured logging setup.
//!
//! The TUI owns the terminal, so events go to a log file instead of stderr.
//! Logging is best-effort: if the file cannot be opened or a subscriber is
//! already installed, the app keeps running without logs.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Install the global `tracing` subscriber. Returns `false` if logging is disabled.
pub fn init(config: &AppConfig) -> bool {
    let file = match OpenOptions::new().create(true).append(true).open(&config.log_file) {
        Ok(f) => f,
        Err(_) => return false,
    };

    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok()
}
