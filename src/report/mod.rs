//! Reporting utilities: formatted terminal output for predictions.
//!
//! Formatting lives in one place so the CLI and TUI show the same text and
//! output changes stay localized.

pub mod format;

pub use format::*;
