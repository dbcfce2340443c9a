//! `student-score` library crate.
//!
//! The binary (`score`) is a thin wrapper around this library so that:
//!
//! - inference and formatting are testable without spawning processes
//! - the TUI and the scripted commands share one prediction path

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod report;
pub mod tui;
