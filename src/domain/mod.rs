//! Domain types used throughout the app.
//!
//! This module defines:
//!
//! - the categorical option sets (`Gender`, `RaceEthnicity`, ...)
//! - bounded numeric inputs (`Score`)
//! - the per-submission record and its feature row (`StudentRecord`, `FeatureRow`)
//! - the pipeline artifact schema (`PipelineFile`)

pub mod artifact;
pub mod types;

pub use artifact::*;
pub use types::*;
