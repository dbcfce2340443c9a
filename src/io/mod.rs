//! Input/output helpers.
//!
//! - pipeline artifact loading (`model`)
//! - CSV ingest of student records (`ingest`)
//! - batch prediction exports (`export`)

pub mod export;
pub mod ingest;
pub mod model;

pub use export::*;
pub use ingest::*;
pub use model::*;
