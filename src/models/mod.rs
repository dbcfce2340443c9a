//! Pipeline evaluation: column encoders feeding a linear regressor.
//!
//! The pipeline is loaded from an artifact and treated as a black box by the
//! front-ends; they only ever call `Pipeline::predict`.

pub mod encoder;
pub mod pipeline;

pub use encoder::*;
pub use pipeline::*;
