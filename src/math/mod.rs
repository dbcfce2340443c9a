//! Mathematical utilities: dense linear model evaluation.

pub mod linear;

pub use linear::*;
