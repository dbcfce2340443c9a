//! Serialized pipeline schema (JSON).
//!
//! A pipeline file is the portable form of a trained model:
//! - metadata (tool, target, optional training date)
//! - the feature columns in training order
//! - one preprocessing transform per column
//! - the regressor parameters
//!
//! The file is produced elsewhere; this crate only reads and evaluates it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Top-level pipeline artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineFile {
    #[serde(default)]
    pub tool: Option<String>,
    /// Name of the predicted quantity (e.g. `math score`).
    pub target: String,
    #[serde(default)]
    pub trained_on: Option<NaiveDate>,
    /// Feature columns in the order the regressor expects them.
    pub feature_columns: Vec<String>,
    pub preprocessor: Vec<ColumnTransform>,
    pub regressor: RegressorSpec,
}

/// Per-column preprocessing step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnTransform {
    /// One-hot encode a categorical column.
    OneHot {
        column: String,
        categories: Vec<String>,
        /// Category dropped from the encoding (reference level), if any.
        #[serde(default)]
        drop: Option<String>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
    /// Pass a numeric column through unchanged.
    Passthrough { column: String },
    /// Standardize a numeric column: `(x - mean) / scale`.
    Standard { column: String, mean: f64, scale: f64 },
}

impl ColumnTransform {
    pub fn column(&self) -> &str {
        match self {
            ColumnTransform::OneHot { column, .. }
            | ColumnTransform::Passthrough { column }
            | ColumnTransform::Standard { column, .. } => column,
        }
    }
}

/// What to do with a category the encoder never saw during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Encode as an all-zero block.
    #[default]
    Ignore,
    /// Fail the prediction.
    Error,
}

/// Regressor parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorSpec {
    /// `y = intercept + Σ coefficients[i] * x[i]` over the encoded features.
    Linear { intercept: f64, coefficients: Vec<f64> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_transforms() {
        let json = r#"{
            "target": "math score",
            "feature_columns": ["lunch", "reading score"],
            "preprocessor": [
                {"kind": "one_hot", "column": "lunch", "categories": ["free/reduced", "standard"], "drop": "free/reduced"},
                {"kind": "standard", "column": "reading score", "mean": 69.0, "scale": 14.6}
            ],
            "regressor": {"kind": "linear", "intercept": 66.0, "coefficients": [3.5, 13.0]}
        }"#;
        let file: PipelineFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.preprocessor.len(), 2);
        assert_eq!(file.preprocessor[1].column(), "reading score");
        assert!(file.trained_on.is_none());
        match &file.preprocessor[0] {
            ColumnTransform::OneHot { handle_unknown, drop, .. } => {
                assert_eq!(*handle_unknown, HandleUnknown::Ignore);
                assert_eq!(drop.as_deref(), Some("free/reduced"));
            }
            other => panic!("unexpected transform {other:?}"),
        }
    }
}
