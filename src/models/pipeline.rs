//! Loaded prediction pipeline: preprocessing + regressor.
//!
//! `Pipeline` is the validated, in-memory form of a `PipelineFile`. Once built,
//! prediction is a pure function of the input rows, so the same record always
//! yields the same value for a given artifact.

use std::collections::HashSet;

use nalgebra::DVector;
use rayon::prelude::*;

use crate::domain::{FEATURE_COLUMNS, FeatureRow, PipelineFile, RegressorSpec};
use crate::error::AppError;
use crate::math::{design_matrix, linear_predict};
use crate::models::encoder::ColumnEncoder;

/// Rows above this count are encoded in parallel.
const PARALLEL_ROWS: usize = 256;

#[derive(Debug, Clone)]
pub struct Pipeline {
    tool: Option<String>,
    target: String,
    trained_on: Option<chrono::NaiveDate>,
    /// Encoders in training column order.
    encoders: Vec<ColumnEncoder>,
    intercept: f64,
    coefficients: DVector<f64>,
}

/// Short description of a loaded pipeline (for `score inspect`).
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Exporter that produced the artifact, if recorded.
    pub tool: Option<String>,
    pub target: String,
    pub trained_on: Option<chrono::NaiveDate>,
    pub columns: Vec<(String, usize)>,
    pub encoded_width: usize,
    pub intercept: f64,
}

impl Pipeline {
    /// Validate a deserialized artifact.
    pub fn from_file(file: PipelineFile) -> Result<Self, AppError> {
        let PipelineFile {
            tool,
            target,
            trained_on,
            feature_columns,
            preprocessor,
            regressor,
        } = file;

        let mut seen = HashSet::new();
        for col in &feature_columns {
            if !seen.insert(col.as_str()) {
                return Err(AppError::new(2, format!("Pipeline lists column '{col}' twice.")));
            }
        }
        let expected: HashSet<&str> = FEATURE_COLUMNS.iter().copied().collect();
        if seen != expected {
            let missing: Vec<_> = expected.difference(&seen).copied().collect();
            let extra: Vec<_> = seen.difference(&expected).copied().collect();
            return Err(AppError::new(
                2,
                format!(
                    "Pipeline feature columns do not match the form (missing: [{}], unexpected: [{}]).",
                    missing.join(", "),
                    extra.join(", ")
                ),
            ));
        }

        let mut encoders = Vec::with_capacity(feature_columns.len());
        for col in &feature_columns {
            let mut matching = preprocessor.iter().filter(|t| t.column() == col.as_str());
            let transform = matching
                .next()
                .ok_or_else(|| AppError::new(2, format!("No transform for column '{col}'.")))?;
            if matching.next().is_some() {
                return Err(AppError::new(2, format!("More than one transform for column '{col}'.")));
            }
            encoders.push(ColumnEncoder::from_transform(transform)?);
        }
        if let Some(stray) = preprocessor.iter().find(|t| !seen.contains(t.column())) {
            return Err(AppError::new(
                2,
                format!("Transform for unknown column '{}'.", stray.column()),
            ));
        }

        let width: usize = encoders.iter().map(ColumnEncoder::width).sum();
        let (intercept, coefficients) = match regressor {
            RegressorSpec::Linear { intercept, coefficients } => (intercept, coefficients),
        };
        if coefficients.len() != width {
            return Err(AppError::new(
                2,
                format!(
                    "Regressor has {} coefficients but the preprocessor produces {width} features.",
                    coefficients.len()
                ),
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(AppError::new(2, "Regressor parameters must be finite."));
        }

        Ok(Self {
            tool,
            target,
            trained_on,
            encoders,
            intercept,
            coefficients: DVector::from_vec(coefficients),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn encoded_width(&self) -> usize {
        self.coefficients.len()
    }

    /// Encode one row, reordering its columns to training order.
    pub fn encode(&self, row: &FeatureRow) -> Result<Vec<f64>, AppError> {
        let mut out = Vec::with_capacity(self.encoded_width());
        for enc in &self.encoders {
            let value = row.get(enc.column()).ok_or_else(|| {
                AppError::new(4, format!("Input is missing column '{}'.", enc.column()))
            })?;
            enc.encode_into(value, &mut out)?;
        }
        Ok(out)
    }

    /// Predict one value per row.
    pub fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, AppError> {
        let encoded: Vec<Vec<f64>> = if rows.len() >= PARALLEL_ROWS {
            rows.par_iter().map(|r| self.encode(r)).collect::<Result<_, _>>()?
        } else {
            rows.iter().map(|r| self.encode(r)).collect::<Result<_, _>>()?
        };

        let x = design_matrix(&encoded, self.encoded_width())
            .ok_or_else(|| AppError::new(4, "Encoded rows have inconsistent widths."))?;
        let y = linear_predict(&x, &self.coefficients, self.intercept)
            .ok_or_else(|| AppError::new(4, "Non-finite model prediction."))?;

        Ok(y.iter().copied().collect())
    }

    /// Predict a single row.
    pub fn predict_one(&self, row: &FeatureRow) -> Result<f64, AppError> {
        self.predict(std::slice::from_ref(row))?
            .first()
            .copied()
            .ok_or_else(|| AppError::new(4, "Pipeline returned no prediction."))
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            tool: self.tool.clone(),
            target: self.target.clone(),
            trained_on: self.trained_on,
            columns: self
                .encoders
                .iter()
                .map(|e| (e.column().to_string(), e.width()))
                .collect(),
            encoded_width: self.encoded_width(),
            intercept: self.intercept,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{
        ColumnTransform, Gender, HandleUnknown, Lunch, Score, StudentRecord, TestPrep,
    };

    /// Small pipeline in a non-form column order, with readable coefficients.
    pub(crate) fn sample_file() -> PipelineFile {
        let one_hot = |column: &str, cats: &[&str], drop: Option<&str>| ColumnTransform::OneHot {
            column: column.to_string(),
            categories: cats.iter().map(|c| c.to_string()).collect(),
            drop: drop.map(str::to_string),
            handle_unknown: HandleUnknown::Ignore,
        };
        PipelineFile {
            tool: Some("test".to_string()),
            target: "math score".to_string(),
            trained_on: None,
            feature_columns: vec![
                "reading score".to_string(),
                "writing score".to_string(),
                "gender".to_string(),
                "race/ethnicity".to_string(),
                "parental level of education".to_string(),
                "lunch".to_string(),
                "test preparation course".to_string(),
            ],
            preprocessor: vec![
                ColumnTransform::Passthrough { column: "reading score".to_string() },
                ColumnTransform::Passthrough { column: "writing score".to_string() },
                one_hot("gender", &["female", "male"], Some("female")),
                one_hot("race/ethnicity", &["group A", "group B", "group C", "group D", "group E"], Some("group A")),
                one_hot(
                    "parental level of education",
                    &["primary school", "high school", "some college", "associate's degree", "bachelor's degree", "master's degree"],
                    Some("primary school"),
                ),
                one_hot("lunch", &["free/reduced", "standard"], Some("free/reduced")),
                one_hot("test preparation course", &["completed", "none"], Some("completed")),
            ],
            regressor: RegressorSpec::Linear {
                intercept: 1.0,
                // reading, writing, male, B..E, hs..master, standard, none
                coefficients: vec![
                    0.5, 0.25, 10.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0, -2.0,
                ],
            },
        }
    }

    #[test]
    fn predicts_expected_value() {
        let pipeline = Pipeline::from_file(sample_file()).unwrap();
        let record = StudentRecord {
            gender: Gender::Male,
            lunch: Lunch::Standard,
            test_prep: TestPrep::Completed,
            reading_score: Score::clamped(80),
            writing_score: Score::clamped(60),
            ..StudentRecord::default()
        };
        // 1 + 0.5*80 + 0.25*60 + 10 + 3
        let y = pipeline.predict_one(&record.to_row()).unwrap();
        assert!((y - 69.0).abs() < 1e-12, "got {y}");
    }

    #[test]
    fn prediction_is_deterministic() {
        let pipeline = Pipeline::from_file(sample_file()).unwrap();
        let row = StudentRecord::default().to_row();
        let a = pipeline.predict_one(&row).unwrap();
        let b = pipeline.predict_one(&row).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn encode_uses_training_column_order() {
        let pipeline = Pipeline::from_file(sample_file()).unwrap();
        let encoded = pipeline.encode(&StudentRecord::default().to_row()).unwrap();
        assert_eq!(encoded.len(), 14);
        assert_eq!(&encoded[..2], &[70.0, 70.0]);
    }

    #[test]
    fn rejects_coefficient_width_mismatch() {
        let mut file = sample_file();
        file.regressor = RegressorSpec::Linear {
            intercept: 0.0,
            coefficients: vec![1.0; 3],
        };
        let err = Pipeline::from_file(file).unwrap_err();
        assert!(err.to_string().contains("14 features"));
    }

    #[test]
    fn rejects_column_set_mismatch() {
        let mut file = sample_file();
        file.feature_columns[0] = "math score".to_string();
        let err = Pipeline::from_file(file).unwrap_err();
        assert!(err.to_string().contains("reading score"));
    }

    #[test]
    fn missing_input_column_is_an_inference_error() {
        let pipeline = Pipeline::from_file(sample_file()).unwrap();
        let mut row = StudentRecord::default().to_row();
        row.cells.retain(|(c, _)| *c != "lunch");
        let err = pipeline.predict_one(&row).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn batch_predictions_match_single() {
        let pipeline = Pipeline::from_file(sample_file()).unwrap();
        let rows: Vec<_> = (0..300)
            .map(|i| {
                StudentRecord {
                    reading_score: Score::clamped(i % 101),
                    ..StudentRecord::default()
                }
                .to_row()
            })
            .collect();
        let batch = pipeline.predict(&rows).unwrap();
        assert_eq!(batch.len(), 300);
        let single = pipeline.predict_one(&rows[42]).unwrap();
        assert!((batch[42] - single).abs() < 1e-9);
    }

    #[test]
    fn summary_reports_exporter_and_training_order() {
        let summary = Pipeline::from_file(sample_file()).unwrap().summary();
        assert_eq!(summary.tool.as_deref(), Some("test"));
        assert_eq!(summary.columns[0], ("reading score".to_string(), 1));
        assert_eq!(summary.encoded_width, 14);

        let text = crate::report::format_pipeline_summary(&summary);
        assert!(text.contains("Exported by: test"));
        assert!(text.contains("Target: math score"));
    }
}
