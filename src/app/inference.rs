//! Shared inference step used by both CLI and TUI front-ends.
//!
//! record -> feature row -> pipeline.predict -> scalar
//!
//! Front-ends only decide how to present the `PredictionOutput` or the error.

use crate::domain::{BatchRow, PredictionOutput, StudentRecord};
use crate::error::AppError;
use crate::models::Pipeline;

/// Predict the score for a single form submission.
pub fn predict_record(pipeline: &Pipeline, record: &StudentRecord) -> Result<PredictionOutput, AppError> {
    let row = record.to_row();
    match pipeline.predict_one(&row) {
        Ok(value) => {
            tracing::info!(value, "prediction");
            Ok(PredictionOutput { row, value })
        }
        Err(err) => {
            tracing::error!(error = %err, "prediction failed");
            Err(AppError::new(
                err.exit_code(),
                format!("An error occurred during prediction: {err}"),
            ))
        }
    }
}

/// Predict scores for many records in one pipeline call.
pub fn predict_batch(pipeline: &Pipeline, records: &[(usize, StudentRecord)]) -> Result<Vec<BatchRow>, AppError> {
    let rows: Vec<_> = records.iter().map(|(_, r)| r.to_row()).collect();
    let values = pipeline.predict(&rows).map_err(|err| {
        tracing::error!(error = %err, rows = rows.len(), "batch prediction failed");
        AppError::new(
            err.exit_code(),
            format!("An error occurred during prediction: {err}"),
        )
    })?;
    tracing::info!(rows = rows.len(), "batch prediction");

    Ok(records
        .iter()
        .zip(rows)
        .zip(values)
        .map(|((&(line, _), row), value)| BatchRow {
            line,
            output: PredictionOutput { row, value },
        })
        .collect())
}
