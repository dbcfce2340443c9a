//! Read pipeline artifacts.
//!
//! The artifact is JSON (schema: `domain::PipelineFile`). Loading validates it
//! into a `models::Pipeline`, so a successfully loaded pipeline is always usable.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use crate::domain::PipelineFile;
use crate::error::{AppError, EXIT_MODEL_NOT_FOUND};
use crate::models::Pipeline;

/// Read and validate a pipeline JSON file.
///
/// A missing file is reported with `EXIT_MODEL_NOT_FOUND` so callers can treat
/// it as the fatal startup case.
pub fn read_pipeline_json(path: &Path) -> Result<Pipeline, AppError> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            AppError::new(
                EXIT_MODEL_NOT_FOUND,
                format!(
                    "Error: model file '{}' not found. Pass --model <path> or set SCORE_MODEL_PATH.",
                    path.display()
                ),
            )
        } else {
            AppError::new(2, format!("Failed to open model '{}': {e}", path.display()))
        }
    })?;

    let parsed: PipelineFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid model JSON '{}': {e}", path.display())))?;

    let pipeline = Pipeline::from_file(parsed)
        .map_err(|e| AppError::new(e.exit_code(), format!("Invalid model '{}': {e}", path.display())))?;

    tracing::info!(
        path = %path.display(),
        target = pipeline.target(),
        width = pipeline.encoded_width(),
        "loaded pipeline"
    );
    Ok(pipeline)
}
