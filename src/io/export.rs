//! Export batch predictions to CSV.
//!
//! Columns are the seven inputs (form labels) followed by the prediction, so
//! the file can be reloaded with `score batch` after dropping the last column.

use std::path::Path;

use crate::domain::{BatchRow, FEATURE_COLUMNS, TARGET_LABEL};
use crate::error::AppError;

/// Write predicted rows to a CSV file.
pub fn write_predictions_csv(path: &Path, rows: &[BatchRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let mut header: Vec<&str> = vec!["line"];
    header.extend(FEATURE_COLUMNS);
    header.push(TARGET_LABEL);
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in rows {
        let mut fields = vec![r.line.to_string()];
        fields.extend(r.output.row.cells.iter().map(|(_, v)| v.to_string()));
        fields.push(format!("{:.4}", r.output.value));
        writer
            .write_record(&fields)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
