//! Linear model evaluation.
//!
//! Given an encoded design matrix `X` (one row per record) and the fitted
//! parameters, predictions are:
//!
//! ```text
//! ŷ = X β + b
//! ```
//!
//! The parameter dimension is small (tens of columns), so a dense
//! matrix-vector product is all that's needed.

use nalgebra::{DMatrix, DVector};

/// Evaluate `X β + intercept` for every row of `x`.
///
/// Returns `None` if the dimensions disagree or any output is non-finite.
pub fn linear_predict(x: &DMatrix<f64>, beta: &DVector<f64>, intercept: f64) -> Option<DVector<f64>> {
    if x.ncols() != beta.len() {
        return None;
    }

    let y = x * beta;
    let y = y.add_scalar(intercept);
    if y.iter().all(|v| v.is_finite()) {
        Some(y)
    } else {
        None
    }
}

/// Stack equally sized rows into a design matrix.
///
/// Returns `None` for ragged input.
pub fn design_matrix(rows: &[Vec<f64>], width: usize) -> Option<DMatrix<f64>> {
    if rows.iter().any(|r| r.len() != width) {
        return None;
    }
    let flat: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Some(DMatrix::from_row_slice(rows.len(), width, &flat))
}
