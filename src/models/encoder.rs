//! Column-wise feature encoding.
//!
//! Each pipeline column owns exactly one encoder. Encoders write their output
//! block into a shared row buffer, so the full encoded row is simply the
//! concatenation of the blocks in training column order.

use crate::domain::{ColumnTransform, FeatureValue, HandleUnknown};
use crate::error::AppError;

/// A validated, ready-to-apply column encoder.
#[derive(Debug, Clone)]
pub enum ColumnEncoder {
    OneHot {
        column: String,
        /// Categories that get an output slot (the dropped one excluded).
        slots: Vec<String>,
        /// Known categories that encode to all zeros (the dropped reference level).
        dropped: Option<String>,
        handle_unknown: HandleUnknown,
    },
    Numeric {
        column: String,
        mean: f64,
        scale: f64,
    },
}

impl ColumnEncoder {
    /// Validate a serialized transform and turn it into an encoder.
    pub fn from_transform(t: &ColumnTransform) -> Result<Self, AppError> {
        match t {
            ColumnTransform::OneHot {
                column,
                categories,
                drop,
                handle_unknown,
            } => {
                if categories.is_empty() {
                    return Err(AppError::new(
                        2,
                        format!("Encoder for '{column}' has no categories."),
                    ));
                }
                for (i, c) in categories.iter().enumerate() {
                    if categories[..i].iter().any(|prev| prev.eq_ignore_ascii_case(c)) {
                        return Err(AppError::new(
                            2,
                            format!("Encoder for '{column}' lists category '{c}' twice."),
                        ));
                    }
                }
                if let Some(d) = drop {
                    if !categories.iter().any(|c| c.eq_ignore_ascii_case(d)) {
                        return Err(AppError::new(
                            2,
                            format!("Encoder for '{column}' drops unknown category '{d}'."),
                        ));
                    }
                }

                let slots = categories
                    .iter()
                    .filter(|c| drop.as_ref().is_none_or(|d| !c.eq_ignore_ascii_case(d)))
                    .cloned()
                    .collect();

                Ok(ColumnEncoder::OneHot {
                    column: column.clone(),
                    slots,
                    dropped: drop.clone(),
                    handle_unknown: *handle_unknown,
                })
            }
            ColumnTransform::Passthrough { column } => Ok(ColumnEncoder::Numeric {
                column: column.clone(),
                mean: 0.0,
                scale: 1.0,
            }),
            ColumnTransform::Standard { column, mean, scale } => {
                if !(mean.is_finite() && scale.is_finite()) || *scale == 0.0 {
                    return Err(AppError::new(
                        2,
                        format!("Scaler for '{column}' needs a finite mean and a non-zero scale."),
                    ));
                }
                Ok(ColumnEncoder::Numeric {
                    column: column.clone(),
                    mean: *mean,
                    scale: *scale,
                })
            }
        }
    }

    pub fn column(&self) -> &str {
        match self {
            ColumnEncoder::OneHot { column, .. } | ColumnEncoder::Numeric { column, .. } => column,
        }
    }

    /// Number of output slots this encoder produces.
    pub fn width(&self) -> usize {
        match self {
            ColumnEncoder::OneHot { slots, .. } => slots.len(),
            ColumnEncoder::Numeric { .. } => 1,
        }
    }

    /// Append this column's encoded block to `out`.
    pub fn encode_into(&self, value: &FeatureValue, out: &mut Vec<f64>) -> Result<(), AppError> {
        match (self, value) {
            (
                ColumnEncoder::OneHot {
                    column,
                    slots,
                    dropped,
                    handle_unknown,
                },
                FeatureValue::Category(raw),
            ) => {
                let start = out.len();
                out.resize(start + slots.len(), 0.0);

                if let Some(pos) = slots.iter().position(|c| c.eq_ignore_ascii_case(raw)) {
                    out[start + pos] = 1.0;
                    return Ok(());
                }
                if dropped.as_ref().is_some_and(|d| d.eq_ignore_ascii_case(raw)) {
                    return Ok(());
                }
                match handle_unknown {
                    HandleUnknown::Ignore => {
                        tracing::debug!(column = %column, value = %raw, "unknown category encoded as zeros");
                        Ok(())
                    }
                    HandleUnknown::Error => Err(AppError::new(
                        4,
                        format!("Found unknown category '{raw}' in column '{column}' during transform."),
                    )),
                }
            }
            (ColumnEncoder::Numeric { column, mean, scale }, FeatureValue::Number(x)) => {
                if !x.is_finite() {
                    return Err(AppError::new(4, format!("Non-finite value in column '{column}'.")));
                }
                out.push((x - mean) / scale);
                Ok(())
            }
            (enc, other) => Err(AppError::new(
                4,
                format!(
                    "Column '{}' expects {} input, got '{other}'.",
                    enc.column(),
                    match enc {
                        ColumnEncoder::OneHot { .. } => "categorical",
                        ColumnEncoder::Numeric { .. } => "numeric",
                    }
                ),
            )),
        }
    }
}
