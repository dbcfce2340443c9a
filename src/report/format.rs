//! Plain-text formatting for predictions, inputs, options, and pipelines.

use crate::domain::{
    BatchRow, Categorical, FEATURE_COLUMNS, FeatureRow, Gender, Lunch, ParentalEducation,
    RaceEthnicity, Score, TestPrep,
};
use crate::io::ingest::RowError;
use crate::models::PipelineSummary;

/// Headline result line (two decimals).
pub fn format_prediction(value: f64) -> String {
    format!("The predicted Math Score is: {value:.2}")
}

/// Render the row used for a prediction as an aligned header + values table.
pub fn format_input_table(row: &FeatureRow) -> String {
    let cells: Vec<(String, String)> = row
        .cells
        .iter()
        .map(|(col, v)| (col.to_string(), v.to_string()))
        .collect();
    let widths: Vec<usize> = cells
        .iter()
        .map(|(c, v)| c.chars().count().max(v.chars().count()))
        .collect();

    let header: Vec<String> = cells
        .iter()
        .zip(&widths)
        .map(|((c, _), &w)| format!("{c:<w$}"))
        .collect();
    let values: Vec<String> = cells
        .iter()
        .zip(&widths)
        .map(|((_, v), &w)| format!("{v:<w$}"))
        .collect();

    let mut out = String::new();
    out.push_str(header.join(" | ").trim_end());
    out.push('\n');
    out.push_str(values.join(" | ").trim_end());
    out.push('\n');
    out
}

/// Full single-prediction report (used by `score predict`).
pub fn format_prediction_report(value: f64, row: &FeatureRow) -> String {
    let mut out = String::new();
    out.push_str("=== Prediction Result ===\n");
    out.push_str(&format_prediction(value));
    out.push_str("\n\nInput Data Used for Prediction:\n");
    out.push_str(&format_input_table(row));
    out
}

/// List every categorical option set and the score bounds.
pub fn format_options() -> String {
    let mut out = String::new();
    push_options::<Gender>(&mut out);
    push_options::<RaceEthnicity>(&mut out);
    push_options::<ParentalEducation>(&mut out);
    push_options::<Lunch>(&mut out);
    push_options::<TestPrep>(&mut out);
    for col in &FEATURE_COLUMNS[5..] {
        out.push_str(&format!(
            "{col}: integer {}..={} (default {})\n",
            Score::MIN,
            Score::MAX,
            Score::DEFAULT
        ));
    }
    out
}

fn push_options<T: Categorical>(out: &mut String) {
    let labels: Vec<&str> = T::ALL.iter().map(|v| v.label()).collect();
    out.push_str(&format!("{}: {}\n", T::COLUMN, labels.join(", ")));
}

/// Describe a loaded pipeline.
pub fn format_pipeline_summary(summary: &PipelineSummary) -> String {
    let mut out = String::new();
    out.push_str("=== Pipeline ===\n");
    out.push_str(&format!("Target: {}\n", summary.target));
    if let Some(tool) = &summary.tool {
        out.push_str(&format!("Exported by: {tool}\n"));
    }
    if let Some(date) = summary.trained_on {
        out.push_str(&format!("Trained on: {date}\n"));
    }
    out.push_str(&format!("Encoded features: {}\n", summary.encoded_width));
    out.push_str(&format!("Intercept: {:.6}\n", summary.intercept));
    out.push_str("\nColumns (training order):\n");
    for (col, width) in &summary.columns {
        out.push_str(&format!("- {col:<28} {width:>3} slot(s)\n"));
    }
    out
}

/// Compact table for batch predictions, followed by any skipped rows.
pub fn format_batch_table(rows: &[BatchRow], row_errors: &[RowError]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>5} {:<7} {:<8} {:<18} {:<13} {:<10} {:>4} {:>4} {:>8}",
            "line", "gender", "race", "education", "lunch", "prep", "read", "writ", "math"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:->5} {:-<7} {:-<8} {:-<18} {:-<13} {:-<10} {:->4} {:->4} {:->8}\n",
        "", "", "", "", "", "", "", "", ""
    ));

    for r in rows {
        let v: Vec<String> = r.output.row.cells.iter().map(|(_, v)| v.to_string()).collect();
        let cell = |i: usize| v.get(i).map(String::as_str).unwrap_or("");
        out.push_str(
            format!(
                "{:>5} {:<7} {:<8} {:<18} {:<13} {:<10} {:>4} {:>4} {:>8.2}",
                r.line,
                truncate(cell(0), 7),
                truncate(cell(1), 8),
                truncate(cell(2), 18),
                truncate(cell(3), 13),
                truncate(cell(4), 10),
                cell(5),
                cell(6),
                r.output.value,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if !row_errors.is_empty() {
        out.push_str(&format!("\nSkipped {} row(s):\n", row_errors.len()));
        for e in row_errors {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PredictionOutput, StudentRecord};

    #[test]
    fn prediction_uses_two_decimals() {
        assert_eq!(format_prediction(71.236), "The predicted Math Score is: 71.24");
        assert_eq!(format_prediction(50.0), "The predicted Math Score is: 50.00");
    }

    #[test]
    fn input_table_lists_columns_in_order() {
        let table = format_input_table(&StudentRecord::default().to_row());
        let mut lines = table.lines();
        let header = lines.next().unwrap();
        let values = lines.next().unwrap();
        assert!(header.starts_with("gender"));
        assert!(header.ends_with("writing score"));
        assert!(values.starts_with("Female"));
        assert!(values.contains("Group A"));
        // Columns line up: each separator sits at the same offset in both lines.
        let h: Vec<_> = header.match_indices(" | ").map(|(i, _)| i).collect();
        let v: Vec<_> = values.match_indices(" | ").map(|(i, _)| i).collect();
        assert_eq!(h, v);
    }

    #[test]
    fn options_list_every_column() {
        let text = format_options();
        for col in FEATURE_COLUMNS {
            assert!(text.contains(col), "missing {col}");
        }
        assert!(text.contains("Associate's Degree"));
    }

    #[test]
    fn batch_table_reports_skipped_rows() {
        let rows = vec![BatchRow {
            line: 2,
            output: PredictionOutput {
                row: StudentRecord::default().to_row(),
                value: 66.5,
            },
        }];
        let errors = vec![RowError {
            line: 3,
            message: "bad".to_string(),
        }];
        let text = format_batch_table(&rows, &errors);
        assert!(text.contains("66.50"));
        assert!(text.contains("line 3: bad"));
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Bachelor's Degree", 8), "Bachelo.");
        assert_eq!(truncate("Male", 8), "Male");
    }
}
