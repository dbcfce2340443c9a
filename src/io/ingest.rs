//! CSV ingest for batch predictions.
//!
//! Each row describes one student. Headers are matched to the form's feature
//! columns after trimming, lowercasing, and stripping a UTF-8 BOM, so files
//! exported from spreadsheets load without edits.
//!
//! A required column that appears twice (e.g. `gender` and `Gender`) rejects
//! the file. Duplicate extra columns are ignored after their first occurrence.
//!
//! Row-level problems (bad category, non-numeric score) are collected as
//! `RowError`s rather than aborting the whole file. Scores outside `[0, 100]`
//! are clamped, not rejected.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{COL_READING, COL_WRITING, Categorical, FEATURE_COLUMNS, Score, StudentRecord};
use crate::error::AppError;

/// A problem with a single CSV row.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based line number in the file (header is line 1).
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed records (with their line numbers) + row errors.
#[derive(Debug, Clone)]
pub struct IngestedRecords {
    pub records: Vec<(usize, StudentRecord)>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Number of score cells that had to be clamped or rounded.
    pub clamped_cells: usize,
}

/// Load student records from a CSV file.
pub fn read_records_csv(path: &Path) -> Result<IngestedRecords, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_records(file)
}

/// Load student records from any reader (used by tests and `read_records_csv`).
pub fn read_records<R: std::io::Read>(input: R) -> Result<IngestedRecords, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers)?;
    let missing: Vec<&str> = FEATURE_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::new(
            2,
            format!("CSV is missing required column(s): {}", missing.join(", ")),
        ));
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut clamped_cells = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let row = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&row, &header_map) {
            Ok((record, clamped)) => {
                if clamped > 0 {
                    tracing::warn!(line, clamped, "score clamped into [0, 100]");
                    clamped_cells += clamped;
                }
                records.push((line, record));
            }
            Err(e) => row_errors.push(RowError { line, message: e }),
        }
    }

    if records.is_empty() {
        return Err(AppError::new(2, "No valid rows in CSV."));
    }

    Ok(IngestedRecords {
        records,
        row_errors,
        rows_read,
        clamped_cells,
    })
}

fn build_header_map(headers: &StringRecord) -> Result<HashMap<String, usize>, AppError> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        let key = normalize_header_name(name);
        if let Some(&first) = map.get(&key) {
            if FEATURE_COLUMNS.contains(&key.as_str()) {
                return Err(AppError::new(
                    2,
                    format!(
                        "CSV has column '{key}' more than once (columns {} and {}).",
                        first + 1,
                        idx + 1
                    ),
                ));
            }
            continue;
        }
        map.insert(key, idx);
    }
    Ok(map)
}

fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn cell<'a>(row: &'a StringRecord, header_map: &HashMap<String, usize>, column: &str) -> Result<&'a str, String> {
    header_map
        .get(column)
        .and_then(|&i| row.get(i))
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("missing value for '{column}'"))
}

fn category<T: Categorical>(row: &StringRecord, header_map: &HashMap<String, usize>) -> Result<T, String> {
    let raw = cell(row, header_map, T::COLUMN)?;
    T::parse_label(raw).map_err(|e| e.to_string())
}

/// Returns the score and whether it had to be clamped.
fn score(row: &StringRecord, header_map: &HashMap<String, usize>, column: &str) -> Result<(Score, bool), String> {
    let raw = cell(row, header_map, column)?;
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("invalid number '{raw}' for '{column}'"))?;
    if !v.is_finite() {
        return Err(format!("non-finite value '{raw}' for '{column}'"));
    }
    let s = Score::from_f64(v);
    Ok((s, f64::from(s) != v))
}

fn parse_row(row: &StringRecord, header_map: &HashMap<String, usize>) -> Result<(StudentRecord, usize), String> {
    let (reading_score, reading_clamped) = score(row, header_map, COL_READING)?;
    let (writing_score, writing_clamped) = score(row, header_map, COL_WRITING)?;

    let record = StudentRecord {
        gender: category(row, header_map)?,
        race_ethnicity: category(row, header_map)?,
        parental_education: category(row, header_map)?,
        lunch: category(row, header_map)?,
        test_prep: category(row, header_map)?,
        reading_score,
        writing_score,
    };
    Ok((record, reading_clamped as usize + writing_clamped as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Gender, Lunch, RaceEthnicity};

    const HEADER: &str = "Gender,race/ethnicity,parental level of education,lunch,test preparation course,reading score,writing score\n";

    #[test]
    fn reads_valid_rows() {
        let csv = format!(
            "{HEADER}male,group C,some college,standard,none,72,74\nFemale,Group E,Master's Degree,Free/Reduced,Completed,90,95\n"
        );
        let out = read_records(csv.as_bytes()).unwrap();
        assert_eq!(out.rows_read, 2);
        assert!(out.row_errors.is_empty());
        let (line, first) = out.records[0];
        assert_eq!(line, 2);
        assert_eq!(first.gender, Gender::Male);
        assert_eq!(first.race_ethnicity, RaceEthnicity::GroupC);
        assert_eq!(first.lunch, Lunch::Standard);
        assert_eq!(first.reading_score.value(), 72);
    }

    #[test]
    fn clamps_out_of_range_scores() {
        let csv = format!("{HEADER}Male,Group A,High School,Standard,None,120,-3\n");
        let out = read_records(csv.as_bytes()).unwrap();
        let (_, rec) = out.records[0];
        assert_eq!(rec.reading_score.value(), 100);
        assert_eq!(rec.writing_score.value(), 0);
        assert_eq!(out.clamped_cells, 2);
    }

    #[test]
    fn collects_row_errors_for_unknown_categories() {
        let csv = format!(
            "{HEADER}Male,Group Z,High School,Standard,None,50,50\nMale,Group A,High School,Standard,None,abc,50\nMale,Group A,High School,Standard,None,50,50\n"
        );
        let out = read_records(csv.as_bytes()).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.row_errors.len(), 2);
        assert_eq!(out.row_errors[0].line, 2);
        assert!(out.row_errors[0].message.contains("Group Z"));
        assert!(out.row_errors[1].message.contains("abc"));
    }

    #[test]
    fn missing_column_is_rejected() {
        let csv = "gender,lunch\nMale,Standard\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("reading score"));
    }

    #[test]
    fn duplicate_required_column_is_rejected() {
        let csv = format!("{},Gender\nMale,Group A,High School,Standard,None,50,50,\n", HEADER.trim_end());
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("'gender' more than once"));
    }

    #[test]
    fn duplicate_extra_column_keeps_first() {
        let csv = format!(
            "{},note,NOTE\nMale,Group A,High School,Standard,None,50,50,first,second\n",
            HEADER.trim_end()
        );
        let out = read_records(csv.as_bytes()).unwrap();
        assert_eq!(out.records.len(), 1);
        assert!(out.row_errors.is_empty());
    }

    #[test]
    fn bom_prefixed_header_is_recognized() {
        let csv = format!("\u{feff}{HEADER}Female,Group B,Bachelor's Degree,Standard,Completed,80,82\n");
        let out = read_records(csv.as_bytes()).unwrap();
        let (_, rec) = out.records[0];
        assert_eq!(rec.gender, Gender::Female);
        assert_eq!(rec.writing_score.value(), 82);
    }

    #[test]
    fn normalize_header_strips_bom_case_and_space() {
        assert_eq!(normalize_header_name("\u{feff}Gender "), "gender");
        assert_eq!(normalize_header_name("  Reading Score"), "reading score");
    }

    #[test]
    fn fractional_scores_are_rounded_and_counted() {
        let csv = format!("{HEADER}Male,Group A,High School,Standard,None,50.4,61\n");
        let out = read_records(csv.as_bytes()).unwrap();
        let (_, rec) = out.records[0];
        assert_eq!(rec.reading_score.value(), 50);
        assert_eq!(rec.writing_score.value(), 61);
        assert_eq!(out.clamped_cells, 1);
    }
}
