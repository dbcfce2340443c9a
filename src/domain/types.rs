//! Shared domain types.
//!
//! The form inputs are modeled so that invalid states cannot be built:
//!
//! - categorical features are closed enums (no free-form strings)
//! - numeric features are `Score`s, clamped to `[0, 100]` on construction
//! - a submission is a `StudentRecord`, turned into a `FeatureRow` per request

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Column names in the order the record is assembled.
pub const FEATURE_COLUMNS: [&str; 7] = [
    COL_GENDER,
    COL_RACE_ETHNICITY,
    COL_PARENTAL_EDUCATION,
    COL_LUNCH,
    COL_TEST_PREP,
    COL_READING,
    COL_WRITING,
];

pub const COL_GENDER: &str = "gender";
pub const COL_RACE_ETHNICITY: &str = "race/ethnicity";
pub const COL_PARENTAL_EDUCATION: &str = "parental level of education";
pub const COL_LUNCH: &str = "lunch";
pub const COL_TEST_PREP: &str = "test preparation course";
pub const COL_READING: &str = "reading score";
pub const COL_WRITING: &str = "writing score";

/// Name of the predicted quantity, used in output headers.
pub const TARGET_LABEL: &str = "predicted math score";

/// A categorical feature with a fixed, ordered option set.
pub trait Categorical: Copy + PartialEq + Sized + 'static {
    /// Column name in the feature row.
    const COLUMN: &'static str;
    /// All options, in display order.
    const ALL: &'static [Self];

    /// User-facing label (also the value sent to the pipeline).
    fn label(self) -> &'static str;

    fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    /// Next option, wrapping around.
    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous option, wrapping around.
    fn prev(self) -> Self {
        let n = Self::ALL.len();
        Self::ALL[(self.index() + n - 1) % n]
    }

    /// Parse a label case-insensitively. Anything outside the option set is rejected.
    fn parse_label(raw: &str) -> Result<Self, AppError> {
        let needle = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                let options = Self::ALL.iter().map(|v| v.label()).collect::<Vec<_>>().join(", ");
                AppError::new(
                    2,
                    format!("Invalid {} '{needle}'. Expected one of: {options}", Self::COLUMN),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gender {
    #[default]
    Female,
    Male,
}

impl Categorical for Gender {
    const COLUMN: &'static str = COL_GENDER;
    const ALL: &'static [Self] = &[Gender::Female, Gender::Male];

    fn label(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RaceEthnicity {
    #[default]
    GroupA,
    GroupB,
    GroupC,
    GroupD,
    GroupE,
}

impl Categorical for RaceEthnicity {
    const COLUMN: &'static str = COL_RACE_ETHNICITY;
    const ALL: &'static [Self] = &[
        RaceEthnicity::GroupA,
        RaceEthnicity::GroupB,
        RaceEthnicity::GroupC,
        RaceEthnicity::GroupD,
        RaceEthnicity::GroupE,
    ];

    fn label(self) -> &'static str {
        match self {
            RaceEthnicity::GroupA => "Group A",
            RaceEthnicity::GroupB => "Group B",
            RaceEthnicity::GroupC => "Group C",
            RaceEthnicity::GroupD => "Group D",
            RaceEthnicity::GroupE => "Group E",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParentalEducation {
    #[default]
    PrimarySchool,
    HighSchool,
    SomeCollege,
    Associate,
    Bachelor,
    Master,
}

impl Categorical for ParentalEducation {
    const COLUMN: &'static str = COL_PARENTAL_EDUCATION;
    const ALL: &'static [Self] = &[
        ParentalEducation::PrimarySchool,
        ParentalEducation::HighSchool,
        ParentalEducation::SomeCollege,
        ParentalEducation::Associate,
        ParentalEducation::Bachelor,
        ParentalEducation::Master,
    ];

    fn label(self) -> &'static str {
        match self {
            ParentalEducation::PrimarySchool => "Primary School",
            ParentalEducation::HighSchool => "High School",
            ParentalEducation::SomeCollege => "Some College",
            ParentalEducation::Associate => "Associate's Degree",
            ParentalEducation::Bachelor => "Bachelor's Degree",
            ParentalEducation::Master => "Master's Degree",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lunch {
    #[default]
    Standard,
    FreeReduced,
}

impl Categorical for Lunch {
    const COLUMN: &'static str = COL_LUNCH;
    const ALL: &'static [Self] = &[Lunch::Standard, Lunch::FreeReduced];

    fn label(self) -> &'static str {
        match self {
            Lunch::Standard => "Standard",
            Lunch::FreeReduced => "Free/Reduced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TestPrep {
    #[default]
    None,
    Completed,
}

impl Categorical for TestPrep {
    const COLUMN: &'static str = COL_TEST_PREP;
    const ALL: &'static [Self] = &[TestPrep::None, TestPrep::Completed];

    fn label(self) -> &'static str {
        match self {
            TestPrep::None => "None",
            TestPrep::Completed => "Completed",
        }
    }
}

// `FromStr` lets clap parse the enums directly from their labels.
macro_rules! impl_from_str {
    ($($ty:ty),*) => {
        $(
            impl FromStr for $ty {
                type Err = AppError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    <$ty as Categorical>::parse_label(s)
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

impl_from_str!(Gender, RaceEthnicity, ParentalEducation, Lunch, TestPrep);

/// A test score bounded to `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;
    pub const DEFAULT: Score = Score(70);

    /// Build a score, clamping into `[0, 100]`.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    /// Build a score from a float, rounding then clamping. NaN maps to 0.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self(Self::MIN);
        }
        Self::clamped(value.round().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Move by `delta`, clamping at the bounds.
    pub fn step(self, delta: i64) -> Self {
        Self::clamped(self.0 as i64 + delta)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<Score> for f64 {
    fn from(value: Score) -> Self {
        value.0 as f64
    }
}

impl FromStr for Score {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v: f64 = s
            .trim()
            .parse()
            .map_err(|_| AppError::new(2, format!("Invalid score '{}': expected a number", s.trim())))?;
        if !v.is_finite() {
            return Err(AppError::new(2, format!("Invalid score '{}': must be finite", s.trim())));
        }
        Ok(Self::from_f64(v))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StudentRecord {
    pub gender: Gender,
    pub race_ethnicity: RaceEthnicity,
    pub parental_education: ParentalEducation,
    pub lunch: Lunch,
    pub test_prep: TestPrep,
    pub reading_score: Score,
    pub writing_score: Score,
}

impl StudentRecord {
    /// Assemble the single-row feature record in `FEATURE_COLUMNS` order.
    pub fn to_row(&self) -> FeatureRow {
        FeatureRow {
            cells: vec![
                (COL_GENDER, FeatureValue::category(self.gender.label())),
                (COL_RACE_ETHNICITY, FeatureValue::category(self.race_ethnicity.label())),
                (COL_PARENTAL_EDUCATION, FeatureValue::category(self.parental_education.label())),
                (COL_LUNCH, FeatureValue::category(self.lunch.label())),
                (COL_TEST_PREP, FeatureValue::category(self.test_prep.label())),
                (COL_READING, FeatureValue::Number(self.reading_score.into())),
                (COL_WRITING, FeatureValue::Number(self.writing_score.into())),
            ],
        }
    }
}

/// A single feature cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Category(String),
    Number(f64),
}

impl FeatureValue {
    pub fn category(label: &str) -> Self {
        FeatureValue::Category(label.to_string())
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Category(s) => f.write_str(s),
            FeatureValue::Number(v) => write!(f, "{v}"),
        }
    }
}

/// A named, ordered row of feature values (one-row "frame").
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub cells: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRow {
    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.cells.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cells.iter().map(|(c, _)| *c)
    }
}

/// A prediction together with the row it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutput {
    pub row: FeatureRow,
    pub value: f64,
}

/// One batch prediction, tagged with its source CSV line.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub line: usize,
    pub output: PredictionOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_clamps_to_bounds() {
        assert_eq!(Score::clamped(-5).value(), 0);
        assert_eq!(Score::clamped(250).value(), 100);
        assert_eq!(Score::from_f64(100.4).value(), 100);
        assert_eq!(Score::from_f64(f64::NAN).value(), 0);
        assert_eq!(Score::from_f64(f64::INFINITY).value(), 100);
        assert_eq!(Score::DEFAULT.step(50).value(), 100);
        assert_eq!(Score::DEFAULT.step(-500).value(), 0);
    }

    #[test]
    fn score_parses_and_clamps() {
        assert_eq!("73".parse::<Score>().unwrap().value(), 73);
        assert_eq!(" 120 ".parse::<Score>().unwrap().value(), 100);
        assert!("abc".parse::<Score>().is_err());
        assert!("NaN".parse::<Score>().is_err());
        assert!("inf".parse::<Score>().is_err());
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("free/reduced".parse::<Lunch>().unwrap(), Lunch::FreeReduced);
        assert_eq!("GROUP c".parse::<RaceEthnicity>().unwrap(), RaceEthnicity::GroupC);
        assert_eq!(
            "associate's degree".parse::<ParentalEducation>().unwrap(),
            ParentalEducation::Associate
        );
        let err = "Group F".parse::<RaceEthnicity>().unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Group E"));
    }

    #[test]
    fn next_and_prev_wrap_within_option_set() {
        assert_eq!(Gender::Male.next(), Gender::Female);
        assert_eq!(Gender::Female.prev(), Gender::Male);
        assert_eq!(ParentalEducation::PrimarySchool.prev(), ParentalEducation::Master);
        assert_eq!(TestPrep::None.next(), TestPrep::Completed);
    }

    #[test]
    fn record_row_follows_feature_column_order() {
        let row = StudentRecord::default().to_row();
        let cols: Vec<_> = row.columns().collect();
        assert_eq!(cols, FEATURE_COLUMNS.to_vec());
        assert_eq!(row.get(COL_READING), Some(&FeatureValue::Number(70.0)));
        assert_eq!(row.get(COL_GENDER), Some(&FeatureValue::category("Female")));
    }
}
