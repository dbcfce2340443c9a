//! Form state for the interactive predictor.
//!
//! Kept free of terminal I/O so key handling and submission can be tested
//! directly. The terminal layer in `tui/mod.rs` only maps events in and draws
//! this state out.

use crossterm::event::KeyCode;

use crate::app::inference::predict_record;
use crate::domain::{Categorical, PredictionOutput, StudentRecord};
use crate::models::Pipeline;

/// Slider step for PageUp/PageDown.
const COARSE_STEP: i64 = 10;

/// The seven form fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Gender,
    RaceEthnicity,
    ParentalEducation,
    Lunch,
    TestPrep,
    ReadingScore,
    WritingScore,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Gender,
        FormField::RaceEthnicity,
        FormField::ParentalEducation,
        FormField::Lunch,
        FormField::TestPrep,
        FormField::ReadingScore,
        FormField::WritingScore,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Gender => "Gender",
            FormField::RaceEthnicity => "Race/Ethnicity",
            FormField::ParentalEducation => "Parental Level of Education",
            FormField::Lunch => "Lunch Type",
            FormField::TestPrep => "Test Preparation Course",
            FormField::ReadingScore => "Reading Score",
            FormField::WritingScore => "Writing Score",
        }
    }

    pub fn is_slider(self) -> bool {
        matches!(self, FormField::ReadingScore | FormField::WritingScore)
    }

    /// Current value rendered for display.
    pub fn value(self, record: &StudentRecord) -> String {
        match self {
            FormField::Gender => record.gender.label().to_string(),
            FormField::RaceEthnicity => record.race_ethnicity.label().to_string(),
            FormField::ParentalEducation => record.parental_education.label().to_string(),
            FormField::Lunch => record.lunch.label().to_string(),
            FormField::TestPrep => record.test_prep.label().to_string(),
            FormField::ReadingScore => record.reading_score.to_string(),
            FormField::WritingScore => record.writing_score.to_string(),
        }
    }

    /// Cycle a selector or move a slider by `delta` (sliders clamp, selectors wrap).
    pub fn adjust(self, record: &mut StudentRecord, delta: i64) {
        fn cycle<T: Categorical>(v: T, delta: i64) -> T {
            if delta >= 0 { v.next() } else { v.prev() }
        }
        match self {
            FormField::Gender => record.gender = cycle(record.gender, delta),
            FormField::RaceEthnicity => record.race_ethnicity = cycle(record.race_ethnicity, delta),
            FormField::ParentalEducation => {
                record.parental_education = cycle(record.parental_education, delta)
            }
            FormField::Lunch => record.lunch = cycle(record.lunch, delta),
            FormField::TestPrep => record.test_prep = cycle(record.test_prep, delta),
            FormField::ReadingScore => record.reading_score = record.reading_score.step(delta),
            FormField::WritingScore => record.writing_score = record.writing_score.step(delta),
        }
    }
}

/// Outcome of the last submission.
#[derive(Debug, Clone, PartialEq)]
pub enum FormResult {
    Prediction(PredictionOutput),
    Error(String),
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Continue,
    Submit,
    Quit,
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub record: StudentRecord,
    pub selected: usize,
    pub result: Option<FormResult>,
    pub status: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            record: StudentRecord::default(),
            selected: 0,
            result: None,
            status: "Fill in the student's details, then press Enter to predict.".to_string(),
        }
    }
}

impl FormState {
    pub fn selected_field(&self) -> FormField {
        FormField::ALL[self.selected.min(FormField::ALL.len() - 1)]
    }

    pub fn handle_key(&mut self, code: KeyCode) -> FormAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return FormAction::Quit,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Tab => {
                if self.selected + 1 < FormField::ALL.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Left => self.selected_field().adjust(&mut self.record, -1),
            KeyCode::Right => self.selected_field().adjust(&mut self.record, 1),
            KeyCode::PageUp if self.selected_field().is_slider() => {
                self.selected_field().adjust(&mut self.record, COARSE_STEP)
            }
            KeyCode::PageDown if self.selected_field().is_slider() => {
                self.selected_field().adjust(&mut self.record, -COARSE_STEP)
            }
            KeyCode::Enter | KeyCode::Char('p') => return FormAction::Submit,
            _ => {}
        }
        FormAction::Continue
    }

    /// Run one prediction. Errors are stored for display, never propagated.
    pub fn submit(&mut self, pipeline: &Pipeline) {
        let at = chrono::Local::now().format("%H:%M:%S");
        match predict_record(pipeline, &self.record) {
            Ok(output) => {
                self.status = format!("Predicted at {at}.");
                self.result = Some(FormResult::Prediction(output));
            }
            Err(err) => {
                self.status = format!("Prediction failed at {at}.");
                self.result = Some(FormResult::Error(err.to_string()));
            }
        }
    }
}
