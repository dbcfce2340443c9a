//! Command-line parsing for the student score predictor.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! inference and presentation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Gender, Lunch, ParentalEducation, RaceEthnicity, Score, StudentRecord, TestPrep};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "score", version, about = "Student Math Score Predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive form (default).
    Tui(ModelArgs),
    /// Predict a single student's math score from flags.
    Predict(PredictArgs),
    /// Predict math scores for every row of a CSV file.
    Batch(BatchArgs),
    /// List the accepted values for each input.
    Options,
    /// Describe the loaded pipeline artifact.
    Inspect(ModelArgs),
}

/// Pipeline artifact location.
#[derive(Debug, Args, Clone, Default)]
pub struct ModelArgs {
    /// Pipeline JSON file (defaults to $SCORE_MODEL_PATH, then `model.json`).
    #[arg(short = 'm', long, value_name = "JSON")]
    pub model: Option<PathBuf>,
}

/// Inputs for a one-shot prediction. Defaults mirror the interactive form.
#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Gender (Female, Male).
    #[arg(long, default_value = "Female")]
    pub gender: Gender,

    /// Race/ethnicity group (Group A .. Group E).
    #[arg(long = "race-ethnicity", default_value = "Group A")]
    pub race_ethnicity: RaceEthnicity,

    /// Parental level of education.
    #[arg(long = "parental-education", default_value = "Primary School")]
    pub parental_education: ParentalEducation,

    /// Lunch type (Standard, Free/Reduced).
    #[arg(long, default_value = "Standard")]
    pub lunch: Lunch,

    /// Test preparation course (None, Completed).
    #[arg(long = "test-prep", default_value = "None")]
    pub test_prep: TestPrep,

    /// Reading score, clamped to 0..=100.
    #[arg(long, default_value = "70", allow_hyphen_values = true)]
    pub reading: Score,

    /// Writing score, clamped to 0..=100.
    #[arg(long, default_value = "70", allow_hyphen_values = true)]
    pub writing: Score,
}

impl Command {
    /// Whether the command reads a pipeline artifact.
    pub fn loads_pipeline(&self) -> bool {
        !matches!(self, Command::Options)
    }
}

impl PredictArgs {
    pub fn record(&self) -> StudentRecord {
        StudentRecord {
            gender: self.gender,
            race_ethnicity: self.race_ethnicity,
            parental_education: self.parental_education,
            lunch: self.lunch,
            test_prep: self.test_prep,
            reading_score: self.reading,
            writing_score: self.writing,
        }
    }
}

/// Options for batch prediction.
#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// CSV with one student per row (columns named like the form fields).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Write predictions to a CSV file.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}
