//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads configuration
//! - parses CLI arguments
//! - starts logging for commands that load a pipeline
//! - loads the pipeline artifact
//! - dispatches to the TUI or one of the scripted commands

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{BatchArgs, Command, ModelArgs, PredictArgs};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::Pipeline;

pub mod inference;

/// Entry point for the `score` binary.
pub fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env();

    // `score` and `score --model x.json` behave like `score tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // Help, usage errors and `options` never touch the log file.
    if cli.command.loads_pipeline() {
        crate::logging::init(&config);
    }

    match cli.command {
        Command::Tui(args) => handle_tui(&config, &args),
        Command::Predict(args) => handle_predict(&config, &args),
        Command::Batch(args) => handle_batch(&config, &args),
        Command::Options => {
            print!("{}", crate::report::format_options());
            Ok(())
        }
        Command::Inspect(args) => {
            let pipeline = load_pipeline(&config, &args)?;
            print!("{}", crate::report::format_pipeline_summary(&pipeline.summary()));
            Ok(())
        }
    }
}

/// Resolve the artifact path: CLI flag first, then configuration.
pub fn model_path(config: &AppConfig, args: &ModelArgs) -> PathBuf {
    args.model.clone().unwrap_or_else(|| config.model_path.clone())
}

fn load_pipeline(config: &AppConfig, args: &ModelArgs) -> Result<Pipeline, AppError> {
    let path = model_path(config, args);
    crate::io::read_pipeline_json(&path).inspect_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to load pipeline");
    })
}

fn handle_tui(config: &AppConfig, args: &ModelArgs) -> Result<(), AppError> {
    // Load before touching the terminal: a missing artifact must stop the app
    // before any input is rendered.
    let pipeline = load_pipeline(config, args)?;
    crate::tui::run(pipeline)
}

fn handle_predict(config: &AppConfig, args: &PredictArgs) -> Result<(), AppError> {
    let pipeline = load_pipeline(config, &args.model)?;
    let output = inference::predict_record(&pipeline, &args.record())?;
    print!(
        "{}",
        crate::report::format_prediction_report(output.value, &output.row)
    );
    Ok(())
}

fn handle_batch(config: &AppConfig, args: &BatchArgs) -> Result<(), AppError> {
    let pipeline = load_pipeline(config, &args.model)?;
    let ingested = crate::io::read_records_csv(&args.input)?;
    if ingested.clamped_cells > 0 {
        eprintln!(
            "note: {} score value(s) were clamped/rounded into 0..=100",
            ingested.clamped_cells
        );
    }

    let rows = inference::predict_batch(&pipeline, &ingested.records)?;
    print!(
        "{}",
        crate::report::format_batch_table(&rows, &ingested.row_errors)
    );

    if let Some(path) = &args.export {
        crate::io::write_predictions_csv(path, &rows)?;
        println!("\nWrote {} prediction(s) to {}", rows.len(), path.display());
    }
    Ok(())
}

/// Rewrite argv so `score` defaults to `score tui`.
///
/// Rules:
/// - `score`                      -> `score tui`
/// - `score -m model.json ...`    -> `score tui -m model.json ...`
/// - `score --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "tui" | "predict" | "batch" | "options" | "inspect"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(argv(&["score"])), argv(&["score", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["score", "-m", "x.json"])),
            argv(&["score", "tui", "-m", "x.json"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["score", "predict"])), argv(&["score", "predict"]));
        assert_eq!(rewrite_args(argv(&["score", "--help"])), argv(&["score", "--help"]));
    }

    #[test]
    fn cli_flag_overrides_configured_model_path() {
        let config = AppConfig::default();
        assert_eq!(model_path(&config, &ModelArgs::default()), PathBuf::from("model.json"));
        let args = ModelArgs {
            model: Some(PathBuf::from("other.json")),
        };
        assert_eq!(model_path(&config, &args), PathBuf::from("other.json"));
    }

    #[test]
    fn missing_model_fails_before_ui() {
        let config = AppConfig::default();
        let args = ModelArgs {
            model: Some(PathBuf::from("no/such/dir/model.json")),
        };
        // `handle_tui` must return the load error without initializing the terminal.
        let err = handle_tui(&config, &args).unwrap_err();
        assert!(err.is_model_not_found());
    }
}
