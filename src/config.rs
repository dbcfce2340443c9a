//! Runtime configuration from the environment.
//!
//! Values come from the process environment, with `.env` loaded first via
//! `dotenvy`. CLI flags override whatever is resolved here.

use std::path::PathBuf;

pub const ENV_MODEL_PATH: &str = "SCORE_MODEL_PATH";
pub const ENV_LOG: &str = "SCORE_LOG";
pub const ENV_LOG_FILE: &str = "SCORE_LOG_FILE";

const DEFAULT_MODEL_PATH: &str = "model.json";
const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_LOG_FILE: &str = "score.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Default pipeline artifact path.
    pub model_path: PathBuf,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
    /// Where log lines are written (stdout belongs to the UI).
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            model_path: non_empty(ENV_MODEL_PATH).map(PathBuf::from).unwrap_or(defaults.model_path),
            log_filter: non_empty(ENV_LOG).unwrap_or(defaults.log_filter),
            log_file: non_empty(ENV_LOG_FILE).map(PathBuf::from).unwrap_or(defaults.log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(|_| None);
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.model_path, PathBuf::from("model.json"));
    }

    #[test]
    fn env_values_override_defaults() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_MODEL_PATH, "artifacts/math.json"),
            (ENV_LOG, "student_score=debug"),
            (ENV_LOG_FILE, "   "),
        ]);
        let cfg = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.model_path, PathBuf::from("artifacts/math.json"));
        assert_eq!(cfg.log_filter, "student_score=debug");
        assert_eq!(cfg.log_file, PathBuf::from("score.log"));
    }
}
