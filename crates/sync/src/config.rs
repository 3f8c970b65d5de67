use chrono::{FixedOffset, NaiveDate};
use domain::models::YearMonth;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Snapshot JSON with `users`, raw tracker `events` and optional `challenges`.
    pub snapshot_path: PathBuf,

    /// Challenge records written by an earlier run, if any.
    #[serde(default)]
    pub previous_challenges_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Pretty-print written JSON files
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    /// Offset from UTC, in minutes, used to decide a walk's calendar day
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Target year; set together with `month`. Both unset means the previous month.
    #[serde(default)]
    pub year: Option<i32>,

    #[serde(default)]
    pub month: Option<u32>,

    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_output_directory() -> PathBuf {
    PathBuf::from("output")
}
fn default_leaderboard_size() -> usize {
    domain::services::DEFAULT_LEADERBOARD_SIZE
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with WR__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("WR").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests do not depend on the working directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [logging]
            level = "info"
            format = "json"

            [input]
            snapshot_path = ""

            [output]
            directory = "output"
            pretty = false

            [evaluation]
            utc_offset_minutes = 0
            leaderboard_size = 10
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.input.snapshot_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "WR__INPUT__SNAPSHOT_PATH environment variable must be set".to_string(),
            ));
        }

        if self.utc_offset().is_none() {
            return Err(ConfigValidationError::InvalidValue(format!(
                "utc_offset_minutes must be within one day, got {}",
                self.evaluation.utc_offset_minutes
            )));
        }

        match (self.evaluation.year, self.evaluation.month) {
            (Some(_), Some(month)) => {
                shared::validation::validate_month(month).map_err(|_| {
                    ConfigValidationError::InvalidValue(format!(
                        "evaluation month must be between 1 and 12, got {month}"
                    ))
                })?;
            }
            (None, None) => {}
            _ => {
                return Err(ConfigValidationError::InvalidValue(
                    "evaluation year and month must be set together".to_string(),
                ))
            }
        }

        if self.evaluation.leaderboard_size == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "leaderboard_size cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Calendar offset for walk dates; `None` when out of range.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.evaluation
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }

    /// Month to evaluate: the configured one, else the month before `today`.
    pub fn target_period(&self, today: NaiveDate) -> Result<YearMonth, domain::models::ChallengeError> {
        match (self.evaluation.year, self.evaluation.month) {
            (Some(year), Some(month)) => YearMonth::new(year, month),
            _ => Ok(YearMonth::of(today).previous()),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            year: None,
            month: None,
            leaderboard_size: default_leaderboard_size(),
        }
    }
}
