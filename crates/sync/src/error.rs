use std::path::PathBuf;
use thiserror::Error;

/// Failures of a sync run. Bad individual events are not errors; they are
/// rejected and counted.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid evaluation period: {0}")]
    Period(#[from] domain::models::ChallengeError),

    #[error("Evaluation worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
