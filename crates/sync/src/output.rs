//! Result files.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

pub const WALKS_FILE: &str = "walks.json";
pub const CHALLENGES_FILE: &str = "challenges.json";
pub const REWARDS_FILE: &str = "rewards.json";
pub const LEADERBOARD_FILE: &str = "leaderboard.json";

/// Writes JSON documents into one output directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    directory: PathBuf,
    pretty: bool,
}

impl OutputWriter {
    pub fn new(directory: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            directory: directory.into(),
            pretty,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Serialize `value` to `file_name`, replacing any previous file.
    pub async fn write<T: Serialize + ?Sized>(
        &self,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf, SyncError> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|source| SyncError::Write {
                path: self.directory.clone(),
                source,
            })?;

        let path = self.directory.join(file_name);
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        }
        .map_err(|source| SyncError::Json {
            path: path.clone(),
            source,
        })?;

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| SyncError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "Wrote output file");
        Ok(path)
    }
}
