//! Snapshot loading.

use domain::models::{ChallengeRecord, User};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use crate::error::SyncError;

/// Everything a sync run reads: members, raw tracker events and, optionally,
/// challenge records stored by earlier runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub users: Vec<User>,
    /// Raw vendor payloads; parsed one by one so a bad event never fails the file.
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
    #[serde(default)]
    pub challenges: Vec<ChallengeRecord>,
}

pub async fn load_snapshot(path: &Path) -> Result<Snapshot, SyncError> {
    let snapshot: Snapshot = read_json(path).await?;
    tracing::info!(
        path = %path.display(),
        users = snapshot.users.len(),
        events = snapshot.events.len(),
        challenges = snapshot.challenges.len(),
        "Loaded snapshot"
    );
    Ok(snapshot)
}

/// Challenge records from an earlier run's `challenges.json`.
///
/// A configured file that does not exist yet is treated as empty.
pub async fn load_previous_challenges(
    path: Option<&Path>,
) -> Result<Vec<ChallengeRecord>, SyncError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|source| SyncError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    if !exists {
        tracing::info!(path = %path.display(), "No previous challenges found");
        return Ok(Vec::new());
    }

    read_json(path).await
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SyncError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| SyncError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| SyncError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "users": [{{"id": "u1", "taxId": "111", "petPlan": "Pet 3", "deviceIds": ["d1"]}}],
                "events": [{{"id": 1}}, {{"anything": true}}]
            }}"#
        )
        .unwrap();

        let snapshot = load_snapshot(file.path()).await.unwrap();

        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(snapshot.users[0].device_ids, vec!["d1".to_string()]);
        assert_eq!(snapshot.events.len(), 2);
        assert!(snapshot.challenges.is_empty());
    }

    #[tokio::test]
    async fn test_load_snapshot_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_snapshot(&dir.path().join("nope.json")).await;
        assert!(matches!(result, Err(SyncError::Read { .. })));
    }

    #[tokio::test]
    async fn test_load_snapshot_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let result = load_snapshot(file.path()).await;
        assert!(matches!(result, Err(SyncError::Json { .. })));
    }

    #[tokio::test]
    async fn test_previous_challenges_optional() {
        assert!(load_previous_challenges(None).await.unwrap().is_empty());

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("challenges.json");
        assert!(load_previous_challenges(Some(&missing)).await.unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_previous_challenges_lookup_error_is_not_empty() {
        // A regular file in the parent position makes the lookup fail with ENOTDIR.
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().join("challenges.json");

        let result = load_previous_challenges(Some(&path)).await;
        assert!(matches!(result, Err(SyncError::Read { .. })));
    }
}
