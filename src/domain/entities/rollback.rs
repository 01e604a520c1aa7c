//! Rollback entities
//!
//! Rollback history is append-only per environment. The state of a deployed
//! commit is derived from the latest history event touching it.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackRecord {
    pub commit_id: String,
    pub environment_alias: String,
    pub branch: String,
    pub rolled_back_at: DateTime<Utc>,
    pub rolled_back_by: String,
    pub deleted_file_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_commit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeployRecord {
    pub commit_id: String,
    pub environment_alias: String,
    pub branch: String,
    pub redeployed_at: DateTime<Utc>,
    pub redeployed_by: String,
    pub restored_file_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeploy_commit: Option<String>,
}

/// Lifecycle state of a deployed commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArtifactState {
    Deployed,
    RolledBack,
    /// Restored after a rollback; behaves like `Deployed`
    Redeployed,
}

impl ArtifactState {
    pub fn can_roll_back(&self) -> bool {
        !matches!(self, ArtifactState::RolledBack)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackHistory {
    #[serde(default)]
    pub rollbacks: Vec<RollbackRecord>,
    #[serde(default)]
    pub redeploys: Vec<RedeployRecord>,
}

impl RollbackHistory {
    pub fn state_of(&self, commit_id: &str) -> ArtifactState {
        let last_rollback = self
            .rollbacks
            .iter()
            .filter(|r| r.commit_id == commit_id)
            .map(|r| r.rolled_back_at)
            .max();
        let last_redeploy = self
            .redeploys
            .iter()
            .filter(|r| r.commit_id == commit_id)
            .map(|r| r.redeployed_at)
            .max();

        match (last_rollback, last_redeploy) {
            (None, _) => ArtifactState::Deployed,
            (Some(rolled), Some(redeployed)) if redeployed >= rolled => ArtifactState::Redeployed,
            (Some(_), _) => ArtifactState::RolledBack,
        }
    }
}

/// Verbatim copies of the files a rollback deleted, keyed by repository path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSnapshot {
    pub commit_id: String,
    pub environment_alias: String,
    pub branch: String,
    pub created_at: DateTime<Utc>,
    files: BTreeMap<String, Vec<u8>>,
}

impl BackupSnapshot {
    pub fn new(
        commit_id: impl Into<String>,
        environment_alias: impl Into<String>,
        branch: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            commit_id: commit_id.into(),
            environment_alias: environment_alias.into(),
            branch: branch.into(),
            created_at,
            files: BTreeMap::new(),
        }
    }

    /// Add a file; the path must be relative and stay inside the tree
    pub fn insert(&mut self, path: &str, content: Vec<u8>) -> Result<(), String> {
        if !is_contained_path(path) {
            return Err(path.to_string());
        }
        self.files.insert(normalize_path(path), content);
        Ok(())
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_slice()))
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Normalize a repository path for storage (always use forward slashes).
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// True for relative paths without `..`, root or prefix components
pub fn is_contained_path(path: &str) -> bool {
    let normalized = normalize_path(path);
    if normalized.is_empty() || normalized.starts_with('/') {
        return false;
    }
    Path::new(&normalized)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
