//! JSON Rollback Repository
//!
//! History is a single append-only JSON document per environment. A backup
//! snapshot is a manifest plus verbatim file copies under `files/`.

use std::collections::BTreeMap;
use std::fs;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{BackupSnapshot, RollbackHistory};
use crate::domain::ports::{RollbackRepository, StoreError};
use crate::infrastructure::fs::{read_json, write_atomic, write_json_atomic};

use super::layout::StateLayout;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotManifest {
    commit_id: String,
    environment_alias: String,
    branch: String,
    created_at: DateTime<Utc>,
    /// Repository path -> size in bytes
    files: BTreeMap<String, u64>,
}

pub struct JsonRollbackRepository {
    layout: StateLayout,
}

impl JsonRollbackRepository {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }
}

impl RollbackRepository for JsonRollbackRepository {
    fn load_history(&self, alias: &str) -> Result<RollbackHistory, StoreError> {
        Ok(read_json(&self.layout.history_file(alias)?)?.unwrap_or_default())
    }

    fn save_history(&self, alias: &str, history: &RollbackHistory) -> Result<(), StoreError> {
        write_json_atomic(&self.layout.history_file(alias)?, history)
    }

    /// Files first, manifest last: a snapshot without a manifest does not exist
    fn save_snapshot(&self, snapshot: &BackupSnapshot) -> Result<(), StoreError> {
        let dir = self
            .layout
            .snapshot_dir(&snapshot.environment_alias, &snapshot.commit_id)?;
        let files_dir = dir.join("files");

        let mut sizes = BTreeMap::new();
        for (path, content) in snapshot.files() {
            write_atomic(&files_dir.join(path), content)?;
            sizes.insert(path.to_string(), content.len() as u64);
        }

        let manifest = SnapshotManifest {
            commit_id: snapshot.commit_id.clone(),
            environment_alias: snapshot.environment_alias.clone(),
            branch: snapshot.branch.clone(),
            created_at: snapshot.created_at,
            files: sizes,
        };
        write_json_atomic(&dir.join("manifest.json"), &manifest)
    }

    fn load_snapshot(
        &self,
        alias: &str,
        commit_id: &str,
    ) -> Result<Option<BackupSnapshot>, StoreError> {
        let dir = self.layout.snapshot_dir(alias, commit_id)?;
        let Some(manifest) = read_json::<SnapshotManifest>(&dir.join("manifest.json"))? else {
            return Ok(None);
        };

        let mut snapshot = BackupSnapshot::new(
            manifest.commit_id,
            manifest.environment_alias,
            manifest.branch,
            manifest.created_at,
        );
        let files_dir = dir.join("files");
        for path in manifest.files.keys() {
            let source = files_dir.join(path);
            let content = fs::read(&source).map_err(|e| StoreError::read(&source, e))?;
            snapshot.insert(path, content).map_err(|path| {
                StoreError::corrupted(dir.join("manifest.json"), format!("path '{path}' escapes the snapshot"))
            })?;
        }
        Ok(Some(snapshot))
    }
}
