//! On-disk layout of the state root
//!
//! ```text
//! <root>/<alias>/components/<Kind>.json
//! <root>/<alias>/components/Metadata/<Subtype>.json
//! <root>/<alias>/releases/<release-id>.json
//! <root>/<alias>/rollbacks/history.json
//! <root>/<alias>/rollbacks/snapshots/<commit-id>/manifest.json
//! <root>/<alias>/rollbacks/snapshots/<commit-id>/files/<path>
//! <root>/locks/<alias>.lock
//! ```

use std::path::{Path, PathBuf};

use crate::domain::ports::StoreError;
use crate::domain::value_objects::{ComponentKind, ReleaseId, METADATA_KEY};

#[derive(Debug, Clone)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn env_dir(&self, alias: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(segment(alias)?))
    }

    pub fn components_dir(&self, alias: &str) -> Result<PathBuf, StoreError> {
        Ok(self.env_dir(alias)?.join("components"))
    }

    pub fn kind_file(&self, alias: &str, kind: &ComponentKind) -> Result<PathBuf, StoreError> {
        let dir = self.components_dir(alias)?;
        let file = format!("{}.json", segment(kind.label())?);
        Ok(if kind.is_metadata() {
            dir.join(METADATA_KEY).join(file)
        } else {
            dir.join(file)
        })
    }

    pub fn releases_dir(&self, alias: &str) -> Result<PathBuf, StoreError> {
        Ok(self.env_dir(alias)?.join("releases"))
    }

    pub fn release_file(&self, alias: &str, id: &ReleaseId) -> Result<PathBuf, StoreError> {
        Ok(self.releases_dir(alias)?.join(format!("{id}.json")))
    }

    pub fn history_file(&self, alias: &str) -> Result<PathBuf, StoreError> {
        Ok(self.env_dir(alias)?.join("rollbacks").join("history.json"))
    }

    pub fn snapshot_dir(&self, alias: &str, commit_id: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .env_dir(alias)?
            .join("rollbacks")
            .join("snapshots")
            .join(segment(commit_id)?))
    }

    pub fn lock_file(&self, alias: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join("locks").join(format!("{}.lock", segment(alias)?)))
    }
}

/// A single path segment: no separators, no dot-only names
fn segment(name: &str) -> Result<&str, StoreError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if valid {
        Ok(name)
    } else {
        Err(StoreError::PathEscape {
            path: PathBuf::from(name),
        })
    }
}
