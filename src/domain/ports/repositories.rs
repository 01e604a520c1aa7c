//! Repository ports for durable per-environment state
//!
//! Implementations must write atomically: a crash mid-write leaves either the
//! old or the new content, never a truncated file.

use super::store_error::StoreError;
use crate::domain::entities::{BackupSnapshot, ComponentIndex, ReleaseRecord, RollbackHistory};
use crate::domain::value_objects::{ComponentKind, ReleaseId};

pub trait ComponentRepository: Send + Sync {
    /// Full index of an environment; empty when nothing was recorded yet
    fn load_index(&self, alias: &str) -> Result<ComponentIndex, StoreError>;

    /// Persist the records of one kind from `index`
    fn save_kind(
        &self,
        alias: &str,
        kind: &ComponentKind,
        index: &ComponentIndex,
    ) -> Result<(), StoreError>;
}

pub trait ReleaseRepository: Send + Sync {
    /// Write a record, replacing any record with the same id
    fn save(&self, alias: &str, record: &ReleaseRecord) -> Result<(), StoreError>;

    fn load(&self, alias: &str, id: &ReleaseId) -> Result<Option<ReleaseRecord>, StoreError>;

    /// Every record of an environment, in no particular order
    fn list(&self, alias: &str) -> Result<Vec<ReleaseRecord>, StoreError>;

    fn exists(&self, alias: &str, id: &ReleaseId) -> Result<bool, StoreError> {
        Ok(self.load(alias, id)?.is_some())
    }
}

pub trait RollbackRepository: Send + Sync {
    fn load_history(&self, alias: &str) -> Result<RollbackHistory, StoreError>;

    fn save_history(&self, alias: &str, history: &RollbackHistory) -> Result<(), StoreError>;

    fn save_snapshot(&self, snapshot: &BackupSnapshot) -> Result<(), StoreError>;

    fn load_snapshot(
        &self,
        alias: &str,
        commit_id: &str,
    ) -> Result<Option<BackupSnapshot>, StoreError>;
}
