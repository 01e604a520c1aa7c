//! Rollback use case

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::application::context::ReleaseContext;
use crate::domain::entities::{
    is_contained_path, ArtifactState, BackupSnapshot, RedeployRecord, RollbackHistory,
    RollbackRecord,
};
use crate::domain::ports::{Clock, EnvironmentLocks, RollbackRepository, VersionStore, WorkingTree};
use crate::error::{ReleaseError, ReleaseResult};

use super::options::RollbackOptions;

pub struct RollbackUseCase {
    rollbacks: Arc<dyn RollbackRepository>,
    version_store: Arc<dyn VersionStore>,
    locks: Arc<dyn EnvironmentLocks>,
    clock: Arc<dyn Clock>,
}

impl RollbackUseCase {
    pub fn new(context: &ReleaseContext) -> Self {
        Self {
            rollbacks: context.rollbacks.clone(),
            version_store: context.version_store.clone(),
            locks: context.locks.clone(),
            clock: context.clock.clone(),
        }
    }

    /// Remove the files a commit added or changed from the release branch
    ///
    /// Every file is backed up before anything is deleted. Files that cannot
    /// be backed up stay in place and are reported as a partial failure.
    pub fn rollback(&self, options: &RollbackOptions) -> ReleaseResult<RollbackRecord> {
        options.validate()?;
        let _guard = self.locks.acquire(&options.alias)?;

        let mut tree = self.version_store.clone_tree()?;
        tree.checkout(&options.branch)?;
        let commit_id = resolve_commit(tree.as_ref(), &options.commit_id)?;

        let mut history = self.rollbacks.load_history(&options.alias)?;
        if !history.state_of(&commit_id).can_roll_back() {
            return Err(ReleaseError::Validation(format!(
                "commit {commit_id} is already rolled back"
            )));
        }

        let paths: BTreeSet<String> = tree
            .diff_files(&commit_id)?
            .into_iter()
            .filter(|change| change.status.leaves_content())
            .map(|change| change.path)
            .collect();
        if paths.is_empty() {
            return Err(ReleaseError::not_found("changed files of commit", commit_id));
        }

        let mut snapshot = BackupSnapshot::new(
            &commit_id,
            &options.alias,
            &options.branch,
            self.clock.now(),
        );
        let mut failed = Vec::new();
        for path in &paths {
            let stored = match backup_content(tree.as_ref(), &commit_id, path) {
                Some(content) => snapshot.insert(path, content).is_ok(),
                None => false,
            };
            if !stored {
                warn!(
                    commit = %commit_id,
                    path = %path,
                    "cannot back up file, leaving it in place"
                );
                failed.push(path.clone());
            }
        }
        if snapshot.is_empty() {
            return Err(ReleaseError::PartialFailure {
                commit_id,
                record: None,
                failed,
            });
        }

        self.rollbacks.save_snapshot(&snapshot)?;
        let deleted = snapshot.paths();
        for path in &deleted {
            tree.remove_file(path)?;
        }
        let rollback_commit = tree.commit(&format!("Rollback {commit_id}"))?;
        if rollback_commit.is_some() {
            tree.push(&options.branch)?;
        }

        let record = RollbackRecord {
            commit_id: commit_id.clone(),
            environment_alias: options.alias.clone(),
            branch: options.branch.clone(),
            rolled_back_at: self.clock.now(),
            rolled_back_by: options.actor.clone(),
            deleted_file_paths: deleted,
            rollback_commit,
        };
        history.rollbacks.push(record.clone());
        self.rollbacks.save_history(&options.alias, &history)?;
        info!(
            commit = %commit_id,
            files = record.deleted_file_paths.len(),
            "commit rolled back"
        );

        if failed.is_empty() {
            Ok(record)
        } else {
            Err(ReleaseError::PartialFailure {
                commit_id,
                record: Some(Box::new(record)),
                failed,
            })
        }
    }

    /// Restore the files of an earlier rollback from its snapshot
    pub fn redeploy_rollback(&self, options: &RollbackOptions) -> ReleaseResult<RedeployRecord> {
        options.validate()?;
        let _guard = self.locks.acquire(&options.alias)?;

        let mut tree = self.version_store.clone_tree()?;
        tree.checkout(&options.branch)?;
        let commit_id = resolve_commit(tree.as_ref(), &options.commit_id)?;

        let snapshot = self
            .rollbacks
            .load_snapshot(&options.alias, &commit_id)?
            .ok_or_else(|| ReleaseError::not_found("backup snapshot", commit_id.as_str()))?;

        for (path, content) in snapshot.files() {
            tree.write_file(path, content)?;
        }
        let redeploy_commit = tree.commit(&format!("Redeploy rollback {commit_id}"))?;
        if redeploy_commit.is_some() {
            tree.push(&options.branch)?;
        }

        let record = RedeployRecord {
            commit_id: commit_id.clone(),
            environment_alias: options.alias.clone(),
            branch: options.branch.clone(),
            redeployed_at: self.clock.now(),
            redeployed_by: options.actor.clone(),
            restored_file_paths: snapshot.paths(),
            redeploy_commit,
        };
        let mut history = self.rollbacks.load_history(&options.alias)?;
        history.redeploys.push(record.clone());
        self.rollbacks.save_history(&options.alias, &history)?;
        info!(
            commit = %commit_id,
            files = record.restored_file_paths.len(),
            "rollback redeployed"
        );
        Ok(record)
    }

    pub fn history(&self, alias: &str) -> ReleaseResult<RollbackHistory> {
        Ok(self.rollbacks.load_history(alias)?)
    }

    pub fn state_of(&self, alias: &str, commit_id: &str) -> ReleaseResult<ArtifactState> {
        Ok(self.history(alias)?.state_of(commit_id))
    }
}

fn resolve_commit(tree: &dyn WorkingTree, commit_id: &str) -> ReleaseResult<String> {
    tree.resolve_revision(commit_id)?
        .ok_or_else(|| ReleaseError::not_found("commit", commit_id))
}

/// Working-tree content, falling back to the content at `commit_id`
fn backup_content(tree: &dyn WorkingTree, commit_id: &str, path: &str) -> Option<Vec<u8>> {
    if !is_contained_path(path) {
        return None;
    }
    match tree.read_file(path) {
        Ok(Some(content)) => Some(content),
        Ok(None) | Err(_) => tree.show(commit_id, path).ok(),
    }
}
