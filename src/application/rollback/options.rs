//! Rollback options

use crate::error::{ReleaseError, ReleaseResult};

/// Options shared by rollback and rollback redeploy
#[derive(Debug, Clone)]
pub struct RollbackOptions {
    /// Environment whose rollback history is updated
    pub alias: String,
    /// Release branch the commit was deployed on
    pub branch: String,
    /// Full or abbreviated commit id
    pub commit_id: String,
    pub actor: String,
}

impl RollbackOptions {
    pub fn new(
        alias: impl Into<String>,
        branch: impl Into<String>,
        commit_id: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            alias: alias.into(),
            branch: branch.into(),
            commit_id: commit_id.into(),
            actor: actor.into(),
        }
    }

    pub(super) fn validate(&self) -> ReleaseResult<()> {
        let id = self.commit_id.as_str();
        if !(4..=64).contains(&id.len()) || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ReleaseError::Validation(format!(
                "'{id}' is not a commit id"
            )));
        }
        if self.branch.trim().is_empty() || self.branch.starts_with('-') {
            return Err(ReleaseError::Validation(format!(
                "'{}' is not a branch name",
                self.branch
            )));
        }
        Ok(())
    }
}
