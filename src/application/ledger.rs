//! Release Ledger
//!
//! Durable record of every deployment event per source environment. The
//! local ledger is written before anything is published, so a release that
//! fails to reach the versioned store is still on record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::entities::{DeploymentLogEntry, ReleaseRecord};
use crate::domain::ports::{ReleaseRepository, WorkingTree};
use crate::domain::value_objects::ReleaseId;
use crate::error::{ReleaseError, ReleaseResult};

pub struct ReleaseLedger {
    repository: Arc<dyn ReleaseRepository>,
    releases_dir: String,
}

impl ReleaseLedger {
    /// `releases_dir` is the tree-relative directory release files are published to
    pub fn new(repository: Arc<dyn ReleaseRepository>, releases_dir: impl Into<String>) -> Self {
        Self {
            repository,
            releases_dir: releases_dir.into(),
        }
    }

    /// First unused id for a deployment at `at`
    pub fn next_release_id(&self, alias: &str, at: DateTime<Utc>) -> ReleaseResult<ReleaseId> {
        let base = ReleaseId::from_time(at);
        if !self.repository.exists(alias, &base)? {
            return Ok(base);
        }
        let mut n = 2;
        loop {
            let candidate = base.with_suffix(n);
            if !self.repository.exists(alias, &candidate)? {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Persist `record`, then publish it when `publish` is set
    ///
    /// Publishing writes the release file into `tree`, commits, pushes the
    /// release branch and replaces the tag named after the release id.
    /// Returns the release commit, if one was made.
    pub fn create_release(
        &self,
        alias: &str,
        tree: &mut dyn WorkingTree,
        record: &ReleaseRecord,
        publish: bool,
    ) -> ReleaseResult<Option<String>> {
        self.repository.save(alias, record)?;
        info!(alias, release = %record.release_id, publish, "release recorded");
        if !publish {
            return Ok(None);
        }

        let id = record.release_id.as_str();
        let content = serde_json::to_vec_pretty(record)
            .map_err(|e| ReleaseError::Validation(format!("cannot serialize release: {e}")))?;
        tree.write_file(&format!("{}/{}.json", self.releases_dir, id), &content)?;
        let commit = tree.commit(&format!("Release {id}"))?;
        tree.push(&record.target_branch)?;
        replace_tag(tree, id)?;
        info!(alias, release = id, commit = ?commit, "release published");
        Ok(commit)
    }

    /// Overwrite the stored record without publishing
    pub fn save(&self, alias: &str, record: &ReleaseRecord) -> ReleaseResult<()> {
        Ok(self.repository.save(alias, record)?)
    }

    /// Releases of `alias`, newest first, optionally limited to one branch
    pub fn list_releases(
        &self,
        alias: &str,
        branch: Option<&str>,
    ) -> ReleaseResult<Vec<ReleaseRecord>> {
        let mut releases: Vec<ReleaseRecord> = self
            .repository
            .list(alias)?
            .into_iter()
            .filter(|r| branch.map_or(true, |b| r.target_branch == b))
            .collect();
        releases.sort_by(|a, b| {
            b.deployed_at
                .cmp(&a.deployed_at)
                .then_with(|| b.release_id.cmp(&a.release_id))
        });
        Ok(releases)
    }

    /// Newest release of `alias` on any branch
    pub fn latest_release(&self, alias: &str) -> ReleaseResult<Option<ReleaseRecord>> {
        Ok(self.list_releases(alias, None)?.into_iter().next())
    }

    pub fn get_release(&self, alias: &str, id: &ReleaseId) -> ReleaseResult<ReleaseRecord> {
        self.repository
            .load(alias, id)?
            .ok_or_else(|| ReleaseError::not_found("release", id.as_str()))
    }

    pub fn release_history(
        &self,
        alias: &str,
        id: &ReleaseId,
    ) -> ReleaseResult<Vec<DeploymentLogEntry>> {
        Ok(self.get_release(alias, id)?.deployment_log)
    }
}

/// Point tag `name` at the current head, replacing any earlier tag
pub(crate) fn replace_tag(tree: &dyn WorkingTree, name: &str) -> ReleaseResult<()> {
    if tree.delete_tag(name)? {
        warn!(tag = name, "replacing existing tag");
    }
    tree.tag(name)?;
    Ok(())
}
