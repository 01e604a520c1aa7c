//! Deploy results

use serde::Serialize;

use crate::application::component_store::RecordSummary;
use crate::domain::entities::{DependencyReport, DeploymentLogEntry, ReleaseRecord};

/// Result of a deploy or release redeploy
#[derive(Debug, Clone, Serialize)]
pub struct DeployResult {
    /// Ledger record as written
    pub release: ReleaseRecord,
    /// Whether the release was committed, pushed and tagged
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_commit: Option<String>,
    /// Log entries added by this run
    pub outcomes: Vec<DeploymentLogEntry>,
    pub dependencies: DependencyReport,
    pub recorded: RecordSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub export_warnings: Vec<String>,
    /// Selected components the export produced no body for
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl DeployResult {
    pub fn all_succeeded(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|e| e.status.is_success())
    }
}

/// Result of promoting a recorded release
#[derive(Debug, Clone, Serialize)]
pub struct PromoteResult {
    pub release: ReleaseRecord,
    pub outcome: DeploymentLogEntry,
}
