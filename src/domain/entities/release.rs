//! Release entity
//!
//! One record per deployment event. Records are only ever overwritten by a
//! redeploy that explicitly reuses their id; the deployment log is append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::selection::ComponentSelection;
use crate::domain::value_objects::ReleaseId;

/// Outcome of deploying a release to one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    Success,
    /// Deployed, but the tool reported warnings
    Warning,
    Error,
}

impl DeployStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, DeployStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployStatus::Success => "success",
            DeployStatus::Warning => "warning",
            DeployStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentLogEntry {
    pub target_alias: String,
    pub timestamp: DateTime<Utc>,
    pub status: DeployStatus,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub release_id: ReleaseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_name: Option<String>,
    pub deployed_at: DateTime<Utc>,
    pub deployed_by: String,
    pub source_environment_alias: String,
    pub target_branch: String,
    pub component_selection: ComponentSelection,
    #[serde(default)]
    pub deployment_log: Vec<DeploymentLogEntry>,
}

impl ReleaseRecord {
    pub fn append_log(&mut self, entry: DeploymentLogEntry) {
        self.deployment_log.push(entry);
    }

    /// Distinct target aliases in the order they were first deployed to
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = Vec::new();
        for entry in &self.deployment_log {
            if !targets.contains(&entry.target_alias) {
                targets.push(entry.target_alias.clone());
            }
        }
        targets
    }

    /// True if every log entry since `from` succeeded and there was at least one
    pub fn succeeded_since(&self, from: usize) -> bool {
        let recent = self.deployment_log.get(from..).unwrap_or_default();
        !recent.is_empty() && recent.iter().all(|e| e.status.is_success())
    }
}
