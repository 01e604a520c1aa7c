//! Visibility Filter
//!
//! Derives the pending view of an environment from its component index and
//! latest release. A component is hidden only when it was part of the latest
//! release and has not changed since.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{ComponentIndex, ComponentRecord, KindMap, ReleaseRecord};
use crate::domain::value_objects::ComponentKind;

/// A component record annotated with its deployment status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingComponent {
    #[serde(flatten)]
    pub record: ComponentRecord,
    pub was_previously_deployed: bool,
    pub modified_after_deployment: bool,
}

impl PendingComponent {
    /// Classify one record against the latest release
    pub fn classify(
        kind: &ComponentKind,
        record: &ComponentRecord,
        latest: Option<&ReleaseRecord>,
    ) -> Self {
        let (was_previously_deployed, modified_after_deployment) = match latest {
            None => (false, true),
            Some(release) => (
                release.component_selection.contains(kind, &record.name),
                modified_after(record, release.deployed_at),
            ),
        };
        Self {
            record: record.clone(),
            was_previously_deployed,
            modified_after_deployment,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.was_previously_deployed || self.modified_after_deployment
    }
}

/// Unparsable timestamps count as modified so the component stays visible
fn modified_after(record: &ComponentRecord, deployed_at: DateTime<Utc>) -> bool {
    match record.modified_at.parse() {
        Some(modified) => modified > deployed_at,
        None => true,
    }
}

/// Pending components per kind; kinds with nothing pending are left out
pub fn compute_pending(
    index: &ComponentIndex,
    latest: Option<&ReleaseRecord>,
) -> KindMap<Vec<PendingComponent>> {
    let mut pending = KindMap::new();
    for (kind, records) in index.snapshot() {
        let visible: Vec<PendingComponent> = records
            .iter()
            .map(|record| PendingComponent::classify(&kind, record, latest))
            .filter(PendingComponent::is_pending)
            .collect();
        if !visible.is_empty() {
            pending.insert(kind, visible);
        }
    }
    pending
}
