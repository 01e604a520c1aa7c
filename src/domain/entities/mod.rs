//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `ComponentIndex` - Tracked component bodies and fingerprints
//! - `ComponentSelection` - Components picked for a check or deployment
//! - `ReleaseRecord` - One deployment event
//! - `RollbackHistory` / `BackupSnapshot` - Rollback bookkeeping

mod component;
mod dependency;
mod kind_map;
mod release;
mod rollback;
mod selection;

pub use component::{
    ComponentBody, ComponentIndex, ComponentRecord, MaterializedComponent, RecordOutcome,
};
pub use dependency::{DependencyEdge, DependencyReport};
pub use kind_map::KindMap;
pub use release::{DeployStatus, DeploymentLogEntry, ReleaseRecord};
pub use rollback::{
    is_contained_path, normalize_path, ArtifactState, BackupSnapshot, RedeployRecord,
    RollbackHistory, RollbackRecord,
};
pub use selection::{ComponentRef, ComponentSelection};
