//! Application Layer
//!
//! Use cases that orchestrate the release lifecycle.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `ComponentStore` - Records component bodies and refreshes them from an environment
//! - `detect_missing_dependencies` - Dependency check against any component source
//! - `ReleaseLedger` - Durable release records, publication and tags
//! - `PendingUseCase` - Components not yet covered by the latest release
//! - `DeployUseCase` - The deployment pipeline, release redeploys and promotions
//! - `RollbackUseCase` - Commit rollback and rollback redeploy

pub mod component_store;
pub mod context;
pub mod dependency_check;
pub mod deploy;
pub mod ledger;
pub mod pending;
pub mod rollback;

#[cfg(test)]
pub(crate) mod testing;

pub use component_store::{
    ComponentStore, ExportBatching, RecordSummary, RefreshReport, StoredComponents,
};
pub use context::ReleaseContext;
pub use dependency_check::detect_missing_dependencies;
pub use deploy::{
    DeployOptions, DeployResult, DeployUseCase, PromoteOptions, PromoteResult, RedeployOptions,
};
pub use ledger::ReleaseLedger;
pub use pending::PendingUseCase;
pub use rollback::{RollbackOptions, RollbackUseCase};
