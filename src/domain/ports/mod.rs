//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod clock;
pub mod component_source;
pub mod environment_locks;
pub mod repositories;
pub mod store_error;
pub mod tooling;
pub mod version_store;

pub use clock::{Clock, SystemClock};
pub use component_source::ComponentSource;
pub use environment_locks::{EnvironmentGuard, EnvironmentLocks};
pub use repositories::{ComponentRepository, ReleaseRepository, RollbackRepository};
pub use store_error::StoreError;
pub use tooling::{Authenticator, DeployOutcome, Deployer, ExportReport, Exporter, ToolError};
pub use version_store::{ChangeStatus, FileChange, VersionStore, WorkingTree};
