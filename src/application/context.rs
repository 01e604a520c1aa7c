//! Port bundle handed to the use cases by the composition root

use std::sync::Arc;

use crate::domain::ports::{
    Authenticator, Clock, ComponentRepository, Deployer, EnvironmentLocks, Exporter,
    ReleaseRepository, RollbackRepository, VersionStore,
};

use super::component_store::ComponentStore;
use super::ledger::ReleaseLedger;

#[derive(Clone)]
pub struct ReleaseContext {
    pub components: Arc<dyn ComponentRepository>,
    pub releases: Arc<dyn ReleaseRepository>,
    pub rollbacks: Arc<dyn RollbackRepository>,
    pub exporter: Arc<dyn Exporter>,
    pub deployer: Arc<dyn Deployer>,
    pub authenticator: Arc<dyn Authenticator>,
    pub version_store: Arc<dyn VersionStore>,
    pub locks: Arc<dyn EnvironmentLocks>,
    pub clock: Arc<dyn Clock>,
    /// Tree-relative directory components are exported into
    pub bundle_dir: String,
    /// Tree-relative directory release files are published to
    pub releases_dir: String,
}

impl ReleaseContext {
    pub fn component_store(&self) -> ComponentStore {
        ComponentStore::new(self.components.clone(), self.clock.clone())
    }

    pub fn ledger(&self) -> ReleaseLedger {
        ReleaseLedger::new(self.releases.clone(), self.releases_dir.clone())
    }
}
