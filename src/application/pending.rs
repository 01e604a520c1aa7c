//! Pending view use case

use std::sync::Arc;

use crate::domain::entities::KindMap;
use crate::domain::ports::ComponentRepository;
use crate::domain::services::{compute_pending, PendingComponent};
use crate::error::ReleaseResult;

use super::ledger::ReleaseLedger;

/// Components of an environment not yet covered by its latest release
pub struct PendingUseCase {
    components: Arc<dyn ComponentRepository>,
    ledger: ReleaseLedger,
}

impl PendingUseCase {
    pub fn new(components: Arc<dyn ComponentRepository>, ledger: ReleaseLedger) -> Self {
        Self { components, ledger }
    }

    pub fn compute_pending(&self, alias: &str) -> ReleaseResult<KindMap<Vec<PendingComponent>>> {
        let index = self.components.load_index(alias)?;
        let latest = self.ledger.latest_release(alias)?;
        Ok(compute_pending(&index, latest.as_ref()))
    }
}
