//! EnvironmentLocks port - serializes mutating operations per environment

use super::store_error::StoreError;

/// Held lock; released on drop
pub struct EnvironmentGuard {
    alias: String,
    _held: Box<dyn Send>,
}

impl EnvironmentGuard {
    pub fn new(alias: impl Into<String>, held: impl Send + 'static) -> Self {
        Self {
            alias: alias.into(),
            _held: Box::new(held),
        }
    }
}

impl std::fmt::Debug for EnvironmentGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentGuard")
            .field("alias", &self.alias)
            .finish_non_exhaustive()
    }
}

pub trait EnvironmentLocks: Send + Sync {
    /// Block until the environment is free or the configured deadline passes
    fn acquire(&self, alias: &str) -> Result<EnvironmentGuard, StoreError>;
}
