//! omnirelease - change tracking and release lifecycle for OmniStudio
//!
//! Tracks the configuration components of Salesforce OmniStudio environments,
//! validates that a selection carries its dependencies, deploys it to target
//! environments, and records every release in a git-backed ledger that
//! supports rollback, redeploy and promotion.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use config::Config;
pub use error::{ErrorCategory, ReleaseError, ReleaseResult};
