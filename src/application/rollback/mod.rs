//! Rollback Use Case
//!
//! Rolls a deployed commit back out of a release branch and restores it later.
//!
//! This module handles:
//! - Backing up the files a commit added or changed before deleting them
//! - Recording rollbacks and redeploys in the per-environment history
//! - Restoring backed-up files from the snapshot

mod options;
mod use_case;

pub use options::RollbackOptions;
pub use use_case::RollbackUseCase;
