//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Atomic persistence helpers and home directory resolution
//! - `repositories/` - JSON repositories for components, releases and rollbacks
//! - `tools/` - vlocity and sf adapters, bundle reader
//! - `git` - versioned object store
//! - `locks` - per-environment file locks
//! - `process` - external process execution with deadlines

pub mod fs;
pub mod git;
pub mod locks;
pub mod process;
pub mod repositories;
pub mod tools;

pub use git::{GitIdentity, GitStore, GitTree};
pub use locks::FileEnvironmentLocks;
pub use process::{CancelFlag, ProcessRunner};
pub use repositories::{
    JsonComponentRepository, JsonReleaseRepository, JsonRollbackRepository, StateLayout,
};
pub use tools::{BundleSource, SalesforceToolchain, SfCli, VlocityCli};
