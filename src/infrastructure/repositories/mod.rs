//! Repository Implementations
//!
//! JSON-file implementations of the durable state ports.

mod components;
mod layout;
mod releases;
mod rollbacks;

pub use components::JsonComponentRepository;
pub use layout::StateLayout;
pub use releases::JsonReleaseRepository;
pub use rollbacks::JsonRollbackRepository;
