//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod component_kind;
mod fingerprint;
mod release_id;
mod timestamp;

pub use component_kind::{ComponentKind, METADATA_KEY};
pub use fingerprint::Fingerprint;
pub use release_id::ReleaseId;
pub use timestamp::Timestamp;
