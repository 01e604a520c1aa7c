//! Domain Layer
//!
//! Change tracking and release bookkeeping without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Component index, selections, releases, rollback history
//! - `value_objects/` - Immutable value types (ComponentKind, Fingerprint, ReleaseId)
//! - `services/` - Dependency resolution and the pending-components filter
//! - `ports/` - Traits for the exporter, deployer, git store, repositories and clock
//!
//! Nothing here spawns a process or opens a file; time comes from the
//! `Clock` port so timestamps are reproducible in tests.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
