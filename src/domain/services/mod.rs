//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod dependency_resolver;
mod visibility;

pub use dependency_resolver::{
    DependencyResolver, EdgeRule, FlexCardDataSourceRule, ProcedureStepRule, RelationshipListRule,
};
pub use visibility::{compute_pending, PendingComponent};
