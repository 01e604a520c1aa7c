//! Dependency check use case

use tracing::warn;

use crate::domain::entities::{
    ComponentRef, ComponentSelection, DependencyReport, MaterializedComponent,
};
use crate::domain::ports::ComponentSource;
use crate::domain::services::DependencyResolver;
use crate::error::{ReleaseError, ReleaseResult};

/// Report the dependencies `selection` references but does not include
///
/// Selected components the source has no body for are skipped with a
/// warning; they contribute no edges.
pub fn detect_missing_dependencies(
    resolver: &DependencyResolver,
    selection: &ComponentSelection,
    source: &dyn ComponentSource,
) -> ReleaseResult<DependencyReport> {
    selection.validate().map_err(ReleaseError::Validation)?;
    let components = source.materialize(selection)?;
    unmaterialized(selection, &components);
    Ok(resolver.resolve(selection, &components))
}

/// Selected components without a body in `components`, each logged as skipped
pub(crate) fn unmaterialized(
    selection: &ComponentSelection,
    components: &[MaterializedComponent],
) -> Vec<ComponentRef> {
    selection
        .components()
        .filter(|wanted| !components.iter().any(|c| c.reference == *wanted))
        .inspect(|wanted| {
            warn!(component = %wanted, "no materialized body, skipping dependency extraction");
        })
        .collect()
}
