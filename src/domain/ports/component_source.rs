//! ComponentSource port - materialized component bodies for dependency checks

use super::store_error::StoreError;
use crate::domain::entities::{ComponentSelection, MaterializedComponent};

pub trait ComponentSource {
    /// Bodies of the selected components that exist in this source.
    ///
    /// Selected components without a body are left out, not reported as errors.
    fn materialize(
        &self,
        selection: &ComponentSelection,
    ) -> Result<Vec<MaterializedComponent>, StoreError>;
}
