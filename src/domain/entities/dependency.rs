//! Dependency edges and the resolver's report

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::kind_map::KindMap;
use super::selection::ComponentRef;

/// Directed reference from one component to another it relies on
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyEdge {
    pub source: ComponentRef,
    pub target: ComponentRef,
}

impl DependencyEdge {
    pub fn new(source: ComponentRef, target: ComponentRef) -> Self {
        Self { source, target }
    }
}

/// Outcome of a dependency check
///
/// - `missing`: dependency kind -> owner name -> dependency names not selected
/// - `all`: owner kind -> owner name -> dependency kind -> dependency names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub missing: KindMap<BTreeMap<String, BTreeSet<String>>>,
    pub all: KindMap<BTreeMap<String, KindMap<BTreeSet<String>>>>,
}

impl DependencyReport {
    /// Record an edge; `selected` says whether its target is in the selection
    pub fn add_edge(&mut self, edge: &DependencyEdge, selected: bool) {
        self.all
            .entry_or_default(edge.source.kind.clone())
            .entry(edge.source.name.clone())
            .or_default()
            .entry_or_default(edge.target.kind.clone())
            .insert(edge.target.name.clone());

        if !selected {
            self.missing
                .entry_or_default(edge.target.kind.clone())
                .entry(edge.source.name.clone())
                .or_default()
                .insert(edge.target.name.clone());
        }
    }

    pub fn has_missing(&self) -> bool {
        self.missing_count() > 0
    }

    /// Number of distinct (dependency kind, owner, dependency) triples missing
    pub fn missing_count(&self) -> usize {
        self.missing
            .values()
            .flat_map(|owners| owners.values())
            .map(BTreeSet::len)
            .sum()
    }

    /// Missing dependencies as component references (deduplicated across owners)
    pub fn missing_components(&self) -> BTreeSet<ComponentRef> {
        self.missing
            .iter()
            .flat_map(|(kind, owners)| {
                owners
                    .values()
                    .flatten()
                    .map(move |name| ComponentRef::new(kind.clone(), name.clone()))
            })
            .collect()
    }
}
