//! Component selection entity
//!
//! The set of components an operator picked for validation or deployment,
//! grouped by kind.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::kind_map::KindMap;
use crate::domain::value_objects::ComponentKind;

/// Reference to a single component by kind and name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentRef {
    pub kind: ComponentKind,
    pub name: String,
}

impl ComponentRef {
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Selected component names per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentSelection(KindMap<BTreeSet<String>>);

impl ComponentSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures
    pub fn with(mut self, kind: ComponentKind, name: impl Into<String>) -> Self {
        self.insert(kind, name);
        self
    }

    /// Add a component; returns false if it was already selected
    pub fn insert(&mut self, kind: ComponentKind, name: impl Into<String>) -> bool {
        self.0.entry_or_default(kind).insert(name.into())
    }

    pub fn contains(&self, kind: &ComponentKind, name: &str) -> bool {
        self.0.get(kind).is_some_and(|names| names.contains(name))
    }

    /// Names selected under `kind`
    pub fn names(&self, kind: &ComponentKind) -> impl Iterator<Item = &str> {
        self.0
            .get(kind)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentKind, &BTreeSet<String>)> {
        self.0.iter().filter(|(_, names)| !names.is_empty())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ComponentKind> {
        self.iter().map(|(kind, _)| kind)
    }

    /// Every selected component, ordered by kind then name
    pub fn components(&self) -> impl Iterator<Item = ComponentRef> + '_ {
        self.iter().flat_map(|(kind, names)| {
            names
                .iter()
                .map(move |name| ComponentRef::new(kind.clone(), name.clone()))
        })
    }

    /// Total number of selected components
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-kind set union with `other`; returns how many components were new
    pub fn merge(&mut self, other: &ComponentSelection) -> usize {
        let mut added = 0;
        for (kind, names) in other.iter() {
            let target = self.0.entry_or_default(kind.clone());
            for name in names {
                if target.insert(name.clone()) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Only the OmniStudio part of the selection
    pub fn omni_only(&self) -> ComponentSelection {
        self.filter_kinds(|kind| !kind.is_metadata())
    }

    /// Only the metadata part of the selection
    pub fn metadata_only(&self) -> ComponentSelection {
        self.filter_kinds(ComponentKind::is_metadata)
    }

    fn filter_kinds(&self, keep: impl Fn(&ComponentKind) -> bool) -> ComponentSelection {
        ComponentSelection(
            self.iter()
                .filter(|&(kind, _)| keep(kind))
                .map(|(kind, names)| (kind.clone(), names.clone()))
                .collect(),
        )
    }

    /// Split into selections of at most `size` components each
    pub fn chunks(&self, size: usize) -> Vec<ComponentSelection> {
        let size = size.max(1);
        let mut chunks = Vec::new();
        let mut current = ComponentSelection::new();
        for component in self.components() {
            current.insert(component.kind, component.name);
            if current.len() == size {
                chunks.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    /// Reject names that cannot be used as bundle directory names
    pub fn validate(&self) -> Result<(), String> {
        for component in self.components() {
            let name = component.name.as_str();
            if name.trim().is_empty() {
                return Err(format!("empty component name under {}", component.kind));
            }
            if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
                return Err(format!("invalid component name '{}'", component));
            }
        }
        Ok(())
    }
}

impl FromIterator<ComponentRef> for ComponentSelection {
    fn from_iter<I: IntoIterator<Item = ComponentRef>>(iter: I) -> Self {
        let mut selection = ComponentSelection::new();
        for component in iter {
            selection.insert(component.kind, component.name);
        }
        selection
    }
}
