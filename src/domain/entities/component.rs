//! Component entities
//!
//! The component index is the change-tracking core: it keeps the last-known
//! body of every component of one source environment, and moves a component's
//! `modified_at` only when its fingerprint changes.
//! It's a pure data structure - I/O operations are handled by ComponentRepository.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kind_map::KindMap;
use super::selection::ComponentRef;
use crate::domain::value_objects::{ComponentKind, Fingerprint, Timestamp};

/// Serialized body of a component: its main document plus per-step files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBody {
    pub document: Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub steps: BTreeMap<String, Value>,
}

impl ComponentBody {
    pub fn new(document: Value) -> Self {
        Self {
            document,
            steps: BTreeMap::new(),
        }
    }

    pub fn with_step(mut self, name: impl Into<String>, config: Value) -> Self {
        self.steps.insert(name.into(), config);
        self
    }

    /// Deterministic content fingerprint
    pub fn fingerprint(&self) -> Fingerprint {
        let mut value = serde_json::Map::new();
        value.insert("document".to_string(), self.document.clone());
        if !self.steps.is_empty() {
            value.insert(
                "steps".to_string(),
                Value::Object(self.steps.clone().into_iter().collect()),
            );
        }
        Fingerprint::of_json(&Value::Object(value))
    }
}

/// A component body read from an export or from the store
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedComponent {
    pub reference: ComponentRef,
    pub body: ComponentBody,
}

impl MaterializedComponent {
    pub fn new(kind: ComponentKind, name: impl Into<String>, body: ComponentBody) -> Self {
        Self {
            reference: ComponentRef::new(kind, name),
            body,
        }
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.reference.kind
    }

    pub fn name(&self) -> &str {
        &self.reference.name
    }
}

/// Tracked state of one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub name: String,
    pub fingerprint: Fingerprint,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub last_known_body: ComponentBody,
}

/// What `ComponentIndex::record` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Created,
    Modified,
    Unchanged,
}

impl RecordOutcome {
    /// True if the stored record changed and must be persisted
    pub fn is_write(&self) -> bool {
        !matches!(self, RecordOutcome::Unchanged)
    }
}

/// All tracked components of one source environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentIndex {
    records: KindMap<BTreeMap<String, ComponentRecord>>,
}

impl ComponentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the records of one kind (used when loading from storage)
    pub fn set_kind(&mut self, kind: ComponentKind, records: BTreeMap<String, ComponentRecord>) {
        if records.is_empty() {
            self.records.remove(&kind);
        } else {
            self.records.insert(kind, records);
        }
    }

    pub fn kind_records(&self, kind: &ComponentKind) -> Option<&BTreeMap<String, ComponentRecord>> {
        self.records.get(kind)
    }

    pub fn get(&self, kind: &ComponentKind, name: &str) -> Option<&ComponentRecord> {
        self.records.get(kind).and_then(|records| records.get(name))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ComponentKind> {
        self.records.kinds()
    }

    pub fn len(&self) -> usize {
        self.records.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record the current body of a component observed at `now`.
    ///
    /// - unknown component: `created_at = modified_at = now`
    /// - fingerprint changed: body and fingerprint replaced, `modified_at`
    ///   advanced to `now` (never backwards), `created_at` kept
    /// - fingerprint unchanged: nothing changes
    pub fn record(
        &mut self,
        kind: ComponentKind,
        name: &str,
        body: ComponentBody,
        now: DateTime<Utc>,
    ) -> (RecordOutcome, &ComponentRecord) {
        let fingerprint = body.fingerprint();
        let records = self.records.entry_or_default(kind);

        let outcome = match records.get_mut(name) {
            None => {
                records.insert(
                    name.to_string(),
                    ComponentRecord {
                        name: name.to_string(),
                        fingerprint,
                        created_at: Timestamp::from(now),
                        modified_at: Timestamp::from(now),
                        last_known_body: body,
                    },
                );
                RecordOutcome::Created
            }
            Some(existing) if existing.fingerprint != fingerprint => {
                let advanced = match existing.modified_at.parse() {
                    Some(previous) if previous > now => previous,
                    _ => now,
                };
                existing.fingerprint = fingerprint;
                existing.modified_at = Timestamp::from(advanced);
                existing.last_known_body = body;
                RecordOutcome::Modified
            }
            Some(_) => RecordOutcome::Unchanged,
        };

        let record = &records[name];
        (outcome, record)
    }

    /// Snapshot of every record, grouped by kind and ordered by name
    pub fn snapshot(&self) -> KindMap<Vec<ComponentRecord>> {
        self.records
            .iter()
            .map(|(kind, records)| (kind.clone(), records.values().cloned().collect()))
            .collect()
    }
}
