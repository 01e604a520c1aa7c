//! Component Store Use Case
//!
//! Records component bodies per environment and keeps the modification
//! timestamps the Visibility Filter compares against releases. Refresh pulls
//! every available component out of the source environment first and only
//! then writes the store, so a failed export leaves the index untouched.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::entities::{
    ComponentBody, ComponentIndex, ComponentRecord, ComponentSelection, KindMap,
    MaterializedComponent, RecordOutcome,
};
use crate::domain::ports::{
    Clock, ComponentRepository, ComponentSource, ExportReport, Exporter, StoreError, ToolError,
};
use crate::domain::value_objects::ComponentKind;
use crate::error::{ReleaseError, ReleaseResult};

/// How many components were created, modified or left alone by a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub created: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl RecordSummary {
    fn count(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Created => self.created += 1,
            RecordOutcome::Modified => self.modified += 1,
            RecordOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

/// Chunking of a refresh export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportBatching {
    pub batch_size: usize,
    pub parallelism: usize,
}

impl Default for ExportBatching {
    fn default() -> Self {
        Self {
            batch_size: 50,
            parallelism: 2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshReport {
    pub available: usize,
    pub exported: usize,
    pub recorded: RecordSummary,
    pub warnings: Vec<String>,
}

pub struct ComponentStore {
    repository: Arc<dyn ComponentRepository>,
    clock: Arc<dyn Clock>,
}

impl ComponentStore {
    pub fn new(repository: Arc<dyn ComponentRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Record one component body
    ///
    /// Unchanged bodies are not written back, so `modified_at` only moves
    /// when the fingerprint does.
    pub fn record_component(
        &self,
        alias: &str,
        kind: ComponentKind,
        name: &str,
        body: ComponentBody,
    ) -> ReleaseResult<ComponentRecord> {
        let mut index = self.repository.load_index(alias)?;
        let (outcome, record) = index.record(kind.clone(), name, body, self.clock.now());
        let record = record.clone();
        if outcome.is_write() {
            self.repository.save_kind(alias, &kind, &index)?;
        }
        debug!(alias, component = %kind, name, ?outcome, "recorded component");
        Ok(record)
    }

    /// Record a batch, writing each touched kind file once
    pub fn record_all(
        &self,
        alias: &str,
        components: impl IntoIterator<Item = MaterializedComponent>,
    ) -> ReleaseResult<RecordSummary> {
        self.record_all_at(alias, components, self.clock.now())
    }

    /// [`record_all`](Self::record_all) with an explicit observation time
    pub fn record_all_at(
        &self,
        alias: &str,
        components: impl IntoIterator<Item = MaterializedComponent>,
        now: DateTime<Utc>,
    ) -> ReleaseResult<RecordSummary> {
        let mut index = self.repository.load_index(alias)?;
        let mut summary = RecordSummary::default();
        let mut touched = BTreeSet::new();

        for component in components {
            let MaterializedComponent { reference, body } = component;
            let (outcome, _) = index.record(reference.kind.clone(), &reference.name, body, now);
            if outcome.is_write() {
                touched.insert(reference.kind);
            }
            summary.count(outcome);
        }

        for kind in &touched {
            self.repository.save_kind(alias, kind, &index)?;
        }
        Ok(summary)
    }

    /// Snapshot of every stored record, grouped by kind
    pub fn get_index(&self, alias: &str) -> ReleaseResult<KindMap<Vec<ComponentRecord>>> {
        Ok(self.load(alias)?.snapshot())
    }

    pub fn load(&self, alias: &str) -> ReleaseResult<ComponentIndex> {
        Ok(self.repository.load_index(alias)?)
    }

    /// Export everything the source environment has and record it
    pub fn refresh(
        &self,
        alias: &str,
        exporter: &dyn Exporter,
        batching: ExportBatching,
    ) -> ReleaseResult<RefreshReport> {
        let available = exporter.list_available(alias)?;
        info!(alias, components = available.len(), "refreshing component store");
        if available.is_empty() {
            return Ok(RefreshReport::default());
        }

        let scratch = tempfile::Builder::new()
            .prefix("omnirelease-refresh-")
            .tempdir()
            .map_err(|e| ReleaseError::ExternalTool {
                tool: "export".to_string(),
                detail: format!("cannot create scratch directory: {e}"),
            })?;

        let chunks = available.chunks(batching.batch_size);
        let mut reports = Vec::with_capacity(chunks.len());
        for (wave_index, wave) in chunks.chunks(batching.parallelism.max(1)).enumerate() {
            let results: Vec<Result<ExportReport, ToolError>> = thread::scope(|scope| {
                let handles: Vec<_> = wave
                    .iter()
                    .enumerate()
                    .map(|(i, chunk)| {
                        let dest = scratch.path().join(format!("chunk-{wave_index}-{i}"));
                        scope.spawn(move || exporter.export(alias, chunk, &dest))
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle.join().unwrap_or_else(|_| {
                            Err(ToolError::output("export", "export worker panicked"))
                        })
                    })
                    .collect()
            });
            for result in results {
                reports.push(result?);
            }
            debug!(alias, wave = wave_index, "export wave finished");
        }

        let mut report = RefreshReport {
            available: available.len(),
            ..RefreshReport::default()
        };
        let mut components = Vec::new();
        for chunk_report in reports {
            report.warnings.extend(chunk_report.warnings);
            components.extend(chunk_report.components);
        }
        report.exported = components.len();
        report.recorded = self.record_all(alias, components)?;
        info!(
            alias,
            created = report.recorded.created,
            modified = report.recorded.modified,
            "refresh complete"
        );
        Ok(report)
    }
}

/// Last-known bodies of an environment's index as a [`ComponentSource`]
pub struct StoredComponents<'a> {
    index: &'a ComponentIndex,
}

impl<'a> StoredComponents<'a> {
    pub fn new(index: &'a ComponentIndex) -> Self {
        Self { index }
    }
}

impl ComponentSource for StoredComponents<'_> {
    fn materialize(
        &self,
        selection: &ComponentSelection,
    ) -> Result<Vec<MaterializedComponent>, StoreError> {
        Ok(selection
            .components()
            .filter_map(|component| {
                self.index
                    .get(&component.kind, &component.name)
                    .map(|record| MaterializedComponent {
                        body: record.last_known_body.clone(),
                        reference: component,
                    })
            })
            .collect())
    }
}
