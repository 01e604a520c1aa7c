//! Deploy Use Case
//!
//! Orchestrates a release:
//! 1. Lock the source environment and authenticate every environment involved
//! 2. Check out the release branch in an ephemeral tree
//! 3. Export the selection into the bundle directory
//! 4. Resolve dependencies against the exported bodies
//! 5. Record the exported components
//! 6. Deploy to each target and log the outcome
//! 7. Write the ledger record, publishing it only when every target succeeded
//!
//! Redeploying a release reruns the same flow under the recorded id.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::application::component_store::ComponentStore;
use crate::application::context::ReleaseContext;
use crate::application::dependency_check::unmaterialized;
use crate::application::ledger::ReleaseLedger;
use crate::domain::entities::{ComponentSelection, DeployStatus, DeploymentLogEntry, ReleaseRecord};
use crate::domain::ports::{
    Authenticator, Clock, Deployer, EnvironmentLocks, Exporter, StoreError, VersionStore,
};
use crate::domain::services::DependencyResolver;
use crate::error::{ReleaseError, ReleaseResult};

use super::options::{require_name, DeployOptions, PromoteOptions, RedeployOptions};
use super::result::{DeployResult, PromoteResult};

pub struct DeployUseCase {
    store: ComponentStore,
    ledger: ReleaseLedger,
    exporter: Arc<dyn Exporter>,
    deployer: Arc<dyn Deployer>,
    authenticator: Arc<dyn Authenticator>,
    version_store: Arc<dyn VersionStore>,
    locks: Arc<dyn EnvironmentLocks>,
    clock: Arc<dyn Clock>,
    resolver: DependencyResolver,
    bundle_dir: String,
}

impl DeployUseCase {
    pub fn new(context: &ReleaseContext) -> Self {
        Self {
            store: context.component_store(),
            ledger: context.ledger(),
            exporter: context.exporter.clone(),
            deployer: context.deployer.clone(),
            authenticator: context.authenticator.clone(),
            version_store: context.version_store.clone(),
            locks: context.locks.clone(),
            clock: context.clock.clone(),
            resolver: DependencyResolver::new(),
            bundle_dir: context.bundle_dir.clone(),
        }
    }

    /// Deploy a selection as a new release
    pub fn execute(&self, options: &DeployOptions) -> ReleaseResult<DeployResult> {
        options.validate()?;
        let _guard = self.locks.acquire(&options.source_alias)?;

        let deployed_at = self.clock.now();
        let release_id = self
            .ledger
            .next_release_id(&options.source_alias, deployed_at)?;
        info!(
            release = %release_id,
            source = %options.source_alias,
            components = options.selection.len(),
            "starting release"
        );
        let record = ReleaseRecord {
            release_id,
            release_name: options.release_name.clone(),
            deployed_at,
            deployed_by: options.actor.clone(),
            source_environment_alias: options.source_alias.clone(),
            target_branch: options.branch.clone(),
            component_selection: options.selection.clone(),
            deployment_log: Vec::new(),
        };
        self.run(record, &options.targets, options.allow_missing)
    }

    /// Rerun a recorded release with extra components under the same id
    ///
    /// Targets are the environments the release was deployed to before.
    pub fn redeploy_release(&self, options: &RedeployOptions) -> ReleaseResult<DeployResult> {
        options
            .additional
            .validate()
            .map_err(ReleaseError::Validation)?;
        let _guard = self.locks.acquire(&options.source_alias)?;

        let mut record = self
            .ledger
            .get_release(&options.source_alias, &options.release_id)?;
        let targets = record.targets();
        if targets.is_empty() {
            return Err(ReleaseError::Validation(format!(
                "release {} has no recorded targets",
                record.release_id
            )));
        }
        let added = record.component_selection.merge(&options.additional);
        info!(release = %record.release_id, added, "redeploying release");

        record.deployed_at = self.clock.now();
        record.deployed_by = options.actor.clone();
        self.run(record, &targets, options.allow_missing)
    }

    /// Deploy a recorded release, as tagged, to one more environment
    pub fn promote_release(&self, options: &PromoteOptions) -> ReleaseResult<PromoteResult> {
        require_name("target environment", &options.target)?;
        let _guard = self.locks.acquire(&options.source_alias)?;

        let mut record = self
            .ledger
            .get_release(&options.source_alias, &options.release_id)?;
        self.authenticator.authenticate(&options.target)?;

        let tag = record.release_id.as_str();
        let mut tree = self.version_store.clone_tree()?;
        if tree.resolve_revision(tag)?.is_none() {
            return Err(ReleaseError::not_found("release tag", tag));
        }
        tree.checkout_revision(tag)?;
        let bundle = tree.resolve(&self.bundle_dir)?;

        info!(release = tag, environment = %options.target, actor = %options.actor, "promoting release");
        let outcome = self.deploy_to(&options.target, &bundle, &record.component_selection);
        record.append_log(outcome.clone());
        self.ledger.save(&options.source_alias, &record)?;
        Ok(PromoteResult {
            release: record,
            outcome,
        })
    }

    fn run(
        &self,
        mut record: ReleaseRecord,
        targets: &[String],
        allow_missing: bool,
    ) -> ReleaseResult<DeployResult> {
        let alias = record.source_environment_alias.clone();
        self.authenticate_all(&alias, targets)?;

        let mut tree = self.version_store.clone_tree()?;
        tree.checkout(&record.target_branch)?;
        let bundle = tree.resolve(&self.bundle_dir)?;
        clear_exported(&bundle, &record.component_selection)?;

        let export = self
            .exporter
            .export(&alias, &record.component_selection, &bundle)?;
        for warning in &export.warnings {
            warn!(source = %alias, "{warning}");
        }

        let skipped = unmaterialized(&record.component_selection, &export.components);
        let dependencies = self
            .resolver
            .resolve(&record.component_selection, &export.components);
        if dependencies.has_missing() {
            if !allow_missing {
                return Err(ReleaseError::MissingDependencies(Box::new(dependencies)));
            }
            warn!(
                missing = dependencies.missing_count(),
                "deploying with missing dependencies"
            );
        }

        // bodies are stamped with the release instant
        let recorded = self
            .store
            .record_all_at(&alias, export.components, record.deployed_at)?;

        let log_start = record.deployment_log.len();
        for target in targets {
            let entry = self.deploy_to(target, &bundle, &record.component_selection);
            record.append_log(entry);
        }
        let published = record.succeeded_since(log_start);
        if !published {
            warn!(release = %record.release_id, "not every target succeeded, release stays unpublished");
        }
        let release_commit = self
            .ledger
            .create_release(&alias, tree.as_mut(), &record, published)?;

        Ok(DeployResult {
            outcomes: record.deployment_log[log_start..].to_vec(),
            release: record,
            published,
            release_commit,
            dependencies,
            recorded,
            export_warnings: export.warnings,
            skipped: skipped.iter().map(ToString::to_string).collect(),
        })
    }

    /// Source first, then each distinct target
    fn authenticate_all(&self, source: &str, targets: &[String]) -> ReleaseResult<()> {
        self.authenticator.authenticate(source)?;
        for target in targets.iter().filter(|t| t.as_str() != source) {
            self.authenticator.authenticate(target)?;
        }
        Ok(())
    }

    fn deploy_to(
        &self,
        target: &str,
        bundle: &Path,
        selection: &ComponentSelection,
    ) -> DeploymentLogEntry {
        let (status, details) = match self.deployer.deploy(target, bundle, selection) {
            Ok(outcome) if outcome.succeeded && outcome.warnings.is_empty() => {
                (DeployStatus::Success, outcome.raw_log)
            }
            Ok(outcome) if outcome.succeeded => {
                (DeployStatus::Warning, outcome.warnings.join("\n"))
            }
            Ok(outcome) => (DeployStatus::Error, outcome.raw_log),
            Err(e) => (DeployStatus::Error, e.to_string()),
        };
        if status.is_success() {
            info!(environment = target, status = status.as_str(), "deployment finished");
        } else {
            warn!(environment = target, %details, "deployment failed");
        }
        DeploymentLogEntry {
            target_alias: target.to_string(),
            timestamp: self.clock.now(),
            status,
            details,
        }
    }
}

/// Remove earlier exports of the selected DataPacks so deleted steps do not linger
fn clear_exported(bundle: &Path, selection: &ComponentSelection) -> Result<(), StoreError> {
    for component in selection.components() {
        let Some(dir) = component.kind.datapack_type() else {
            continue;
        };
        let path = bundle.join(dir).join(&component.name);
        match fs::remove_dir_all(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::write(path, e)),
        }
    }
    Ok(())
}
