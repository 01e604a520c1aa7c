//! Salesforce toolchain
//!
//! Routes each half of a selection to the tool that owns it: OmniStudio kinds
//! go through `vlocity`, regular metadata through `sf`. Authentication always
//! goes through `sf`.

use std::path::Path;

use super::bundle::BundleSource;
use super::salesforce::SfCli;
use super::vlocity::VlocityCli;
use crate::domain::entities::ComponentSelection;
use crate::domain::ports::{
    Authenticator, ComponentSource, DeployOutcome, Deployer, ExportReport, Exporter, ToolError,
};

pub struct SalesforceToolchain {
    vlocity: VlocityCli,
    sf: SfCli,
    metadata_types: Vec<String>,
}

impl SalesforceToolchain {
    pub fn new(vlocity: VlocityCli, sf: SfCli, metadata_types: Vec<String>) -> Self {
        Self {
            vlocity,
            sf,
            metadata_types,
        }
    }
}

impl Authenticator for SalesforceToolchain {
    fn authenticate(&self, alias: &str) -> Result<(), ToolError> {
        self.sf.authenticate(alias)
    }
}

impl Exporter for SalesforceToolchain {
    fn list_available(&self, alias: &str) -> Result<ComponentSelection, ToolError> {
        let mut available = self.sf.list_omni(alias)?;
        available.merge(&self.sf.list_metadata(alias, &self.metadata_types)?);
        Ok(available)
    }

    fn export(
        &self,
        alias: &str,
        selection: &ComponentSelection,
        dest: &Path,
    ) -> Result<ExportReport, ToolError> {
        let mut warnings = Vec::new();
        let omni = selection.omni_only();
        if !omni.is_empty() {
            warnings.extend(self.vlocity.export(alias, &omni, dest)?);
        }
        let metadata = selection.metadata_only();
        if !metadata.is_empty() {
            self.sf.retrieve(alias, &metadata, dest)?;
        }

        let components = BundleSource::new(dest)
            .materialize(selection)
            .map_err(|e| ToolError::output("export", e))?;
        for missing in selection
            .components()
            .filter(|c| !components.iter().any(|m| m.reference == *c))
        {
            warnings.push(format!("{missing} was not exported"));
        }
        Ok(ExportReport {
            components,
            warnings,
        })
    }
}

impl Deployer for SalesforceToolchain {
    fn deploy(
        &self,
        alias: &str,
        bundle_dir: &Path,
        selection: &ComponentSelection,
    ) -> Result<DeployOutcome, ToolError> {
        let mut outcomes = Vec::new();
        let omni = selection.omni_only();
        if !omni.is_empty() {
            outcomes.push(self.vlocity.deploy(alias, bundle_dir, &omni)?);
        }
        let metadata = selection.metadata_only();
        if !metadata.is_empty() {
            outcomes.push(self.sf.deploy(alias, bundle_dir, &metadata)?);
        }
        Ok(combine(outcomes))
    }
}

fn combine(outcomes: Vec<DeployOutcome>) -> DeployOutcome {
    let mut combined = DeployOutcome::success("");
    let mut logs = Vec::new();
    for outcome in outcomes {
        combined.succeeded &= outcome.succeeded;
        combined.warnings.extend(outcome.warnings);
        if !outcome.raw_log.is_empty() {
            logs.push(outcome.raw_log);
        }
    }
    combined.raw_log = logs.join("\n");
    combined
}
