//! Vlocity Build Tool adapter
//!
//! OmniStudio components are exported and deployed as DataPacks by running
//! `vlocity` with a generated job file.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::domain::entities::ComponentSelection;
use crate::domain::ports::{DeployOutcome, ToolError};
use crate::infrastructure::process::{clean_diagnostics, CommandOutput, ProcessRunner};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VlocityJob {
    project_path: String,
    expansion_path: String,
    manifest: Vec<String>,
    /// 0 keeps referenced components out of the export
    max_depth: i32,
    continue_after_error: bool,
    compile_on_build: bool,
    auto_update_settings: bool,
}

#[derive(Debug, Deserialize)]
struct VlocityResult {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    records: Vec<VlocityRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VlocityRecord {
    #[serde(default)]
    vlocity_data_pack_key: Option<String>,
    #[serde(default)]
    vlocity_data_pack_status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

impl VlocityRecord {
    fn describe(&self) -> String {
        let key = self.vlocity_data_pack_key.as_deref().unwrap_or("unknown DataPack");
        match &self.error_message {
            Some(message) => format!("{key}: {message}"),
            None => format!(
                "{key}: {}",
                self.vlocity_data_pack_status.as_deref().unwrap_or("no status")
            ),
        }
    }

    fn status(&self) -> &str {
        self.vlocity_data_pack_status.as_deref().unwrap_or("Success")
    }
}

pub struct VlocityCli {
    binary: PathBuf,
    runner: ProcessRunner,
}

impl VlocityCli {
    pub fn new(binary: impl Into<PathBuf>, runner: ProcessRunner) -> Self {
        Self {
            binary: binary.into(),
            runner,
        }
    }

    /// Export the OmniStudio part of `selection` into `dest`
    pub fn export(
        &self,
        alias: &str,
        selection: &ComponentSelection,
        dest: &Path,
    ) -> Result<Vec<String>, ToolError> {
        let output = self.run_job(alias, "packExport", selection, dest)?;
        let parsed = parse_result(&output);
        if !output.success() {
            return Err(ToolError::failed("vlocity packExport", output.status, output.diagnostics()));
        }

        let Some(result) = parsed else {
            return Ok(Vec::new());
        };
        let errors: Vec<String> = result
            .records
            .iter()
            .filter(|r| r.status() == "Error")
            .map(VlocityRecord::describe)
            .collect();
        if result.status == "error" || !errors.is_empty() {
            let mut detail = errors;
            detail.extend(result.message);
            return Err(ToolError::failed("vlocity packExport", "status error", detail.join("\n")));
        }
        Ok(result.message.into_iter().collect())
    }

    /// Deploy the OmniStudio part of `selection` from the bundle at `bundle_dir`
    pub fn deploy(
        &self,
        alias: &str,
        bundle_dir: &Path,
        selection: &ComponentSelection,
    ) -> Result<DeployOutcome, ToolError> {
        let output = self.run_job(alias, "packDeploy", selection, bundle_dir)?;
        let raw_log = clean_diagnostics(&output.combined());

        let Some(result) = parse_result(&output) else {
            return Ok(DeployOutcome {
                succeeded: output.success(),
                warnings: Vec::new(),
                raw_log,
            });
        };

        let failed = result.records.iter().any(|r| r.status() == "Error");
        let warnings = result
            .records
            .iter()
            .filter(|r| !matches!(r.status(), "Success" | "Error"))
            .map(VlocityRecord::describe)
            .collect();
        Ok(DeployOutcome {
            succeeded: output.success() && result.status == "success" && !failed,
            warnings,
            raw_log,
        })
    }

    fn run_job(
        &self,
        alias: &str,
        verb: &str,
        selection: &ComponentSelection,
        project: &Path,
    ) -> Result<CommandOutput, ToolError> {
        let tool = format!("vlocity {verb}");
        let job = VlocityJob {
            project_path: project.to_string_lossy().into_owned(),
            expansion_path: ".".to_string(),
            manifest: manifest(selection),
            max_depth: 0,
            continue_after_error: true,
            compile_on_build: true,
            auto_update_settings: true,
        };
        let yaml = serde_yaml_ng::to_string(&job).map_err(|e| ToolError::output(&tool, e))?;

        // vlocity drops scratch files into its working directory
        let scratch = tempfile::tempdir().map_err(|e| ToolError::Launch {
            tool: tool.clone(),
            message: e.to_string(),
        })?;
        let job_file = scratch.path().join("job.yaml");
        std::fs::write(&job_file, yaml).map_err(|e| ToolError::Launch {
            tool: tool.clone(),
            message: e.to_string(),
        })?;

        tracing::info!(alias, verb, components = selection.len(), "running vlocity");
        let mut command = Command::new(&self.binary);
        command
            .current_dir(scratch.path())
            .arg("-sfdx.username")
            .arg(alias)
            .arg("-job")
            .arg(&job_file)
            .arg(verb)
            .arg("--json")
            .arg("--nojob");
        self.runner.run(&tool, &mut command)
    }
}

/// `VlocityCard/CaseView` style manifest entries
fn manifest(selection: &ComponentSelection) -> Vec<String> {
    selection
        .components()
        .filter_map(|c| {
            c.kind
                .datapack_type()
                .map(|datapack| format!("{datapack}/{}", c.name))
        })
        .collect()
}

/// The JSON result object, located anywhere in stdout
fn parse_result(output: &CommandOutput) -> Option<VlocityResult> {
    let text = output.stdout_text();
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    serde_json::from_str(text.get(start..=end)?).ok()
}
