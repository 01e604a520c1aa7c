//! Salesforce CLI adapter
//!
//! Authenticates environments, lists what an org holds, and moves regular
//! platform metadata in and out. `sf` needs a project directory for
//! retrieve/deploy, so each call works in a scratch project.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{json, Value};
use tempfile::TempDir;

use super::bundle::{file_name, files_under, name_prefix};
use crate::domain::entities::ComponentSelection;
use crate::domain::ports::{DeployOutcome, ToolError};
use crate::domain::value_objects::{ComponentKind, METADATA_KEY};
use crate::infrastructure::process::{clean_diagnostics, CommandOutput, ProcessRunner};

const PACKAGE_DIR: &str = "force-app";
const SOURCE_ROOT: &str = "force-app/main/default";

/// Active OmniStudio components per kind, and how their names are built
const OMNI_QUERIES: [(ComponentKind, &str, &[&str]); 4] = [
    (
        ComponentKind::FlexCard,
        "SELECT Name FROM OmniUiCard WHERE IsActive = true",
        &["Name"],
    ),
    (
        ComponentKind::OmniScript,
        "SELECT Type, SubType, Language FROM OmniProcess WHERE IsIntegrationProcedure = false AND IsActive = true",
        &["Type", "SubType", "Language"],
    ),
    (
        ComponentKind::IntegrationProcedure,
        "SELECT Type, SubType FROM OmniProcess WHERE IsIntegrationProcedure = true AND IsActive = true",
        &["Type", "SubType"],
    ),
    (
        ComponentKind::DataRaptor,
        "SELECT Name FROM OmniDataTransform WHERE IsActive = true",
        &["Name"],
    ),
];

pub struct SfCli {
    binary: PathBuf,
    runner: ProcessRunner,
    auth_url_files: BTreeMap<String, PathBuf>,
}

impl SfCli {
    pub fn new(
        binary: impl Into<PathBuf>,
        runner: ProcessRunner,
        auth_url_files: BTreeMap<String, PathBuf>,
    ) -> Self {
        Self {
            binary: binary.into(),
            runner,
            auth_url_files,
        }
    }

    fn sf(&self, tool: &str, args: &[&str], cwd: Option<&Path>) -> Result<(CommandOutput, Value), ToolError> {
        let mut command = Command::new(&self.binary);
        command.args(args).arg("--json").env("SF_DISABLE_COLORS", "true");
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        let output = self.runner.run(tool, &mut command)?;
        let value = parse_json(&output.stdout_text()).unwrap_or(Value::Null);
        Ok((output, value))
    }

    /// Run and require a zero exit plus `status: 0`
    fn sf_checked(&self, tool: &str, args: &[&str], cwd: Option<&Path>) -> Result<Value, ToolError> {
        let (output, value) = self.sf(tool, args, cwd)?;
        if output.success() && value.get("status").and_then(Value::as_i64).unwrap_or(0) == 0 {
            return Ok(value.get("result").cloned().unwrap_or(Value::Null));
        }
        Err(ToolError::failed(tool, output.status, error_message(&value, &output)))
    }

    pub fn authenticate(&self, alias: &str) -> Result<(), ToolError> {
        let result = match self.auth_url_files.get(alias) {
            Some(file) => {
                let file = file.to_string_lossy();
                self.sf(
                    "sf org login sfdx-url",
                    &["org", "login", "sfdx-url", "--sfdx-url-file", &file, "--alias", alias],
                    None,
                )
            }
            None => self.sf("sf org display", &["org", "display", "--target-org", alias], None),
        };
        let (output, value) = result?;
        if output.success() {
            tracing::debug!(alias, "environment authenticated");
            Ok(())
        } else {
            Err(ToolError::Auth {
                alias: alias.to_string(),
                message: error_message(&value, &output),
            })
        }
    }

    /// Active OmniStudio components of the org
    pub fn list_omni(&self, alias: &str) -> Result<ComponentSelection, ToolError> {
        let mut selection = ComponentSelection::new();
        for (kind, query, fields) in OMNI_QUERIES {
            let result = self.sf_checked(
                "sf data query",
                &["data", "query", "--query", query, "--target-org", alias],
                None,
            )?;
            let records = result.get("records").and_then(Value::as_array);
            for record in records.into_iter().flatten() {
                let parts: Vec<&str> = fields
                    .iter()
                    .filter_map(|f| record.get(*f).and_then(Value::as_str))
                    .filter(|s| !s.is_empty())
                    .collect();
                if !parts.is_empty() {
                    selection.insert(kind.clone(), parts.join("_"));
                }
            }
        }
        Ok(selection)
    }

    /// Components of the given metadata types
    pub fn list_metadata(
        &self,
        alias: &str,
        types: &[String],
    ) -> Result<ComponentSelection, ToolError> {
        let mut selection = ComponentSelection::new();
        for subtype in types {
            let result = self.sf_checked(
                "sf org list metadata",
                &["org", "list", "metadata", "--metadata-type", subtype, "--target-org", alias],
                None,
            )?;
            let items = match result {
                Value::Array(items) => items,
                Value::Object(_) => vec![result],
                _ => Vec::new(),
            };
            for item in items {
                if let Some(name) = item.get("fullName").and_then(Value::as_str) {
                    selection.insert(ComponentKind::metadata(subtype.as_str()), name);
                }
            }
        }
        Ok(selection)
    }

    /// Retrieve the metadata part of `selection` into `<dest>/Metadata/<Subtype>/`
    pub fn retrieve(
        &self,
        alias: &str,
        selection: &ComponentSelection,
        dest: &Path,
    ) -> Result<(), ToolError> {
        let tool = "sf project retrieve start";
        let members = metadata_members(selection);
        if members.is_empty() {
            return Ok(());
        }
        let project = scratch_project(tool)?;

        let mut args = vec!["project", "retrieve", "start", "--target-org", alias];
        for member in &members {
            args.push("--metadata");
            args.push(member);
        }
        let result = self.sf_checked(tool, &args, Some(project.path()))?;

        let files = result.get("files").and_then(Value::as_array);
        let mut failures = Vec::new();
        for file in files.into_iter().flatten() {
            let field = |key: &str| file.get(key).and_then(Value::as_str).unwrap_or_default();
            if field("state") == "Failed" {
                failures.push(format!("{}:{} {}", field("type"), field("fullName"), field("error")));
                continue;
            }
            let (subtype, full_name, file_path) = (field("type"), field("fullName"), field("filePath"));
            if subtype.is_empty() || file_path.is_empty() {
                continue;
            }
            let source = project.path().join(file_path);
            let target = relocated(dest, subtype, full_name, &source);
            copy_file(tool, &source, &target)?;
        }
        if !failures.is_empty() {
            return Err(ToolError::failed(tool, "retrieve failures", failures.join("\n")));
        }
        Ok(())
    }

    /// Deploy the metadata part of `selection` from the bundle at `bundle_dir`
    pub fn deploy(
        &self,
        alias: &str,
        bundle_dir: &Path,
        selection: &ComponentSelection,
    ) -> Result<DeployOutcome, ToolError> {
        let tool = "sf project deploy start";
        let project = scratch_project(tool)?;
        stage_metadata(tool, bundle_dir, selection, &project.path().join(SOURCE_ROOT))
            .map_err(|e| ToolError::output(tool, e))?;

        let wait_minutes = (self.runner.timeout().as_secs() / 60).max(1).to_string();
        let (output, value) = self.sf(
            tool,
            &[
                "project", "deploy", "start", "--source-dir", PACKAGE_DIR, "--target-org", alias,
                "--wait", &wait_minutes,
            ],
            Some(project.path()),
        )?;

        let result = value.get("result").cloned().unwrap_or(Value::Null);
        let reported = result.get("success").and_then(Value::as_bool);
        let problems = component_problems(&result);
        let warnings = problems
            .iter()
            .filter(|(kind, _)| kind == "Warning")
            .map(|(_, text)| text.clone())
            .collect();
        let mut raw_log = clean_diagnostics(&output.combined());
        if output.success() && raw_log.is_empty() {
            raw_log = "deploy succeeded".to_string();
        }

        Ok(DeployOutcome {
            succeeded: output.success() && reported.unwrap_or(true),
            warnings,
            raw_log,
        })
    }
}

fn scratch_project(tool: &str) -> Result<TempDir, ToolError> {
    let launch = |e: std::io::Error| ToolError::Launch {
        tool: tool.to_string(),
        message: format!("cannot prepare project directory: {e}"),
    };
    let dir = tempfile::Builder::new()
        .prefix("omnirelease-sf-")
        .tempdir()
        .map_err(launch)?;
    let project = json!({
        "packageDirectories": [{"path": PACKAGE_DIR, "default": true}],
        "namespace": "",
    });
    fs::create_dir_all(dir.path().join(SOURCE_ROOT)).map_err(launch)?;
    fs::write(dir.path().join("sfdx-project.json"), project.to_string()).map_err(launch)?;
    Ok(dir)
}

fn metadata_members(selection: &ComponentSelection) -> Vec<String> {
    selection
        .components()
        .filter(|c| c.kind.is_metadata())
        .map(|c| format!("{}:{}", c.kind.label(), c.name))
        .collect()
}

/// Bundle location of a retrieved file: bundle members keep their directory
fn relocated(dest: &Path, subtype: &str, full_name: &str, source: &Path) -> PathBuf {
    let base = dest.join(METADATA_KEY).join(subtype);
    let file = source.file_name().map(PathBuf::from).unwrap_or_default();
    let parent_is_component = source
        .parent()
        .and_then(|p| p.file_name())
        .is_some_and(|p| p == full_name);
    if parent_is_component {
        base.join(full_name).join(file)
    } else {
        base.join(file)
    }
}

fn copy_file(tool: &str, source: &Path, target: &Path) -> Result<(), ToolError> {
    let copy = || -> std::io::Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, target).map(|_| ())
    };
    copy().map_err(|e| ToolError::output(tool, format!("{}: {e}", source.display())))
}

/// Copy each selected metadata component into sf source format
fn stage_metadata(
    tool: &str,
    bundle_dir: &Path,
    selection: &ComponentSelection,
    source_root: &Path,
) -> Result<(), String> {
    for component in selection.components() {
        let ComponentKind::Metadata(subtype) = &component.kind else {
            continue;
        };
        let dir = bundle_dir.join(METADATA_KEY).join(subtype);
        let target = source_root.join(source_folder(subtype));
        let name = component.name.as_str();

        let direct = files_under(&dir, Some(1)).map_err(|e| e.to_string())?;
        for file in direct.iter().filter(|f| name_prefix(file_name(f)) == name) {
            copy_file(tool, file, &target.join(file_name(file))).map_err(|e| e.to_string())?;
        }
        let member_dir = dir.join(name);
        for file in files_under(&member_dir, None).map_err(|e| e.to_string())? {
            let relative = file.strip_prefix(&member_dir).unwrap_or(&file);
            copy_file(tool, &file, &target.join(name).join(relative)).map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

/// sf source-format folder for a metadata type
fn source_folder(subtype: &str) -> String {
    let known = match subtype {
        "ApexClass" => "classes",
        "ApexTrigger" => "triggers",
        "ApexPage" => "pages",
        "ApexComponent" => "components",
        "LightningComponentBundle" => "lwc",
        "AuraDefinitionBundle" => "aura",
        "StaticResource" => "staticresources",
        "CustomObject" => "objects",
        "CustomLabels" => "labels",
        "CustomMetadata" => "customMetadata",
        "CustomTab" => "tabs",
        "FlexiPage" => "flexipages",
        "Flow" => "flows",
        "Layout" => "layouts",
        "PermissionSet" => "permissionsets",
        "Profile" => "profiles",
        other => {
            let mut chars = other.chars();
            return match chars.next() {
                Some(first) => format!("{}{}s", first.to_ascii_lowercase(), chars.as_str()),
                None => String::new(),
            };
        }
    };
    known.to_string()
}

fn parse_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    serde_json::from_str(text.get(start..=end)?).ok()
}

fn error_message(value: &Value, output: &CommandOutput) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| output.diagnostics())
}

/// (problemType, description) of every component failure in a deploy result
fn component_problems(result: &Value) -> Vec<(String, String)> {
    let failures = result.pointer("/details/componentFailures");
    let items: Vec<&Value> = match failures {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    };
    items
        .into_iter()
        .map(|item| {
            let field = |key: &str| item.get(key).and_then(Value::as_str).unwrap_or_default();
            (
                field("problemType").to_string(),
                format!("{} {}: {}", field("componentType"), field("fullName"), field("problem")),
            )
        })
        .collect()
}
