//! External tool ports
//!
//! The exporter/deployer pulls component bodies out of a live environment and
//! pushes bundles back in. The authenticator establishes a session for an
//! environment alias. Both are driven as external processes by the
//! infrastructure layer.

use std::path::Path;

use crate::domain::entities::{ComponentSelection, MaterializedComponent};

/// Errors raised while driving an external tool
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("{tool} failed to start: {message}")]
    Launch { tool: String, message: String },

    #[error("{tool} exited with {status}: {diagnostics}")]
    Failed {
        tool: String,
        status: String,
        diagnostics: String,
    },

    #[error("{tool} timed out after {after_secs}s")]
    Timeout { tool: String, after_secs: u64 },

    #[error("{tool} was cancelled")]
    Cancelled { tool: String },

    #[error("authentication failed for '{alias}': {message}")]
    Auth { alias: String, message: String },

    #[error("{tool} produced unusable output: {message}")]
    Output { tool: String, message: String },
}

impl ToolError {
    pub fn failed(tool: impl Into<String>, status: impl ToString, diagnostics: impl Into<String>) -> Self {
        ToolError::Failed {
            tool: tool.into(),
            status: status.to_string(),
            diagnostics: diagnostics.into(),
        }
    }

    pub fn output(tool: impl Into<String>, message: impl ToString) -> Self {
        ToolError::Output {
            tool: tool.into(),
            message: message.to_string(),
        }
    }
}

/// Result of exporting a selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    /// Bodies read back from the exported bundle
    pub components: Vec<MaterializedComponent>,
    /// Non-fatal problems reported by the tool
    pub warnings: Vec<String>,
}

/// Result of deploying a bundle to one target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOutcome {
    pub succeeded: bool,
    pub warnings: Vec<String>,
    pub raw_log: String,
}

impl DeployOutcome {
    pub fn success(raw_log: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            warnings: Vec::new(),
            raw_log: raw_log.into(),
        }
    }

    pub fn failure(raw_log: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            warnings: Vec::new(),
            raw_log: raw_log.into(),
        }
    }
}

pub trait Exporter: Send + Sync {
    /// Every component the environment currently holds
    fn list_available(&self, alias: &str) -> Result<ComponentSelection, ToolError>;

    /// Export `selection` into `dest` and read the bodies back
    fn export(
        &self,
        alias: &str,
        selection: &ComponentSelection,
        dest: &Path,
    ) -> Result<ExportReport, ToolError>;
}

pub trait Deployer: Send + Sync {
    /// Deploy the selected components of the bundle at `bundle_dir`
    fn deploy(
        &self,
        alias: &str,
        bundle_dir: &Path,
        selection: &ComponentSelection,
    ) -> Result<DeployOutcome, ToolError>;
}

pub trait Authenticator: Send + Sync {
    /// Establish a session; any error aborts the enclosing pipeline
    fn authenticate(&self, alias: &str) -> Result<(), ToolError>;
}
