//! Error types for omnirelease
//!
//! Uses `thiserror` for library errors. Every variant maps onto one category of
//! the operator-facing taxonomy via [`ReleaseError::category`].

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::{DependencyReport, RollbackRecord};
use crate::domain::ports::{StoreError, ToolError};

/// Result type alias for omnirelease operations
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Error category reported alongside every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    AuthFailure,
    ExternalToolFailure,
    Timeout,
    ValidationFailure,
    NotFound,
    LedgerWriteFailure,
    PartialFailure,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::AuthFailure => "AuthFailure",
            ErrorCategory::ExternalToolFailure => "ExternalToolFailure",
            ErrorCategory::Timeout => "Timeout",
            ErrorCategory::ValidationFailure => "ValidationFailure",
            ErrorCategory::NotFound => "NotFound",
            ErrorCategory::LedgerWriteFailure => "LedgerWriteFailure",
            ErrorCategory::PartialFailure => "PartialFailure",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for omnirelease operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Credentials for an environment were rejected
    #[error("authentication failed for '{alias}': {detail}")]
    AuthFailure { alias: String, detail: String },

    /// An external tool (vlocity, sf, git) exited unsuccessfully
    #[error("{tool} failed: {detail}")]
    ExternalTool { tool: String, detail: String },

    /// An external tool was stopped by the operator
    #[error("{tool} was cancelled")]
    Cancelled { tool: String },

    /// An external invocation or lock acquisition ran past its deadline
    #[error("{what} timed out after {after_secs}s")]
    Timeout { what: String, after_secs: u64 },

    /// The configuration file is unreadable, malformed or incomplete
    #[error("configuration {}: {detail}", .path.display())]
    Config { path: PathBuf, detail: String },

    /// Malformed input or a request that would break an invariant
    #[error("invalid request: {0}")]
    Validation(String),

    /// The selection omits components it depends on
    #[error("selection has {} missing dependencies", .0.missing_count())]
    MissingDependencies(Box<DependencyReport>),

    /// A path from a commit or snapshot points outside the working tree
    #[error("path '{path}' escapes the working tree")]
    PathEscape { path: PathBuf },

    /// Unknown release, commit or snapshot
    #[error("{what} '{id}' not found")]
    NotFound { what: &'static str, id: String },

    /// Durable state (component store, ledger, rollback history) is unusable
    #[error("durable state at {path}: {detail}")]
    LedgerWrite { path: PathBuf, detail: String },

    /// Some files could not be backed up; the rest was rolled back and recorded
    #[error("rollback of {commit_id} was partial: {} file(s) could not be backed up", .failed.len())]
    PartialFailure {
        commit_id: String,
        record: Option<Box<RollbackRecord>>,
        failed: Vec<String>,
    },
}

impl ReleaseError {
    /// Taxonomy category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReleaseError::AuthFailure { .. } => ErrorCategory::AuthFailure,
            ReleaseError::ExternalTool { .. } | ReleaseError::Cancelled { .. } => {
                ErrorCategory::ExternalToolFailure
            }
            ReleaseError::Timeout { .. } => ErrorCategory::Timeout,
            ReleaseError::Validation(_)
            | ReleaseError::Config { .. }
            | ReleaseError::MissingDependencies(_)
            | ReleaseError::PathEscape { .. } => ErrorCategory::ValidationFailure,
            ReleaseError::NotFound { .. } => ErrorCategory::NotFound,
            ReleaseError::LedgerWrite { .. } => ErrorCategory::LedgerWriteFailure,
            ReleaseError::PartialFailure { .. } => ErrorCategory::PartialFailure,
        }
    }

    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        ReleaseError::NotFound {
            what,
            id: id.into(),
        }
    }
}

impl From<ToolError> for ReleaseError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::Auth { alias, message } => ReleaseError::AuthFailure {
                alias,
                detail: message,
            },
            ToolError::Timeout { tool, after_secs } => ReleaseError::Timeout {
                what: tool,
                after_secs,
            },
            ToolError::Cancelled { tool } => ReleaseError::Cancelled { tool },
            ToolError::Launch { tool, message } | ToolError::Output { tool, message } => {
                ReleaseError::ExternalTool {
                    tool,
                    detail: message,
                }
            }
            ToolError::Failed {
                tool,
                status,
                diagnostics,
            } => ReleaseError::ExternalTool {
                tool,
                detail: format!("{status}: {diagnostics}"),
            },
        }
    }
}

impl From<StoreError> for ReleaseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PathEscape { path } => ReleaseError::PathEscape { path },
            StoreError::LockTimeout { alias, waited_secs } => ReleaseError::Timeout {
                what: format!("lock on environment '{alias}'"),
                after_secs: waited_secs,
            },
            StoreError::Read { path, source } | StoreError::Write { path, source } => {
                ReleaseError::LedgerWrite {
                    path,
                    detail: source.to_string(),
                }
            }
            StoreError::Corrupted { path, message } => ReleaseError::LedgerWrite {
                path,
                detail: message,
            },
        }
    }
}
