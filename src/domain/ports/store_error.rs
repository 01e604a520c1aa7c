//! StoreError - failures of the durable state repositories

use std::path::PathBuf;

/// Errors raised by the component, release and rollback repositories
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is corrupted: {message}")]
    Corrupted { path: PathBuf, message: String },

    #[error("path '{path}' escapes the working tree")]
    PathEscape { path: PathBuf },

    #[error("environment '{alias}' is locked by another operation (waited {waited_secs}s)")]
    LockTimeout { alias: String, waited_secs: u64 },
}

impl StoreError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Write {
            path: path.into(),
            source,
        }
    }

    pub fn corrupted(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        StoreError::Corrupted {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
