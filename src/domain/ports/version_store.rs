//! Versioned object store port
//!
//! The release repository is cloned into an ephemeral working tree per
//! operation. File helpers take tree-relative paths with forward slashes and
//! refuse paths that escape the tree.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::store_error::StoreError;
use super::tooling::ToolError;
use crate::domain::entities::{is_contained_path, normalize_path};

/// How a commit touched a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
    Other,
}

impl ChangeStatus {
    /// Parse the status letter of `git diff --name-status` (`R100` -> Renamed)
    pub fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('A') => ChangeStatus::Added,
            Some('M') => ChangeStatus::Modified,
            Some('D') => ChangeStatus::Deleted,
            Some('R') => ChangeStatus::Renamed,
            Some('C') => ChangeStatus::Copied,
            Some('T') => ChangeStatus::TypeChanged,
            _ => ChangeStatus::Other,
        }
    }

    /// True when the commit left content at the path
    pub fn leaves_content(&self) -> bool {
        matches!(
            self,
            ChangeStatus::Added
                | ChangeStatus::Modified
                | ChangeStatus::Renamed
                | ChangeStatus::Copied
                | ChangeStatus::TypeChanged
        )
    }
}

/// One file touched by a commit; for renames and copies `path` is the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub status: ChangeStatus,
    pub path: String,
}

impl FileChange {
    pub fn new(status: ChangeStatus, path: impl Into<String>) -> Self {
        Self {
            status,
            path: path.into(),
        }
    }
}

pub trait VersionStore: Send + Sync {
    /// Fresh clone of the release repository; removed when dropped
    fn clone_tree(&self) -> Result<Box<dyn WorkingTree>, ToolError>;
}

pub trait WorkingTree {
    fn root(&self) -> &Path;

    /// Check out `branch`, starting an empty orphan branch if it does not exist
    fn checkout(&mut self, branch: &str) -> Result<(), ToolError>;

    /// Detached checkout of a tag or commit
    fn checkout_revision(&mut self, revision: &str) -> Result<(), ToolError>;

    /// Full commit id of `revision`; `None` if it names no commit
    fn resolve_revision(&self, revision: &str) -> Result<Option<String>, ToolError>;

    fn diff_files(&self, commit: &str) -> Result<Vec<FileChange>, ToolError>;

    /// Content of `path` as of `commit`
    fn show(&self, commit: &str, path: &str) -> Result<Vec<u8>, ToolError>;

    /// Commit every change in the tree; `None` when there was nothing to commit
    fn commit(&mut self, message: &str) -> Result<Option<String>, ToolError>;

    fn push(&self, branch: &str) -> Result<(), ToolError>;

    /// Create tag `name` at HEAD and publish it
    fn tag(&self, name: &str) -> Result<(), ToolError>;

    /// Remove tag `name` locally and remotely; false if it existed nowhere
    fn delete_tag(&self, name: &str) -> Result<bool, ToolError>;

    /// Tags known to the remote
    fn list_tags(&self) -> Result<Vec<String>, ToolError>;

    /// Absolute location of a tree-relative path
    fn resolve(&self, relative: &str) -> Result<PathBuf, StoreError> {
        if !is_contained_path(relative) {
            return Err(StoreError::PathEscape {
                path: PathBuf::from(relative),
            });
        }
        Ok(self.root().join(normalize_path(relative)))
    }

    fn read_file(&self, relative: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.resolve(relative)?;
        match fs::read(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::read(path, e)),
        }
    }

    fn write_file(&self, relative: &str, content: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::write(parent, e))?;
        }
        fs::write(&path, content).map_err(|e| StoreError::write(path, e))
    }

    /// Remove a file; missing files are not an error
    fn remove_file(&self, relative: &str) -> Result<(), StoreError> {
        let path = self.resolve(relative)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::write(path, e)),
        }
    }
}
