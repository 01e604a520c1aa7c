//! Atomic file writes
//!
//! Content goes to a temp file in the destination directory, is synced, then
//! renamed over the target. Readers see the old file or the new one.

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::ports::StoreError;

/// Write `content` to `path` atomically, creating parent directories
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::write(path, io::Error::other("path has no parent")))?;
    fs::create_dir_all(parent).map_err(|e| StoreError::write(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| StoreError::write(path, e))?;
    tmp.as_file_mut()
        .write_all(content)
        .and_then(|()| tmp.as_file_mut().flush())
        .and_then(|()| tmp.as_file_mut().sync_all())
        .map_err(|e| StoreError::write(path, e))?;
    tmp.persist(path)
        .map_err(|e| StoreError::write(path, e.error))?;
    Ok(())
}

/// Serialize `value` as pretty JSON and write it atomically
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut content = serde_json::to_vec_pretty(value)
        .map_err(|e| StoreError::write(path, io::Error::other(e)))?;
    content.push(b'\n');
    write_atomic(path, &content)
}

/// Read a JSON file; `None` when it does not exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::read(path, e)),
    };
    serde_json::from_slice(&content)
        .map(Some)
        .map_err(|e| StoreError::corrupted(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn write_atomic_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("uat/releases/r.json");

        write_atomic(&path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn write_atomic_overwrite_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");

        fs::write(&path, "Original").unwrap();
        write_atomic(&path, b"Replaced").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Replaced");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn read_json_missing_is_none() {
        let dir = tempdir().unwrap();
        let value: Option<BTreeMap<String, u32>> = read_json(&dir.path().join("nope.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn read_json_reports_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_json::<BTreeMap<String, u32>>(&path).unwrap_err();

        assert!(matches!(err, StoreError::Corrupted { .. }));
    }

    #[test]
    fn json_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/b.json");
        let mut value = BTreeMap::new();
        value.insert("CaseView".to_string(), 3u32);

        write_json_atomic(&path, &value).unwrap();

        assert_eq!(read_json::<BTreeMap<String, u32>>(&path).unwrap(), Some(value));
    }
}
