//! Exported bundle reader
//!
//! ```text
//! <bundle>/<DataPackType>/<Name>/<Name>_DataPack.json
//! <bundle>/<DataPackType>/<Name>/<Name>_Element_<Step>.json
//! <bundle>/Metadata/<Subtype>/<Name>.<ext>[...]
//! <bundle>/Metadata/<Subtype>/<Name>/<files>
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde_json::Value;

use crate::domain::entities::{ComponentBody, ComponentSelection, MaterializedComponent};
use crate::domain::ports::{ComponentSource, StoreError};
use crate::domain::value_objects::{ComponentKind, METADATA_KEY};

const DATAPACK_SUFFIX: &str = "_DataPack.json";

/// Reads component bodies from an exported bundle directory
#[derive(Debug, Clone)]
pub struct BundleSource {
    root: PathBuf,
}

impl BundleSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Names of every component present in the bundle
    pub fn list(&self) -> Result<ComponentSelection, StoreError> {
        let mut selection = ComponentSelection::new();
        for kind in ComponentKind::OMNI {
            let Some(dir_name) = kind.datapack_type() else {
                continue;
            };
            for name in subdirectories(&self.root.join(dir_name))? {
                selection.insert(kind.clone(), name);
            }
        }

        let metadata_dir = self.root.join(METADATA_KEY);
        for subtype in subdirectories(&metadata_dir)? {
            let dir = metadata_dir.join(&subtype);
            let mut names: BTreeSet<String> = subdirectories(&dir)?.into_iter().collect();
            for file in files_under(&dir, Some(1))? {
                if let Some(name) = file.file_name().and_then(|f| f.to_str()).map(name_prefix) {
                    names.insert(name.to_string());
                }
            }
            for name in names {
                selection.insert(ComponentKind::metadata(subtype.as_str()), name);
            }
        }
        Ok(selection)
    }

    fn read_datapack(
        &self,
        kind: &ComponentKind,
        name: &str,
    ) -> Result<Option<ComponentBody>, StoreError> {
        let Some(dir_name) = kind.datapack_type() else {
            return Ok(None);
        };
        let dir = self.root.join(dir_name).join(name);
        let files = files_under(&dir, Some(1))?;

        let expected = format!("{name}{DATAPACK_SUFFIX}");
        let primary = files
            .iter()
            .find(|f| file_name(f) == expected)
            .or_else(|| files.iter().find(|f| file_name(f).ends_with(DATAPACK_SUFFIX)));
        let Some(primary) = primary else {
            return Ok(None);
        };

        let mut body = ComponentBody::new(read_json_value(primary)?);
        let element_prefix = format!("{name}_Element_");
        let plain_prefix = format!("{name}_");
        for file in files.iter().filter(|f| *f != primary) {
            let Some(stem) = file_name(file).strip_suffix(".json") else {
                continue;
            };
            let step = stem
                .strip_prefix(&element_prefix)
                .or_else(|| stem.strip_prefix(&plain_prefix))
                .unwrap_or(stem);
            body.steps.insert(step.to_string(), read_json_value(file)?);
        }
        Ok(Some(body))
    }

    fn read_metadata(&self, subtype: &str, name: &str) -> Result<Option<ComponentBody>, StoreError> {
        let dir = self.root.join(METADATA_KEY).join(subtype);
        let mut files: Vec<PathBuf> = files_under(&dir, Some(1))?
            .into_iter()
            .filter(|f| name_prefix(file_name(f)) == name)
            .collect();
        files.extend(files_under(&dir.join(name), None)?);
        if files.is_empty() {
            return Ok(None);
        }

        // shortest matching file name is the primary (`Foo.cls` over `Foo.cls-meta.xml`)
        let primary = files
            .iter()
            .filter(|f| name_prefix(file_name(f)) == name)
            .min_by_key(|f| file_name(f).len())
            .unwrap_or(&files[0])
            .clone();

        let mut body = ComponentBody::new(Value::String(read_text(&primary)?));
        for file in files.iter().filter(|f| **f != primary) {
            let key = relative_key(&dir, file);
            body.steps.insert(key, Value::String(read_text(file)?));
        }
        Ok(Some(body))
    }
}

impl ComponentSource for BundleSource {
    fn materialize(
        &self,
        selection: &ComponentSelection,
    ) -> Result<Vec<MaterializedComponent>, StoreError> {
        let mut components = Vec::new();
        for component in selection.components() {
            let body = match &component.kind {
                ComponentKind::Metadata(subtype) => self.read_metadata(subtype, &component.name)?,
                kind => self.read_datapack(kind, &component.name)?,
            };
            if let Some(body) = body {
                components.push(MaterializedComponent {
                    reference: component,
                    body,
                });
            }
        }
        Ok(components)
    }
}

pub(super) fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|f| f.to_str()).unwrap_or_default()
}

/// `CaseService.cls-meta.xml` -> `CaseService`
pub(super) fn name_prefix(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

fn relative_key(base: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(base).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn walk_error(dir: &Path, err: ignore::Error) -> StoreError {
    StoreError::read(dir, io::Error::other(err.to_string()))
}

/// Regular, non-hidden files below `dir`, sorted; empty when `dir` is missing
pub(super) fn files_under(dir: &Path, max_depth: Option<usize>) -> Result<Vec<PathBuf>, StoreError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(true)
        .max_depth(max_depth)
        .build()
    {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if entry.file_type().is_some_and(|t| t.is_file()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn subdirectories(dir: &Path) -> Result<Vec<String>, StoreError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(true)
        .max_depth(Some(1))
        .build()
    {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if entry.depth() == 1 && entry.file_type().is_some_and(|t| t.is_dir()) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn read_text(path: &Path) -> Result<String, StoreError> {
    let bytes = fs::read(path).map_err(|e| StoreError::read(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_json_value(path: &Path) -> Result<Value, StoreError> {
    let bytes = fs::read(path).map_err(|e| StoreError::read(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupted(path, e))
}
