//! JSON Component Repository
//!
//! One file per kind, mapping component name to its record.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::domain::entities::{ComponentIndex, ComponentRecord};
use crate::domain::ports::{ComponentRepository, StoreError};
use crate::domain::value_objects::{ComponentKind, METADATA_KEY};
use crate::infrastructure::fs::{read_json, write_json_atomic};

use super::layout::StateLayout;

type KindFile = BTreeMap<String, ComponentRecord>;

pub struct JsonComponentRepository {
    layout: StateLayout,
}

impl JsonComponentRepository {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    fn load_dir(
        &self,
        dir: &Path,
        index: &mut ComponentIndex,
        to_kind: impl Fn(&str) -> Option<ComponentKind>,
    ) -> Result<(), StoreError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StoreError::read(dir, e)),
        };
        for entry in entries {
            let path = entry.map_err(|e| StoreError::read(dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(kind) = to_kind(stem) else {
                tracing::warn!(path = %path.display(), "ignoring unknown component kind file");
                continue;
            };
            if let Some(records) = read_json::<KindFile>(&path)? {
                index.set_kind(kind, records);
            }
        }
        Ok(())
    }
}

impl ComponentRepository for JsonComponentRepository {
    fn load_index(&self, alias: &str) -> Result<ComponentIndex, StoreError> {
        let dir = self.layout.components_dir(alias)?;
        let mut index = ComponentIndex::new();
        self.load_dir(&dir, &mut index, ComponentKind::parse_omni)?;
        self.load_dir(&dir.join(METADATA_KEY), &mut index, |stem| {
            Some(ComponentKind::metadata(stem))
        })?;
        Ok(index)
    }

    fn save_kind(
        &self,
        alias: &str,
        kind: &ComponentKind,
        index: &ComponentIndex,
    ) -> Result<(), StoreError> {
        let path = self.layout.kind_file(alias, kind)?;
        let empty = KindFile::new();
        let records = index.kind_records(kind).unwrap_or(&empty);
        write_json_atomic(&path, records)
    }
}
