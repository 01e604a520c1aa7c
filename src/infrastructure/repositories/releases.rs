//! JSON Release Repository
//!
//! One file per release id under `<alias>/releases/`.

use std::fs;
use std::io::ErrorKind;

use crate::domain::entities::ReleaseRecord;
use crate::domain::ports::{ReleaseRepository, StoreError};
use crate::domain::value_objects::ReleaseId;
use crate::infrastructure::fs::{read_json, write_json_atomic};

use super::layout::StateLayout;

pub struct JsonReleaseRepository {
    layout: StateLayout,
}

impl JsonReleaseRepository {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }
}

impl ReleaseRepository for JsonReleaseRepository {
    fn save(&self, alias: &str, record: &ReleaseRecord) -> Result<(), StoreError> {
        let path = self.layout.release_file(alias, &record.release_id)?;
        write_json_atomic(&path, record)
    }

    fn load(&self, alias: &str, id: &ReleaseId) -> Result<Option<ReleaseRecord>, StoreError> {
        read_json(&self.layout.release_file(alias, id)?)
    }

    fn list(&self, alias: &str) -> Result<Vec<ReleaseRecord>, StoreError> {
        let dir = self.layout.releases_dir(alias)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::read(&dir, e)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::read(&dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(record) = read_json::<ReleaseRecord>(&path)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
