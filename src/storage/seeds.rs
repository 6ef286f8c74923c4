//! Seed file of known articles
//!
//! A JSON array of `{"id": ..., "key": "..."}` records, unique by `key`.
//! The crawler reads it to build the initial frontier; the harvester appends
//! search results to it.

use crate::storage::traits::{StorageError, StorageResult};
use crate::storage::write_atomic;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

/// One known article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedRecord {
    /// Provider page id, kept opaque
    pub id: Value,
    /// Article identifier usable with the page endpoint
    pub key: String,
}

/// In-memory seed file with key de-duplication
#[derive(Debug, Default, Clone)]
pub struct SeedFile {
    records: Vec<SeedRecord>,
    keys: HashSet<String>,
}

impl SeedFile {
    /// Loads the seed file at `path`; a missing file yields an empty set
    ///
    /// Records whose key repeats an earlier one are dropped.
    pub fn load(path: &Path) -> StorageResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No seed file at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(StorageError::io(path, e)),
        };

        let records: Vec<SeedRecord> =
            serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;

        let mut seeds = Self::default();
        for record in records {
            seeds.insert(record);
        }
        Ok(seeds)
    }

    /// Adds a record unless its key is already present
    pub fn insert(&mut self, record: SeedRecord) -> bool {
        if !self.keys.insert(record.key.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Seed keys in file order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.key.as_str())
    }

    pub fn records(&self) -> &[SeedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes all records to `path` with four-space indentation
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.records.serialize(&mut serializer)?;
        write_atomic(path, &buf)
    }
}
