//! Reference record lookup.

mod sample;

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::StoreError;
use crate::models::config::ReferenceConfig;
use crate::models::record::ReferenceRecord;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Keyed source of authoritative records.
///
/// Lookups are exact: the id is neither trimmed nor case-folded.
pub trait ReferenceStore: Send + Sync {
    /// Fetch the record stored under `record_id`.
    fn lookup(&self, record_id: &str) -> Result<Option<ReferenceRecord>>;
}

/// Reference store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: HashMap<String, ReferenceRecord>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the built-in sample records.
    pub fn sample() -> Self {
        Self::from_records(sample::records())
    }

    /// Build a store from `(id, record)` pairs.
    pub fn from_records<I, K>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, ReferenceRecord)>,
        K: Into<String>,
    {
        Self {
            records: records.into_iter().map(|(k, r)| (k.into(), r)).collect(),
        }
    }

    /// Parse a JSON object mapping record ids to records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: HashMap<String, ReferenceRecord> = serde_json::from_str(json)?;
        Ok(Self { records })
    }

    /// Load a JSON record file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json_str(&content)?;
        debug!("Loaded {} reference records from {}", store.len(), path.display());
        Ok(store)
    }

    /// Records from `records_path`, or the sample records when unset.
    pub fn from_config(config: &ReferenceConfig) -> Result<Self> {
        match &config.records_path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::sample()),
        }
    }

    /// Insert or replace a record.
    pub fn insert(&mut self, record_id: impl Into<String>, record: ReferenceRecord) {
        self.records.insert(record_id.into(), record);
    }

    /// Record ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.records.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ReferenceStore for InMemoryStore {
    fn lookup(&self, record_id: &str) -> Result<Option<ReferenceRecord>> {
        Ok(self.records.get(record_id).cloned())
    }
}
