//! In-memory record store.
//!
//! RULE: Only store.rs reads the record source.
//! Queries and simulations borrow records from a loaded RecordStore;
//! they never touch the file system.

use crate::{
    error::{EquityError, EquityResult},
    record::{BlockGroupRecord, Metric},
    types::{is_valid_geoid, tract_prefix},
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// The full record set, indexed by GEOID. Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<BlockGroupRecord>,
    index:   HashMap<String, usize>,
}

impl RecordStore {
    /// Build a store from already-parsed records, keeping their order.
    pub fn from_records(records: Vec<BlockGroupRecord>) -> EquityResult<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if !is_valid_geoid(&record.geoid) {
                return Err(EquityError::Load {
                    path:   "<records>".to_string(),
                    reason: format!("geoid '{}' is not 12 digits", record.geoid),
                });
            }
            if let Some(metric) = Metric::ALL.into_iter().find(|m| !record.metric(*m).is_finite()) {
                return Err(EquityError::Load {
                    path:   "<records>".to_string(),
                    reason: format!("geoid '{}' has a non-finite {metric}", record.geoid),
                });
            }
            if index.insert(record.geoid.clone(), i).is_some() {
                return Err(EquityError::Load {
                    path:   "<records>".to_string(),
                    reason: format!("duplicate geoid '{}'", record.geoid),
                });
            }
        }
        Ok(Self { records, index })
    }

    /// Parse a JSON array of records.
    pub fn from_json(json: &str) -> EquityResult<Self> {
        let records: Vec<BlockGroupRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Read and parse the record source at `path`.
    pub fn load(path: impl AsRef<Path>) -> EquityResult<Self> {
        let path = path.as_ref();
        let load_err = |reason: String| EquityError::Load {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let store = Self::from_json(&content).map_err(|e| match e {
            EquityError::Load { reason, .. } => load_err(reason),
            other => load_err(other.to_string()),
        })?;

        log::info!("Loaded {} block groups from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn records(&self) -> &[BlockGroupRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_by_geoid(&self, geoid: &str) -> Option<&BlockGroupRecord> {
        self.index.get(geoid).map(|&i| &self.records[i])
    }

    /// Look up a record or fail with NotFound naming `geoid`.
    pub fn require(&self, geoid: &str) -> EquityResult<&BlockGroupRecord> {
        self.find_by_geoid(geoid).ok_or_else(|| EquityError::NotFound {
            geoids: vec![geoid.to_string()],
        })
    }

    /// Up to `limit` records sharing `geoid`'s tract, excluding `geoid`
    /// itself, in record-set order. Shared tract stands in for spatial
    /// adjacency; no geometry is consulted.
    pub fn neighbors_of(&self, geoid: &str, limit: usize) -> Vec<&BlockGroupRecord> {
        let tract = tract_prefix(geoid);
        self.records
            .iter()
            .filter(|r| r.geoid != geoid && r.tract() == tract)
            .take(limit)
            .collect()
    }
}

/// Memoized, single-flight loader for the session's record set.
///
/// The first caller loads while holding the lock. Callers arriving during
/// the load wait on the lock and then share the cached store. Failures are
/// not cached.
pub struct DatasetCache {
    path: PathBuf,
    slot: Mutex<Option<Arc<RecordStore>>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: Mutex::new(None),
        }
    }

    /// A cache that is already populated (used in tests and by hosts that
    /// obtain records some other way).
    pub fn preloaded(store: RecordStore) -> Self {
        Self {
            path: PathBuf::new(),
            slot: Mutex::new(Some(Arc::new(store))),
        }
    }

    pub fn get(&self) -> EquityResult<Arc<RecordStore>> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("dataset cache lock poisoned"))?;
        if let Some(store) = slot.as_ref() {
            return Ok(Arc::clone(store));
        }

        let store = Arc::new(RecordStore::load(&self.path)?);
        *slot = Some(Arc::clone(&store));
        Ok(store)
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}
