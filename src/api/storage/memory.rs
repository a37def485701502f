//! In-memory storage backend implementation.
//!
//! Default backend when no `DATABASE_URL` is configured, and the backend used
//! by the test suite. Records live in per-kind ordered maps behind a single
//! async lock so that version checks and writes are atomic.

use super::{StorageError, traits::*};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// In-memory storage backend.
pub struct MemoryStorageBackend {
    records: RwLock<HashMap<RecordKind, BTreeMap<i64, StoredRecord>>>,
    sequence: AtomicI64,
}

impl MemoryStorageBackend {
    /// Create a new, empty in-memory storage backend.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            sequence: AtomicI64::new(0),
        }
    }
}

impl Default for MemoryStorageBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn check_version(
    kind: RecordKind,
    record: &StoredRecord,
    expected_version: Option<i32>,
) -> Result<(), StorageError> {
    match expected_version {
        Some(expected) if expected != record.ver => Err(StorageError::VersionConflict {
            entity_type: kind.to_string(),
            entity_id: record.id.to_string(),
            expected_version: expected,
            current_version: record.ver,
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl StorageBackend for MemoryStorageBackend {
    async fn next_id(&self) -> Result<i64, StorageError> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn get_record(
        &self,
        kind: RecordKind,
        id: i64,
    ) -> Result<Option<StoredRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records.get(&kind).and_then(|m| m.get(&id)).cloned())
    }

    async fn list_records(
        &self,
        kind: RecordKind,
        parent_id: Option<i64>,
    ) -> Result<Vec<StoredRecord>, StorageError> {
        let records = self.records.read().await;
        let Some(by_id) = records.get(&kind) else {
            return Ok(Vec::new());
        };
        Ok(by_id
            .values()
            .filter(|r| parent_id.is_none() || r.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn insert_record(
        &self,
        kind: RecordKind,
        record: StoredRecord,
    ) -> Result<StoredRecord, StorageError> {
        let mut records = self.records.write().await;
        let by_id = records.entry(kind).or_default();
        if by_id.contains_key(&record.id) {
            return Err(StorageError::Other(format!(
                "{} with id {} already exists",
                kind, record.id
            )));
        }
        let stored = StoredRecord { ver: 1, ..record };
        by_id.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_record(
        &self,
        kind: RecordKind,
        id: i64,
        data: Value,
        expected_version: Option<i32>,
    ) -> Result<StoredRecord, StorageError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&kind)
            .and_then(|m| m.get_mut(&id))
            .ok_or_else(|| StorageError::not_found(kind.as_str(), id))?;
        check_version(kind, record, expected_version)?;

        record.data = data;
        record.ver += 1;
        Ok(record.clone())
    }

    async fn delete_record(
        &self,
        kind: RecordKind,
        id: i64,
        expected_version: Option<i32>,
    ) -> Result<StoredRecord, StorageError> {
        let mut records = self.records.write().await;
        let by_id = records
            .get_mut(&kind)
            .ok_or_else(|| StorageError::not_found(kind.as_str(), id))?;
        let record = by_id
            .get(&id)
            .ok_or_else(|| StorageError::not_found(kind.as_str(), id))?;
        check_version(kind, record, expected_version)?;

        by_id
            .remove(&id)
            .ok_or_else(|| StorageError::not_found(kind.as_str(), id))
    }

    async fn delete_children(&self, kind: RecordKind, parent_id: i64) -> Result<u64, StorageError> {
        let mut records = self.records.write().await;
        let Some(by_id) = records.get_mut(&kind) else {
            return Ok(0);
        };
        let before = by_id.len();
        by_id.retain(|_, r| r.parent_id != Some(parent_id));
        Ok((before - by_id.len()) as u64)
    }
}
