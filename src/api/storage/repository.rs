//! Typed access to stored records.

use super::{RecordKind, StorageBackend, StorageError, StoredRecord};
use crate::models::Entity;
use std::marker::PhantomData;
use std::sync::Arc;

/// Reads and writes one record type through a [`StorageBackend`].
///
/// The stored document's `id`, `ver` and `etag` are refreshed from the
/// record's columns on every read, so the columns stay authoritative.
pub struct Repository<T> {
    storage: Arc<dyn StorageBackend>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            _marker: PhantomData,
        }
    }

    fn kind() -> RecordKind {
        T::KIND
    }

    fn decode(record: StoredRecord) -> Result<T, StorageError> {
        let mut entity: T = serde_json::from_value(record.data).map_err(|e| {
            StorageError::Other(format!(
                "Failed to decode {} {}: {}",
                Self::kind(),
                record.id,
                e
            ))
        })?;
        entity.assign_identity(record.id, record.ver);
        Ok(entity)
    }

    fn encode(entity: &T) -> Result<serde_json::Value, StorageError> {
        serde_json::to_value(entity)
            .map_err(|e| StorageError::Other(format!("Failed to encode {}: {}", Self::kind(), e)))
    }

    pub async fn get(&self, id: i64) -> Result<Option<T>, StorageError> {
        match self.storage.get_record(Self::kind(), id).await? {
            Some(record) => Ok(Some(Self::decode(record)?)),
            None => Ok(None),
        }
    }

    /// Like [`get`](Self::get), but a missing record is an error.
    pub async fn require(&self, id: i64) -> Result<T, StorageError> {
        self.get(id)
            .await?
            .ok_or_else(|| StorageError::not_found(Self::kind().as_str(), id))
    }

    /// Parent id of a stored record.
    pub async fn parent_of(&self, id: i64) -> Result<Option<i64>, StorageError> {
        Ok(self
            .storage
            .get_record(Self::kind(), id)
            .await?
            .ok_or_else(|| StorageError::not_found(Self::kind().as_str(), id))?
            .parent_id)
    }

    pub async fn list(&self, parent_id: Option<i64>) -> Result<Vec<T>, StorageError> {
        self.storage
            .list_records(Self::kind(), parent_id)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    /// Store a new record, allocating its id. Child records are attached to `parent_id`.
    pub async fn insert(&self, parent_id: Option<i64>, entity: T) -> Result<T, StorageError> {
        self.insert_with(parent_id, entity, |_| {}).await
    }

    /// Like [`insert`](Self::insert), running `prepare` once the id is known.
    pub async fn insert_with(
        &self,
        parent_id: Option<i64>,
        mut entity: T,
        prepare: impl FnOnce(&mut T) + Send,
    ) -> Result<T, StorageError> {
        let id = self.storage.next_id().await?;
        if let Some(parent) = parent_id {
            entity.attach_to(parent);
        }
        entity.assign_identity(id, 1);
        prepare(&mut entity);
        let record = StoredRecord {
            id,
            parent_id,
            ver: 1,
            data: Self::encode(&entity)?,
        };
        let stored = self.storage.insert_record(Self::kind(), record).await?;
        Self::decode(stored)
    }

    /// Replace a stored record. `expected_version` of `None` skips the version check.
    pub async fn update(&self, entity: &T, expected_version: Option<i32>) -> Result<T, StorageError> {
        let stored = self
            .storage
            .update_record(
                Self::kind(),
                entity.id(),
                Self::encode(entity)?,
                expected_version,
            )
            .await?;
        Self::decode(stored)
    }

    pub async fn delete(&self, id: i64, expected_version: Option<i32>) -> Result<T, StorageError> {
        let removed = self
            .storage
            .delete_record(Self::kind(), id, expected_version)
            .await?;
        Self::decode(removed)
    }

    /// Delete every record of this type under `parent_id`.
    pub async fn delete_children(&self, parent_id: i64) -> Result<u64, StorageError> {
        self.storage.delete_children(Self::kind(), parent_id).await
    }
}
