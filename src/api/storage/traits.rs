//! Storage trait definitions for the case storage backends.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of record kept by a storage backend.
///
/// Every record is addressed by `(kind, id)`. Child records (comments,
/// close reasons, status conditions, ...) also carry the id of their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Case,
    RelatedCase,
    CaseComment,
    CaseCommunication,
    CaseFile,
    CloseReasonGroup,
    CloseReason,
    Priority,
    Sla,
    SlaCondition,
    Source,
    Status,
    StatusCondition,
}

impl RecordKind {
    pub const ALL: [RecordKind; 13] = [
        RecordKind::Case,
        RecordKind::RelatedCase,
        RecordKind::CaseComment,
        RecordKind::CaseCommunication,
        RecordKind::CaseFile,
        RecordKind::CloseReasonGroup,
        RecordKind::CloseReason,
        RecordKind::Priority,
        RecordKind::Sla,
        RecordKind::SlaCondition,
        RecordKind::Source,
        RecordKind::Status,
        RecordKind::StatusCondition,
    ];

    /// Stable name used as the `kind` column and in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Case => "case",
            RecordKind::RelatedCase => "related_case",
            RecordKind::CaseComment => "case_comment",
            RecordKind::CaseCommunication => "case_communication",
            RecordKind::CaseFile => "case_file",
            RecordKind::CloseReasonGroup => "close_reason_group",
            RecordKind::CloseReason => "close_reason",
            RecordKind::Priority => "priority",
            RecordKind::Sla => "sla",
            RecordKind::SlaCondition => "sla_condition",
            RecordKind::Source => "source",
            RecordKind::Status => "status",
            RecordKind::StatusCondition => "status_condition",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted record: the JSON document plus its bookkeeping columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub ver: i32,
    pub data: Value,
}

/// Storage backend trait for case records
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Allocate the next record id (shared sequence across kinds)
    async fn next_id(&self) -> Result<i64, super::StorageError>;

    /// Get a record by kind and id
    async fn get_record(
        &self,
        kind: RecordKind,
        id: i64,
    ) -> Result<Option<StoredRecord>, super::StorageError>;

    /// List records of a kind, optionally restricted to one parent, ordered by id
    async fn list_records(
        &self,
        kind: RecordKind,
        parent_id: Option<i64>,
    ) -> Result<Vec<StoredRecord>, super::StorageError>;

    /// Insert a new record. The stored version always starts at 1.
    async fn insert_record(
        &self,
        kind: RecordKind,
        record: StoredRecord,
    ) -> Result<StoredRecord, super::StorageError>;

    /// Replace a record's document with optimistic locking, bumping its version
    async fn update_record(
        &self,
        kind: RecordKind,
        id: i64,
        data: Value,
        expected_version: Option<i32>,
    ) -> Result<StoredRecord, super::StorageError>;

    /// Delete a record with optimistic locking, returning what was removed
    async fn delete_record(
        &self,
        kind: RecordKind,
        id: i64,
        expected_version: Option<i32>,
    ) -> Result<StoredRecord, super::StorageError>;

    /// Delete every record of a kind that belongs to the given parent
    async fn delete_children(
        &self,
        kind: RecordKind,
        parent_id: i64,
    ) -> Result<u64, super::StorageError>;

    /// Liveness probe used by the health endpoint
    async fn ping(&self) -> Result<(), super::StorageError> {
        Ok(())
    }
}

/// Caller identity for storage operations, taken from the access token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: i64,
    pub name: String,
}

impl UserContext {
    /// The caller as a reference for `created_by` / `updated_by` fields.
    pub fn lookup(&self) -> crate::models::Lookup {
        crate::models::Lookup::new(self.user_id, self.name.clone())
    }
}
