//! PostgreSQL storage backend implementation.
//!
//! Uses sqlx for database operations and implements the StorageBackend trait.
//! Every record kind shares the `case_records` table; the record body is kept
//! as JSONB next to its `ver` column.

use super::{StorageError, traits::*};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::info;

/// PostgreSQL storage backend implementation.
pub struct PostgresStorageBackend {
    pool: PgPool,
}

impl PostgresStorageBackend {
    /// Create a new PostgreSQL storage backend.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and run pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPool::connect(database_url).await.map_err(|e| {
            StorageError::ConnectionError(format!("Failed to connect to database: {}", e))
        })?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StorageError::ConnectionError(format!("Migration failed: {}", e)))?;

        info!("PostgreSQL storage initialized");
        Ok(Self::new(pool))
    }

    async fn current_version(&self, kind: RecordKind, id: i64) -> Result<Option<i32>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT ver FROM case_records WHERE kind = $1 AND id = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(|r| r.try_get::<i32, _>("ver").map_err(db_error))
            .transpose()
    }

    /// Turn an empty conditional write into the matching error.
    async fn missing_or_conflict(
        &self,
        kind: RecordKind,
        id: i64,
        expected_version: Option<i32>,
    ) -> StorageError {
        match self.current_version(kind, id).await {
            Ok(Some(current_version)) => StorageError::VersionConflict {
                entity_type: kind.to_string(),
                entity_id: id.to_string(),
                expected_version: expected_version.unwrap_or_default(),
                current_version,
            },
            Ok(None) => StorageError::not_found(kind.as_str(), id),
            Err(e) => e,
        }
    }
}

fn db_error(e: sqlx::Error) -> StorageError {
    StorageError::ConnectionError(e.to_string())
}

fn row_to_record(row: &PgRow) -> Result<StoredRecord, StorageError> {
    Ok(StoredRecord {
        id: row.try_get("id").map_err(db_error)?,
        parent_id: row.try_get("parent_id").map_err(db_error)?,
        ver: row.try_get("ver").map_err(db_error)?,
        data: row.try_get("data").map_err(db_error)?,
    })
}

#[async_trait]
impl StorageBackend for PostgresStorageBackend {
    async fn next_id(&self) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT nextval('case_records_id_seq') AS id")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        row.try_get("id").map_err(db_error)
    }

    async fn get_record(
        &self,
        kind: RecordKind,
        id: i64,
    ) -> Result<Option<StoredRecord>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, parent_id, ver, data
            FROM case_records
            WHERE kind = $1 AND id = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn list_records(
        &self,
        kind: RecordKind,
        parent_id: Option<i64>,
    ) -> Result<Vec<StoredRecord>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, parent_id, ver, data
            FROM case_records
            WHERE kind = $1 AND ($2::BIGINT IS NULL OR parent_id = $2)
            ORDER BY id
            "#,
        )
        .bind(kind.as_str())
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_record).collect()
    }

    async fn insert_record(
        &self,
        kind: RecordKind,
        record: StoredRecord,
    ) -> Result<StoredRecord, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO case_records (kind, id, parent_id, ver, data, created_at, updated_at)
            VALUES ($1, $2, $3, 1, $4, NOW(), NOW())
            RETURNING id, parent_id, ver, data
            "#,
        )
        .bind(kind.as_str())
        .bind(record.id)
        .bind(record.parent_id)
        .bind(&record.data)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row_to_record(&row)
    }

    async fn update_record(
        &self,
        kind: RecordKind,
        id: i64,
        data: Value,
        expected_version: Option<i32>,
    ) -> Result<StoredRecord, StorageError> {
        let row = sqlx::query(
            r#"
            UPDATE case_records
            SET data = $3, ver = ver + 1, updated_at = NOW()
            WHERE kind = $1 AND id = $2 AND ($4::INT IS NULL OR ver = $4)
            RETURNING id, parent_id, ver, data
            "#,
        )
        .bind(kind.as_str())
        .bind(id)
        .bind(&data)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => row_to_record(&row),
            None => Err(self.missing_or_conflict(kind, id, expected_version).await),
        }
    }

    async fn delete_record(
        &self,
        kind: RecordKind,
        id: i64,
        expected_version: Option<i32>,
    ) -> Result<StoredRecord, StorageError> {
        let row = sqlx::query(
            r#"
            DELETE FROM case_records
            WHERE kind = $1 AND id = $2 AND ($3::INT IS NULL OR ver = $3)
            RETURNING id, parent_id, ver, data
            "#,
        )
        .bind(kind.as_str())
        .bind(id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => row_to_record(&row),
            None => Err(self.missing_or_conflict(kind, id, expected_version).await),
        }
    }

    async fn delete_children(&self, kind: RecordKind, parent_id: i64) -> Result<u64, StorageError> {
        let result = sqlx::query(
            r#"
            DELETE FROM case_records WHERE kind = $1 AND parent_id = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(parent_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
