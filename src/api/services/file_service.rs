//! Metadata of files attached to cases.

use super::error::{ServiceError, ServiceResult};
use super::field_mask::from_input;
use super::query::ListQuery;
use crate::models::{Case, CaseFile, Entity, Page};
use crate::storage::{RecordKind, Repository, StorageBackend, StorageError, UserContext};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub struct FileService {
    cases: Repository<Case>,
    files: Repository<CaseFile>,
}

impl FileService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            cases: Repository::new(storage.clone()),
            files: Repository::new(storage),
        }
    }

    pub async fn list(&self, case_id: i64, query: &ListQuery) -> ServiceResult<Page<Value>> {
        self.cases.require(case_id).await?;
        query.apply(self.files.list(Some(case_id)).await?)
    }

    pub async fn attach(
        &self,
        case_id: i64,
        input: &Value,
        user: &UserContext,
    ) -> ServiceResult<CaseFile> {
        self.cases.require(case_id).await?;
        let mut file: CaseFile = from_input(input)?;
        file.sanitize().map_err(ServiceError::Validation)?;
        file.audit_mut().stamp_created(user, Utc::now());
        let file = self.files.insert(Some(case_id), file).await?;
        info!("Attached file {} ({}) to case {}", file.id, file.name, case_id);
        Ok(file)
    }

    pub async fn delete(&self, case_id: i64, file_id: i64) -> ServiceResult<CaseFile> {
        self.cases.require(case_id).await?;
        let file = self.files.require(file_id).await?;
        if file.case_id != case_id {
            return Err(StorageError::not_found(RecordKind::CaseFile.as_str(), file_id).into());
        }
        let removed = self.files.delete(file_id, None).await?;
        info!("Deleted file {} of case {}", file_id, case_id);
        Ok(removed)
    }
}
