//! Links between cases and communications (calls, chats, emails).

use super::error::{ServiceError, ServiceResult};
use super::field_mask::from_input;
use super::query::ListQuery;
use crate::models::{Case, CaseCommunication, Entity, Page, RecordRef};
use crate::storage::{RecordKind, Repository, StorageBackend, StorageError, UserContext};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub struct CommunicationService {
    cases: Repository<Case>,
    links: Repository<CaseCommunication>,
}

impl CommunicationService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            cases: Repository::new(storage.clone()),
            links: Repository::new(storage),
        }
    }

    /// All communications linked to a case, oldest first.
    pub async fn all(&self, case_id: i64) -> ServiceResult<Vec<CaseCommunication>> {
        self.cases.require(case_id).await?;
        Ok(self.links.list(Some(case_id)).await?)
    }

    pub async fn list(&self, case_id: i64, query: &ListQuery) -> ServiceResult<Page<Value>> {
        query.apply(self.all(case_id).await?)
    }

    pub async fn link(
        &self,
        case_id: i64,
        inputs: &[Value],
        user: &UserContext,
    ) -> ServiceResult<Vec<CaseCommunication>> {
        let existing = self.all(case_id).await?;
        if inputs.is_empty() {
            return Err(ServiceError::validation("At least one communication is required"));
        }

        let now = Utc::now();
        let mut batch: Vec<CaseCommunication> = Vec::with_capacity(inputs.len());
        for input in inputs {
            let mut link: CaseCommunication = from_input(input)?;
            link.sanitize().map_err(ServiceError::Validation)?;
            if existing.iter().chain(&batch).any(|l| l.same_link(&link)) {
                return Err(ServiceError::Conflict(format!(
                    "Communication {} is already linked to case {}",
                    link.communication_id, case_id
                )));
            }
            link.audit_mut().stamp_created(user, now);
            batch.push(link);
        }

        let mut created = Vec::with_capacity(batch.len());
        for link in batch {
            let link = self.links.insert(Some(case_id), link).await?;
            info!(
                "Linked communication {} to case {}",
                link.communication_id, case_id
            );
            created.push(link);
        }
        Ok(created)
    }

    /// Remove a link, returning the number of links removed.
    pub async fn unlink(&self, case_id: i64, target: RecordRef) -> ServiceResult<u64> {
        self.cases.require(case_id).await?;
        let link = self.links.require(target.id).await?;
        if link.case_id != case_id {
            return Err(StorageError::not_found(RecordKind::CaseCommunication.as_str(), target.id).into());
        }
        self.links.delete(target.id, target.ver).await?;
        info!(
            "Unlinked communication {} from case {}",
            link.communication_id, case_id
        );
        Ok(1)
    }
}
