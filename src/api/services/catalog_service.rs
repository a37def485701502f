//! CRUD for the case catalogs: priorities, sources, statuses and their
//! conditions, close reason groups and reasons, SLAs and their conditions.

use super::error::{ServiceError, ServiceResult};
use super::field_mask::{UpdateMode, from_input, merge};
use super::query::ListQuery;
use crate::models::{
    CloseReason, CloseReasonGroup, Entity, Lookup, Page, Priority, Sla, SlaCondition, Source,
    Status, StatusCondition,
};
use crate::storage::{RecordKind, Repository, StorageBackend, StorageError, UserContext};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Rules a catalog record type adds on top of plain CRUD.
#[async_trait]
pub trait CatalogRules: Entity {
    /// Kind of the parent record, for child catalogs.
    const PARENT: Option<RecordKind> = None;
    /// Child kinds removed together with a record.
    const CHILDREN: &'static [RecordKind] = &[];

    /// Check a record about to be written. `previous` is `None` on create.
    async fn validate(
        _storage: &Arc<dyn StorageBackend>,
        _parent_id: Option<i64>,
        _previous: Option<&Self>,
        _record: &mut Self,
    ) -> ServiceResult<()> {
        Ok(())
    }

    async fn after_write(_storage: &Arc<dyn StorageBackend>, _record: &Self) -> ServiceResult<()> {
        Ok(())
    }

    async fn before_delete(_storage: &Arc<dyn StorageBackend>, _record: &Self) -> ServiceResult<()> {
        Ok(())
    }
}

#[async_trait]
impl CatalogRules for Priority {}

#[async_trait]
impl CatalogRules for Source {}

#[async_trait]
impl CatalogRules for CloseReasonGroup {
    const CHILDREN: &'static [RecordKind] = &[RecordKind::CloseReason];
}

#[async_trait]
impl CatalogRules for CloseReason {
    const PARENT: Option<RecordKind> = Some(RecordKind::CloseReasonGroup);
}

#[async_trait]
impl CatalogRules for Sla {
    const CHILDREN: &'static [RecordKind] = &[RecordKind::SlaCondition];
}

#[async_trait]
impl CatalogRules for Status {
    const CHILDREN: &'static [RecordKind] = &[RecordKind::StatusCondition];
}

#[async_trait]
impl CatalogRules for StatusCondition {
    const PARENT: Option<RecordKind> = Some(RecordKind::Status);

    async fn validate(
        storage: &Arc<dyn StorageBackend>,
        parent_id: Option<i64>,
        previous: Option<&Self>,
        record: &mut Self,
    ) -> ServiceResult<()> {
        let siblings = Repository::<StatusCondition>::new(storage.clone())
            .list(parent_id)
            .await?;
        match previous {
            // The first condition of a status is where its cases start.
            None if siblings.is_empty() => record.initial = true,
            Some(prev) if prev.initial && !record.initial => {
                return Err(ServiceError::validation(
                    "A status must keep an initial condition; mark another condition initial instead",
                ));
            }
            _ => {}
        }
        if record.initial && record.is_final {
            return Err(ServiceError::validation(
                "A status condition cannot be both initial and final",
            ));
        }
        Ok(())
    }

    async fn after_write(storage: &Arc<dyn StorageBackend>, record: &Self) -> ServiceResult<()> {
        if !record.initial {
            return Ok(());
        }
        let repo = Repository::<StatusCondition>::new(storage.clone());
        for mut other in repo.list(Some(record.status_id)).await? {
            if other.id != record.id && other.initial {
                other.initial = false;
                repo.update(&other, None).await?;
                info!(
                    "Status condition {} is no longer initial for status {}",
                    other.id, record.status_id
                );
            }
        }
        Ok(())
    }

    async fn before_delete(storage: &Arc<dyn StorageBackend>, record: &Self) -> ServiceResult<()> {
        if !record.initial {
            return Ok(());
        }
        let others = Repository::<StatusCondition>::new(storage.clone())
            .list(Some(record.status_id))
            .await?
            .into_iter()
            .filter(|c| c.id != record.id)
            .count();
        if others > 0 {
            return Err(ServiceError::Conflict(
                "The initial condition cannot be deleted while the status has other conditions"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRules for SlaCondition {
    const PARENT: Option<RecordKind> = Some(RecordKind::Sla);

    async fn validate(
        storage: &Arc<dyn StorageBackend>,
        parent_id: Option<i64>,
        previous: Option<&Self>,
        record: &mut Self,
    ) -> ServiceResult<()> {
        let priorities = Repository::<Priority>::new(storage.clone());
        for lookup in record.priorities.iter_mut() {
            let priority = priorities
                .get(lookup.id)
                .await?
                .ok_or_else(|| ServiceError::missing_reference("Priority", lookup.id))?;
            *lookup = Lookup::new(priority.id, priority.name);
        }

        let own_id = previous.map(|p| p.id);
        let taken: HashSet<i64> = Repository::<SlaCondition>::new(storage.clone())
            .list(parent_id)
            .await?
            .into_iter()
            .filter(|c| Some(c.id) != own_id)
            .flat_map(|c| c.priorities.into_iter().map(|p| p.id))
            .collect();
        if let Some(dup) = record.priorities.iter().find(|p| taken.contains(&p.id)) {
            return Err(ServiceError::Conflict(format!(
                "Priority {} already has a condition in this SLA",
                dup.id
            )));
        }
        Ok(())
    }
}

/// Generic catalog CRUD over one record type.
pub struct CatalogService<T> {
    storage: Arc<dyn StorageBackend>,
    repo: Repository<T>,
}

impl<T: CatalogRules> CatalogService<T> {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            repo: Repository::new(storage.clone()),
            storage,
        }
    }

    async fn check_parent(&self, parent_id: Option<i64>) -> ServiceResult<()> {
        if let (Some(kind), Some(id)) = (T::PARENT, parent_id)
            && self.storage.get_record(kind, id).await?.is_none()
        {
            return Err(StorageError::not_found(kind.as_str(), id).into());
        }
        Ok(())
    }

    /// Fetch a record, requiring it to belong to `parent_id` for child catalogs.
    pub async fn locate(&self, parent_id: Option<i64>, id: i64) -> ServiceResult<T> {
        self.check_parent(parent_id).await?;
        if T::PARENT.is_some() && self.repo.parent_of(id).await? != parent_id {
            return Err(StorageError::not_found(T::KIND.as_str(), id).into());
        }
        Ok(self.repo.require(id).await?)
    }

    pub async fn list(&self, parent_id: Option<i64>, query: &ListQuery) -> ServiceResult<Page<Value>> {
        self.check_parent(parent_id).await?;
        let records = self.repo.list(parent_id).await?;
        query.apply(records)
    }

    pub async fn create(
        &self,
        parent_id: Option<i64>,
        input: &Value,
        user: &UserContext,
    ) -> ServiceResult<T> {
        self.check_parent(parent_id).await?;
        let mut record: T = from_input(input)?;
        if let Some(parent) = parent_id {
            record.attach_to(parent);
        }
        record.sanitize().map_err(ServiceError::Validation)?;
        T::validate(&self.storage, parent_id, None, &mut record).await?;
        record.audit_mut().stamp_created(user, Utc::now());

        let created = self.repo.insert(parent_id, record).await?;
        T::after_write(&self.storage, &created).await?;
        info!("Created {} {}", T::KIND, created.id());
        Ok(created)
    }

    pub async fn update(
        &self,
        parent_id: Option<i64>,
        id: i64,
        input: &Value,
        mode: &UpdateMode,
        user: &UserContext,
    ) -> ServiceResult<T> {
        let current = self.locate(parent_id, id).await?;
        let mask = mode.mask(input, T::MUTABLE_FIELDS)?;
        let mut record = merge(&current, input, &mask)?;
        record.sanitize().map_err(ServiceError::Validation)?;
        T::validate(&self.storage, parent_id, Some(&current), &mut record).await?;
        record.audit_mut().stamp_updated(user, Utc::now());

        let updated = self.repo.update(&record, None).await?;
        T::after_write(&self.storage, &updated).await?;
        info!("Updated {} {} ({} fields)", T::KIND, id, mask.len());
        Ok(updated)
    }

    /// Delete a record and its children.
    pub async fn delete(&self, parent_id: Option<i64>, id: i64) -> ServiceResult<T> {
        let current = self.locate(parent_id, id).await?;
        T::before_delete(&self.storage, &current).await?;
        let removed = self.repo.delete(id, None).await?;
        for child in T::CHILDREN {
            let count = self.storage.delete_children(*child, id).await?;
            if count > 0 {
                info!("Deleted {} {} record(s) of {} {}", count, child, T::KIND, id);
            }
        }
        info!("Deleted {} {}", T::KIND, id);
        Ok(removed)
    }
}
