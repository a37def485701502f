//! Relations between cases.
//!
//! A relation is stored once, under its primary case, and is visible from
//! both cases. Seen from the related case, the sides are swapped and the
//! relation type is inverted.

use super::error::{ServiceError, ServiceResult};
use super::field_mask::{UpdateMode, from_input, merge};
use super::query::ListQuery;
use crate::graph::would_create_cycle;
use crate::models::{Case, Entity, Lookup, Page, RecordRef, RelatedCase};
use crate::storage::{RecordKind, Repository, StorageBackend, StorageError, UserContext};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub struct RelatedCaseService {
    cases: Repository<Case>,
    relations: Repository<RelatedCase>,
}

impl RelatedCaseService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            cases: Repository::new(storage.clone()),
            relations: Repository::new(storage),
        }
    }

    /// Every relation that involves `case_id`, as seen from that case.
    async fn visible_from(&self, case_id: i64) -> ServiceResult<Vec<RelatedCase>> {
        Ok(self
            .relations
            .list(None)
            .await?
            .into_iter()
            .filter_map(|r| view_from(r, case_id))
            .collect())
    }

    pub async fn list(&self, case_id: i64, query: &ListQuery) -> ServiceResult<Page<Value>> {
        self.cases.require(case_id).await?;
        query.apply(self.visible_from(case_id).await?)
    }

    /// Add relations from `case_id` to other cases.
    pub async fn merge(
        &self,
        case_id: i64,
        inputs: &[Value],
        user: &UserContext,
    ) -> ServiceResult<Vec<RelatedCase>> {
        if inputs.is_empty() {
            return Err(ServiceError::validation("At least one related case is required"));
        }
        let primary = self.cases.require(case_id).await?;
        let existing = self.relations.list(None).await?;
        let prepared = self.prepare(&primary, inputs, &existing, user).await?;
        self.insert_all(case_id, prepared).await
    }

    /// Replace the relations stored under `case_id` with the given set.
    /// An empty set clears them.
    pub async fn reset(
        &self,
        case_id: i64,
        inputs: &[Value],
        user: &UserContext,
    ) -> ServiceResult<Vec<RelatedCase>> {
        let primary = self.cases.require(case_id).await?;
        let kept: Vec<RelatedCase> = self
            .relations
            .list(None)
            .await?
            .into_iter()
            .filter(|r| r.primary_case.id != case_id)
            .collect();
        let prepared = self.prepare(&primary, inputs, &kept, user).await?;

        let removed = self.relations.delete_children(case_id).await?;
        info!("Reset relations of case {}: removed {}", case_id, removed);
        self.insert_all(case_id, prepared).await
    }

    async fn insert_all(
        &self,
        case_id: i64,
        prepared: Vec<RelatedCase>,
    ) -> ServiceResult<Vec<RelatedCase>> {
        let mut created = Vec::with_capacity(prepared.len());
        for rel in prepared {
            let rel = self.relations.insert(Some(case_id), rel).await?;
            info!(
                "Related case {} to case {} (relation {})",
                rel.related_case.id, case_id, rel.id
            );
            created.push(rel);
        }
        Ok(created)
    }

    /// Validate a batch of new relations against `existing` and each other.
    async fn prepare(
        &self,
        primary: &Case,
        inputs: &[Value],
        existing: &[RelatedCase],
        user: &UserContext,
    ) -> ServiceResult<Vec<RelatedCase>> {
        let now = Utc::now();
        let mut batch: Vec<RelatedCase> = Vec::with_capacity(inputs.len());
        for input in inputs {
            let mut rel: RelatedCase = from_input(input)?;
            rel.attach_to(primary.id);
            self.complete(primary, &mut rel).await?;
            if existing.iter().chain(&batch).any(|r| r.joins(primary.id, rel.related_case.id)) {
                return Err(ServiceError::Conflict(format!(
                    "Cases {} and {} are already related",
                    primary.id, rel.related_case.id
                )));
            }
            rel.audit_mut().stamp_created(user, now);
            batch.push(rel);
        }
        if would_create_cycle(existing, &batch) {
            warn!("Rejected relations of case {}: parent/child cycle", primary.id);
            return Err(ServiceError::validation(
                "Relations would make a case its own ancestor",
            ));
        }
        Ok(batch)
    }

    /// Check a relation and fill in the names of both cases.
    async fn complete(&self, primary: &Case, rel: &mut RelatedCase) -> ServiceResult<()> {
        rel.sanitize().map_err(ServiceError::Validation)?;
        let related = self
            .cases
            .get(rel.related_case.id)
            .await?
            .ok_or_else(|| ServiceError::missing_reference("Case", rel.related_case.id))?;
        rel.primary_case = Lookup::new(primary.id, primary.name.clone());
        rel.related_case = Lookup::new(related.id, related.name);
        Ok(())
    }

    async fn visible(&self, case_id: i64, target: RecordRef) -> ServiceResult<RelatedCase> {
        self.cases.require(case_id).await?;
        let rel = self.relations.require(target.id).await?;
        view_from(rel, case_id)
            .ok_or_else(|| StorageError::not_found(RecordKind::RelatedCase.as_str(), target.id).into())
    }

    pub async fn locate(&self, case_id: i64, target: RecordRef) -> ServiceResult<RelatedCase> {
        self.visible(case_id, target).await
    }

    /// Update a relation as seen from `case_id`.
    pub async fn update(
        &self,
        case_id: i64,
        target: RecordRef,
        input: &Value,
        mode: &UpdateMode,
        user: &UserContext,
    ) -> ServiceResult<RelatedCase> {
        let current = self.visible(case_id, target).await?;
        let inverted = self.relations.parent_of(target.id).await? != Some(case_id);

        let mask = mode.mask(input, RelatedCase::MUTABLE_FIELDS)?;
        let mut rel = merge(&current, input, &mask)?;
        if inverted && rel.related_case.id != current.related_case.id {
            return Err(ServiceError::validation(
                "Only the case that owns a relation can point it at another case",
            ));
        }
        let primary = self.cases.require(case_id).await?;
        self.complete(&primary, &mut rel).await?;

        let others: Vec<RelatedCase> = self
            .relations
            .list(None)
            .await?
            .into_iter()
            .filter(|r| r.id != rel.id)
            .collect();
        if others.iter().any(|r| r.joins(case_id, rel.related_case.id)) {
            return Err(ServiceError::Conflict(format!(
                "Cases {} and {} are already related",
                case_id, rel.related_case.id
            )));
        }
        if would_create_cycle(&others, std::slice::from_ref(&rel)) {
            return Err(ServiceError::validation(
                "Relations would make a case its own ancestor",
            ));
        }

        rel.audit_mut().stamp_updated(user, Utc::now());
        // Stored form always faces the case the relation lives under.
        let stored = if inverted { rel.inverted() } else { rel };
        let updated = self.relations.update(&stored, target.ver).await?;
        info!("Updated relation {} of case {}", updated.id, case_id);
        view_from(updated, case_id)
            .ok_or_else(|| StorageError::not_found(RecordKind::RelatedCase.as_str(), target.id).into())
    }

    pub async fn delete(&self, case_id: i64, target: RecordRef) -> ServiceResult<RelatedCase> {
        let current = self.visible(case_id, target).await?;
        self.relations.delete(target.id, target.ver).await?;
        info!("Deleted relation {} of case {}", target.id, case_id);
        Ok(current)
    }

    /// Remove every relation involving `case_id`, on either side.
    pub async fn delete_all_for(&self, case_id: i64) -> ServiceResult<u64> {
        let mut removed = self.relations.delete_children(case_id).await?;
        for rel in self.relations.list(None).await? {
            if rel.related_case.id == case_id {
                self.relations.delete(rel.id, None).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// The relation as seen from `case_id`, or `None` if it does not involve that case.
fn view_from(rel: RelatedCase, case_id: i64) -> Option<RelatedCase> {
    if rel.primary_case.id == case_id {
        Some(rel)
    } else if rel.related_case.id == case_id {
        Some(rel.inverted())
    } else {
        None
    }
}
