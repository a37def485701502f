//! Cases: search, locate, create, update and delete.

use super::comment_service::CommentService;
use super::communication_service::CommunicationService;
use super::error::{ServiceError, ServiceResult};
use super::field_mask::{UpdateMode, from_input, merge};
use super::file_service::FileService;
use super::query::{ListParams, ListQuery, PageLimits, project};
use super::related_case_service::RelatedCaseService;
use crate::models::{
    Case, CaseComment, CaseCommunication, CaseFile, CloseReason, CloseReasonGroup, Entity, Lookup,
    Page, Priority, RecordRef, Sla, SlaCondition, Source, Status, StatusCondition,
};
use crate::storage::{Repository, StorageBackend, UserContext};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::IntoParams;

/// Query string of `GET /cases`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CaseSearchParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub fields: Option<String>,
    pub id: Option<String>,
    /// Comma-separated status ids
    pub status: Option<String>,
    /// Comma-separated priority ids
    pub priority: Option<String>,
    /// Comma-separated source ids
    pub source: Option<String>,
    /// Comma-separated assignee ids
    pub assignee: Option<String>,
    /// Comma-separated reporter ids
    pub reporter: Option<String>,
    /// Comma-separated SLA ids
    pub sla: Option<String>,
}

impl CaseSearchParams {
    pub fn to_query(&self, limits: PageLimits) -> ServiceResult<ListQuery> {
        let params = ListParams {
            page: self.page,
            size: self.size,
            q: self.q.clone(),
            sort: self.sort.clone(),
            fields: self.fields.clone(),
            id: self.id.clone(),
        };
        ListQuery::new(&params, limits)?
            .with_filter("status", self.status.as_deref())?
            .with_filter("priority", self.priority.as_deref())?
            .with_filter("source", self.source.as_deref())?
            .with_filter("assignee", self.assignee.as_deref())?
            .with_filter("reporter", self.reporter.as_deref())?
            .with_filter("sla", self.sla.as_deref())
    }
}

/// Sub-collections `LocateCase` can embed through `fields`.
pub const CASE_EMBEDS: &[&str] = &["comments", "related", "links", "files"];

pub struct CaseService {
    storage: Arc<dyn StorageBackend>,
    cases: Repository<Case>,
    name_prefix: String,
    limits: PageLimits,
}

/// Check that a referenced record exists and copy its name into the reference.
async fn resolve<T: Entity>(
    storage: &Arc<dyn StorageBackend>,
    field: &str,
    lookup: &mut Option<Lookup>,
) -> ServiceResult<Option<T>> {
    let Some(reference) = lookup.as_mut() else {
        return Ok(None);
    };
    let record = Repository::<T>::new(storage.clone())
        .get(reference.id)
        .await?
        .ok_or_else(|| ServiceError::missing_reference(field, reference.id))?;
    reference.name = record.label();
    Ok(Some(record))
}

impl CaseService {
    pub fn new(storage: Arc<dyn StorageBackend>, name_prefix: impl Into<String>, limits: PageLimits) -> Self {
        Self {
            cases: Repository::new(storage.clone()),
            storage,
            name_prefix: name_prefix.into(),
            limits,
        }
    }

    pub async fn search(&self, query: &ListQuery) -> ServiceResult<Page<Value>> {
        query.apply(self.cases.list(None).await?)
    }

    /// A case, projected to `fields`, with any named sub-collections embedded.
    pub async fn locate(
        &self,
        target: RecordRef,
        fields: &[String],
        user: &UserContext,
    ) -> ServiceResult<Value> {
        let case = self.cases.require(target.id).await?;
        let doc = serde_json::to_value(&case)
            .map_err(|e| ServiceError::validation(format!("Failed to encode case: {}", e)))?;
        let mut doc = project(doc, fields);

        let first_page = ListQuery::new(&ListParams::default(), self.limits)?;
        let wanted: Vec<&str> = CASE_EMBEDS
            .iter()
            .copied()
            .filter(|e| fields.iter().any(|f| f == e))
            .collect();
        for embed in wanted {
            let page = match embed {
                "comments" => {
                    CommentService::new(self.storage.clone())
                        .list(case.id, &first_page, user)
                        .await?
                }
                "related" => {
                    RelatedCaseService::new(self.storage.clone())
                        .list(case.id, &first_page)
                        .await?
                }
                "links" => {
                    CommunicationService::new(self.storage.clone())
                        .list(case.id, &first_page)
                        .await?
                }
                _ => {
                    FileService::new(self.storage.clone())
                        .list(case.id, &first_page)
                        .await?
                }
            };
            if let Value::Object(map) = &mut doc {
                map.insert(
                    embed.to_string(),
                    serde_json::to_value(page).unwrap_or(Value::Null),
                );
            }
        }
        Ok(doc)
    }

    pub async fn create(&self, input: &Value, user: &UserContext) -> ServiceResult<Case> {
        let mut case: Case = from_input(input)?;
        case.sanitize().map_err(ServiceError::Validation)?;
        if case.author.is_none() {
            case.author = Some(user.lookup());
        }
        case.audit_mut().stamp_created(user, Utc::now());
        self.apply_rules(&mut case).await?;

        let prefix = &self.name_prefix;
        let case = self
            .cases
            .insert_with(None, case, |c| c.name = format!("{}-{}", prefix, c.id))
            .await?;
        info!("Created case {} ({})", case.id, case.name);
        Ok(case)
    }

    pub async fn update(
        &self,
        target: RecordRef,
        input: &Value,
        mode: &UpdateMode,
        user: &UserContext,
    ) -> ServiceResult<Case> {
        let current = self.cases.require(target.id).await?;
        let mask = mode.mask(input, Case::MUTABLE_FIELDS)?;
        let mut case = merge(&current, input, &mask)?;
        case.sanitize().map_err(ServiceError::Validation)?;
        if case.author.is_none() {
            case.author = current.author.clone();
        }
        let status_changed =
            case.status.as_ref().map(|s| s.id) != current.status.as_ref().map(|s| s.id);
        let condition_named = mask
            .iter()
            .any(|path| path.split('.').next() == Some("status_condition"));
        if status_changed && !condition_named {
            // Fall back to the new status's initial condition.
            case.status_condition = None;
        }
        case.audit_mut().stamp_updated(user, Utc::now());
        self.apply_rules(&mut case).await?;

        let updated = self.cases.update(&case, target.ver).await?;
        info!("Updated case {} to version {}", updated.id, updated.ver);
        Ok(updated)
    }

    /// Delete a case together with its comments, communications, files and relations.
    pub async fn delete(&self, target: RecordRef) -> ServiceResult<Case> {
        let removed = self.cases.delete(target.id, target.ver).await?;
        let id = removed.id;
        let comments = Repository::<CaseComment>::new(self.storage.clone())
            .delete_children(id)
            .await?;
        let links = Repository::<CaseCommunication>::new(self.storage.clone())
            .delete_children(id)
            .await?;
        let files = Repository::<CaseFile>::new(self.storage.clone())
            .delete_children(id)
            .await?;
        let relations = RelatedCaseService::new(self.storage.clone())
            .delete_all_for(id)
            .await?;
        info!(
            "Deleted case {} ({} comments, {} communications, {} files, {} relations)",
            id, comments, links, files, relations
        );
        Ok(removed)
    }

    /// Check references, pick the status condition and derive SLA deadlines.
    async fn apply_rules(&self, case: &mut Case) -> ServiceResult<()> {
        let storage = &self.storage;
        resolve::<Source>(storage, "Source", &mut case.source).await?;
        resolve::<Priority>(storage, "Priority", &mut case.priority).await?;
        let status = resolve::<Status>(storage, "Status", &mut case.status)
            .await?
            .ok_or_else(|| ServiceError::validation("Case status is required"))?;
        let group = resolve::<CloseReasonGroup>(
            storage,
            "Close reason group",
            &mut case.close_reason_group,
        )
        .await?;

        let conditions = Repository::<StatusCondition>::new(storage.clone())
            .list(Some(status.id))
            .await?;
        let condition = match &case.status_condition {
            None => conditions.iter().find(|c| c.initial).ok_or_else(|| {
                ServiceError::validation(format!("Status {} has no initial condition", status.id))
            })?,
            Some(wanted) => conditions.iter().find(|c| c.id == wanted.id).ok_or_else(|| {
                ServiceError::validation(format!(
                    "Status condition {} does not belong to status {}",
                    wanted.id, status.id
                ))
            })?,
        };
        case.status_condition = Some(Lookup::new(condition.id, condition.name.clone()));

        if condition.is_final {
            let group = group.ok_or_else(|| {
                ServiceError::validation("close_reason_group is required to close a case")
            })?;
            let reason_id = case
                .close_reason()
                .map(|r| r.id)
                .ok_or_else(|| ServiceError::validation("close.close_reason is required to close a case"))?;
            let reasons = Repository::<CloseReason>::new(storage.clone());
            let reason = reasons
                .get(reason_id)
                .await?
                .filter(|r| r.close_reason_group_id == group.id)
                .ok_or_else(|| {
                    warn!(
                        "Close reason {} is not part of group {}",
                        reason_id, group.id
                    );
                    ServiceError::validation(format!(
                        "Close reason {} does not belong to close reason group {}",
                        reason_id, group.id
                    ))
                })?;
            if let Some(close) = case.close.as_mut() {
                close.close_reason = Some(Lookup::new(reason.id, reason.name));
            }
        }

        self.apply_sla(case).await
    }

    async fn apply_sla(&self, case: &mut Case) -> ServiceResult<()> {
        let storage = &self.storage;
        let Some(sla) = resolve::<Sla>(storage, "SLA", &mut case.sla).await? else {
            case.sla_condition = None;
            case.planned_reaction_at = None;
            case.planned_resolve_at = None;
            return Ok(());
        };

        let priority_id = case.priority.as_ref().map(|p| p.id);
        let condition = match priority_id {
            Some(pid) => Repository::<SlaCondition>::new(storage.clone())
                .list(Some(sla.id))
                .await?
                .into_iter()
                .find(|c| c.covers(pid)),
            None => None,
        };
        let (reaction, resolution) = condition
            .as_ref()
            .map(|c| (c.reaction_time, c.resolution_time))
            .unwrap_or((sla.reaction_time, sla.resolution_time));
        case.sla_condition = condition.map(|c| Lookup::new(c.id, c.name));

        let start = case.audit.created_at.unwrap_or_else(Utc::now);
        case.planned_reaction_at = Some(deadline(start, reaction, "reaction_time")?);
        case.planned_resolve_at = Some(deadline(start, resolution, "resolution_time")?);
        Ok(())
    }
}

/// `start` plus `minutes`, rejecting spans the calendar cannot hold.
fn deadline(start: DateTime<Utc>, minutes: i64, field: &str) -> ServiceResult<DateTime<Utc>> {
    TimeDelta::try_minutes(minutes)
        .and_then(|span| start.checked_add_signed(span))
        .ok_or_else(|| {
            warn!("SLA {} of {} minutes is out of range", field, minutes);
            ServiceError::validation(format!(
                "SLA {} of {} minutes is out of range",
                field, minutes
            ))
        })
}
