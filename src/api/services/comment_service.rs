//! Case comments. Only the author of a comment may change or remove it.

use super::error::{ServiceError, ServiceResult};
use super::field_mask::{UpdateMode, from_input, merge};
use super::query::ListQuery;
use crate::models::{Case, CaseComment, Entity, Page, RecordRef};
use crate::storage::{Repository, StorageBackend, UserContext};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub struct CommentService {
    cases: Repository<Case>,
    comments: Repository<CaseComment>,
}

/// Set the per-caller `can_edit` flag.
fn for_caller(mut comment: CaseComment, user: &UserContext) -> CaseComment {
    comment.can_edit = comment.is_authored_by(user.user_id);
    comment
}

impl CommentService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            cases: Repository::new(storage.clone()),
            comments: Repository::new(storage),
        }
    }

    pub async fn list(
        &self,
        case_id: i64,
        query: &ListQuery,
        user: &UserContext,
    ) -> ServiceResult<Page<Value>> {
        self.cases.require(case_id).await?;
        let comments = self
            .comments
            .list(Some(case_id))
            .await?
            .into_iter()
            .map(|c| for_caller(c, user))
            .collect();
        query.apply(comments)
    }

    /// Publish one or more comments on a case.
    pub async fn publish(
        &self,
        case_id: i64,
        inputs: &[Value],
        user: &UserContext,
    ) -> ServiceResult<Vec<CaseComment>> {
        self.cases.require(case_id).await?;
        if inputs.is_empty() {
            return Err(ServiceError::validation("At least one comment is required"));
        }
        let now = Utc::now();
        let mut prepared = Vec::with_capacity(inputs.len());
        for input in inputs {
            let mut comment: CaseComment = from_input(input)?;
            comment.sanitize().map_err(ServiceError::Validation)?;
            comment.author = Some(user.lookup());
            comment.audit_mut().stamp_created(user, now);
            prepared.push(comment);
        }

        let mut created = Vec::with_capacity(prepared.len());
        for comment in prepared {
            let comment = self.comments.insert(Some(case_id), comment).await?;
            info!("Published comment {} on case {}", comment.id, case_id);
            created.push(for_caller(comment, user));
        }
        Ok(created)
    }

    pub async fn locate(&self, target: RecordRef, user: &UserContext) -> ServiceResult<CaseComment> {
        Ok(for_caller(self.comments.require(target.id).await?, user))
    }

    async fn require_author(&self, target: RecordRef, user: &UserContext) -> ServiceResult<CaseComment> {
        let comment = self.comments.require(target.id).await?;
        if !comment.is_authored_by(user.user_id) {
            warn!(
                "User {} tried to modify comment {} of another author",
                user.user_id, comment.id
            );
            return Err(ServiceError::Forbidden(
                "Only the author can modify this comment".to_string(),
            ));
        }
        Ok(comment)
    }

    pub async fn update(
        &self,
        target: RecordRef,
        input: &Value,
        mode: &UpdateMode,
        user: &UserContext,
    ) -> ServiceResult<CaseComment> {
        let current = self.require_author(target, user).await?;
        let mask = mode.mask(input, CaseComment::MUTABLE_FIELDS)?;
        let mut comment = merge(&current, input, &mask)?;
        comment.sanitize().map_err(ServiceError::Validation)?;
        comment.edited = true;
        comment.can_edit = false;
        comment.audit_mut().stamp_updated(user, Utc::now());

        let updated = self.comments.update(&comment, target.ver).await?;
        info!("Updated comment {}", updated.id);
        Ok(for_caller(updated, user))
    }

    pub async fn delete(&self, target: RecordRef, user: &UserContext) -> ServiceResult<CaseComment> {
        self.require_author(target, user).await?;
        let removed = self.comments.delete(target.id, target.ver).await?;
        info!("Deleted comment {} of case {}", removed.id, removed.case_id);
        Ok(for_caller(removed, user))
    }
}
