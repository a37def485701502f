//! Case comment routes.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::get,
};
use serde_json::Value;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::cases::{PatchParams, case_ref};
use super::error::ApiResult;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{CaseComment, Page, RecordRef};
use crate::services::{ListParams, ListQuery, UpdateMode};
use crate::storage::RecordKind;

fn comment_ref(segment: &str) -> ApiResult<RecordRef> {
    Ok(RecordRef::parse(segment, RecordKind::CaseComment)?)
}

/// Create the comments router
pub fn comments_router() -> Router<AppState> {
    Router::new()
        .route(
            "/cases/{case_etag}/comments",
            get(list_comments).post(publish_comments),
        )
        .route(
            "/cases/comments/{etag}",
            get(locate_comment)
                .put(update_comment)
                .patch(patch_comment)
                .delete(delete_comment),
        )
}

/// GET /cases/{case_etag}/comments - List comments of a case
#[utoipa::path(
    get,
    path = "/cases/{case_etag}/comments",
    tag = "Comments",
    params(("case_etag" = String, Path, description = "Case etag or id"), ListParams),
    responses((status = 200, description = "Page of comments", body = Object)),
    security(("bearer_auth" = []))
)]
pub async fn list_comments(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Page<Value>>> {
    let case = case_ref(&case_etag)?;
    let query = ListQuery::new(&params, state.page_limits())?;
    Ok(Json(state.comments().list(case.id, &query, &auth.user).await?))
}

/// POST /cases/{case_etag}/comments - Publish comments
#[utoipa::path(
    post,
    path = "/cases/{case_etag}/comments",
    tag = "Comments",
    params(("case_etag" = String, Path, description = "Case etag or id")),
    request_body = Vec<CaseComment>,
    responses((status = 200, description = "Published comments", body = Vec<CaseComment>)),
    security(("bearer_auth" = []))
)]
pub async fn publish_comments(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiJson(body): ApiJson<Vec<Value>>,
) -> ApiResult<Json<Vec<CaseComment>>> {
    let case = case_ref(&case_etag)?;
    Ok(Json(state.comments().publish(case.id, &body, &auth.user).await?))
}

/// GET /cases/comments/{etag} - Locate a comment
#[utoipa::path(
    get,
    path = "/cases/comments/{etag}",
    tag = "Comments",
    params(("etag" = String, Path, description = "Comment etag or id")),
    responses(
        (status = 200, description = "The comment", body = CaseComment),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn locate_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(etag): ApiPath<String>,
) -> ApiResult<Json<CaseComment>> {
    let target = comment_ref(&etag)?;
    Ok(Json(state.comments().locate(target, &auth.user).await?))
}

/// PUT /cases/comments/{etag} - Replace a comment's text
#[utoipa::path(
    put,
    path = "/cases/comments/{etag}",
    tag = "Comments",
    params(("etag" = String, Path, description = "Comment etag or id")),
    request_body = CaseComment,
    responses(
        (status = 200, description = "Comment updated", body = CaseComment),
        (status = 403, description = "Not the author"),
        (status = 409, description = "Stale etag")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(etag): ApiPath<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<CaseComment>> {
    let target = comment_ref(&etag)?;
    Ok(Json(
        state
            .comments()
            .update(target, &body, &UpdateMode::Replace, &auth.user)
            .await?,
    ))
}

/// PATCH /cases/comments/{etag} - Update the masked fields of a comment
#[utoipa::path(
    patch,
    path = "/cases/comments/{etag}",
    tag = "Comments",
    params(("etag" = String, Path, description = "Comment etag or id"), PatchParams),
    request_body = CaseComment,
    responses(
        (status = 200, description = "Comment updated", body = CaseComment),
        (status = 403, description = "Not the author")
    ),
    security(("bearer_auth" = []))
)]
pub async fn patch_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(etag): ApiPath<String>,
    ApiQuery(params): ApiQuery<PatchParams>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<CaseComment>> {
    let target = comment_ref(&etag)?;
    Ok(Json(
        state
            .comments()
            .update(target, &body, &params.mode(), &auth.user)
            .await?,
    ))
}

/// DELETE /cases/comments/{etag} - Delete a comment
#[utoipa::path(
    delete,
    path = "/cases/comments/{etag}",
    tag = "Comments",
    params(("etag" = String, Path, description = "Comment etag or id")),
    responses(
        (status = 200, description = "Deleted comment", body = CaseComment),
        (status = 403, description = "Not the author")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(etag): ApiPath<String>,
) -> ApiResult<Json<CaseComment>> {
    let target = comment_ref(&etag)?;
    Ok(Json(state.comments().delete(target, &auth.user).await?))
}
