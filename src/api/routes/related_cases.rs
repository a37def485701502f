//! Related case routes, scoped to a case.

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
use crate::models::{Page, RecordRef, RelatedCase};
use crate::services::{ListParams, ListQuery, UpdateMode};
use crate::storage::RecordKind;

fn relation_ref(segment: &str) -> ApiResult<RecordRef> {
    Ok(RecordRef::parse(segment, RecordKind::RelatedCase)?)
}

/// Create the related cases router
pub fn related_cases_router() -> Router<AppState> {
    Router::new()
        .route(
            "/cases/{case_etag}/related",
            get(list_related_cases)
                .post(merge_related_cases)
                .put(reset_related_cases),
        )
        .route(
            "/cases/{case_etag}/related/{etag}",
            get(locate_related_case)
                .put(update_related_case)
                .patch(patch_related_case)
                .delete(delete_related_case),
        )
}

/// GET /cases/{case_etag}/related - List relations of a case
#[utoipa::path(
    get,
    path = "/cases/{case_etag}/related",
    tag = "Related cases",
    params(("case_etag" = String, Path, description = "Case etag or id"), ListParams),
    responses((status = 200, description = "Page of relations", body = Object)),
    security(("bearer_auth" = []))
)]
pub async fn list_related_cases(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Page<Value>>> {
    let case = case_ref(&case_etag)?;
    let query = ListQuery::new(&params, state.page_limits())?;
    Ok(Json(state.related_cases().list(case.id, &query).await?))
}

/// POST /cases/{case_etag}/related - Add relations
#[utoipa::path(
    post,
    path = "/cases/{case_etag}/related",
    tag = "Related cases",
    params(("case_etag" = String, Path, description = "Case etag or id")),
    request_body = Vec<RelatedCase>,
    responses(
        (status = 200, description = "Created relations", body = Vec<RelatedCase>),
        (status = 409, description = "Cases already related")
    ),
    security(("bearer_auth" = []))
)]
pub async fn merge_related_cases(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiJson(body): ApiJson<Vec<Value>>,
) -> ApiResult<Json<Vec<RelatedCase>>> {
    let case = case_ref(&case_etag)?;
    Ok(Json(
        state
            .related_cases()
            .merge(case.id, &body, &auth.user)
            .await?,
    ))
}

/// PUT /cases/{case_etag}/related - Replace the relations owned by a case
#[utoipa::path(
    put,
    path = "/cases/{case_etag}/related",
    tag = "Related cases",
    params(("case_etag" = String, Path, description = "Case etag or id")),
    request_body = Vec<RelatedCase>,
    responses((status = 200, description = "New relations", body = Vec<RelatedCase>)),
    security(("bearer_auth" = []))
)]
pub async fn reset_related_cases(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiJson(body): ApiJson<Vec<Value>>,
) -> ApiResult<Json<Vec<RelatedCase>>> {
    let case = case_ref(&case_etag)?;
    Ok(Json(
        state
            .related_cases()
            .reset(case.id, &body, &auth.user)
            .await?,
    ))
}

/// GET /cases/{case_etag}/related/{etag} - Locate a relation
#[utoipa::path(
    get,
    path = "/cases/{case_etag}/related/{etag}",
    tag = "Related cases",
    params(
        ("case_etag" = String, Path, description = "Case etag or id"),
        ("etag" = String, Path, description = "Relation etag or id")
    ),
    responses(
        (status = 200, description = "The relation", body = RelatedCase),
        (status = 404, description = "Relation not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn locate_related_case(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath((case_etag, etag)): ApiPath<(String, String)>,
) -> ApiResult<Json<RelatedCase>> {
    let case = case_ref(&case_etag)?;
    let target = relation_ref(&etag)?;
    Ok(Json(state.related_cases().locate(case.id, target).await?))
}

/// PUT /cases/{case_etag}/related/{etag} - Replace a relation
#[utoipa::path(
    put,
    path = "/cases/{case_etag}/related/{etag}",
    tag = "Related cases",
    params(
        ("case_etag" = String, Path, description = "Case etag or id"),
        ("etag" = String, Path, description = "Relation etag or id")
    ),
    request_body = RelatedCase,
    responses((status = 200, description = "Relation updated", body = RelatedCase)),
    security(("bearer_auth" = []))
)]
pub async fn update_related_case(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((case_etag, etag)): ApiPath<(String, String)>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<RelatedCase>> {
    let case = case_ref(&case_etag)?;
    let target = relation_ref(&etag)?;
    Ok(Json(
        state
            .related_cases()
            .update(case.id, target, &body, &UpdateMode::Replace, &auth.user)
            .await?,
    ))
}

/// PATCH /cases/{case_etag}/related/{etag} - Update the masked fields of a relation
#[utoipa::path(
    patch,
    path = "/cases/{case_etag}/related/{etag}",
    tag = "Related cases",
    params(
        ("case_etag" = String, Path, description = "Case etag or id"),
        ("etag" = String, Path, description = "Relation etag or id"),
        PatchParams
    ),
    request_body = RelatedCase,
    responses((status = 200, description = "Relation updated", body = RelatedCase)),
    security(("bearer_auth" = []))
)]
pub async fn patch_related_case(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((case_etag, etag)): ApiPath<(String, String)>,
    ApiQuery(params): ApiQuery<PatchParams>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<RelatedCase>> {
    let case = case_ref(&case_etag)?;
    let target = relation_ref(&etag)?;
    Ok(Json(
        state
            .related_cases()
            .update(case.id, target, &body, &params.mode(), &auth.user)
            .await?,
    ))
}

/// DELETE /cases/{case_etag}/related/{etag} - Remove a relation
#[utoipa::path(
    delete,
    path = "/cases/{case_etag}/related/{etag}",
    tag = "Related cases",
    params(
        ("case_etag" = String, Path, description = "Case etag or id"),
        ("etag" = String, Path, description = "Relation etag or id")
    ),
    responses(
        (status = 200, description = "Removed relation", body = RelatedCase),
        (status = 409, description = "Stale etag")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_related_case(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath((case_etag, etag)): ApiPath<(String, String)>,
) -> ApiResult<Json<RelatedCase>> {
    let case = case_ref(&case_etag)?;
    let target = relation_ref(&etag)?;
    Ok(Json(state.related_cases().delete(case.id, target).await?))
}
