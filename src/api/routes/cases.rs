//! Case routes: search, locate, create, update and delete.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use utoipa::IntoParams;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiResult;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{Case, Page, RecordRef};
use crate::services::field_mask::parse_list;
use crate::services::{CaseSearchParams, UpdateMode};
use crate::storage::RecordKind;

/// Query parameters for GET /cases/{case_etag}
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocateParams {
    /// Comma-separated fields; `comments`, `related`, `links` and `files` embed sub-collections
    pub fields: Option<String>,
}

/// Query parameters for PATCH requests
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatchParams {
    /// Comma-separated field paths to update
    pub x_json_mask: Option<String>,
}

impl PatchParams {
    pub fn mode(self) -> UpdateMode {
        UpdateMode::Patch {
            mask: self.x_json_mask,
        }
    }
}

/// Parse a case reference from a path segment (etag or numeric id).
pub fn case_ref(segment: &str) -> ApiResult<RecordRef> {
    Ok(RecordRef::parse(segment, RecordKind::Case)?)
}

/// Create the cases router
pub fn cases_router() -> Router<AppState> {
    Router::new()
        .route("/cases", get(search_cases).post(create_case))
        .route(
            "/cases/{case_etag}",
            get(locate_case)
                .put(update_case)
                .patch(patch_case)
                .delete(delete_case),
        )
}

/// GET /cases - Search cases
#[utoipa::path(
    get,
    path = "/cases",
    tag = "Cases",
    params(CaseSearchParams),
    responses(
        (status = 200, description = "Page of cases", body = Object),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_cases(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiQuery(params): ApiQuery<CaseSearchParams>,
) -> ApiResult<Json<Page<Value>>> {
    let query = params.to_query(state.page_limits())?;
    Ok(Json(state.cases().search(&query).await?))
}

/// GET /cases/{case_etag} - Locate a case
#[utoipa::path(
    get,
    path = "/cases/{case_etag}",
    tag = "Cases",
    params(
        ("case_etag" = String, Path, description = "Case etag or id"),
        LocateParams
    ),
    responses(
        (status = 200, description = "The case", body = Case),
        (status = 404, description = "Case not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn locate_case(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiQuery(params): ApiQuery<LocateParams>,
) -> ApiResult<Json<Value>> {
    let target = case_ref(&case_etag)?;
    let fields = parse_list(params.fields.as_deref());
    Ok(Json(state.cases().locate(target, &fields, &auth.user).await?))
}

/// POST /cases - Create a case
#[utoipa::path(
    post,
    path = "/cases",
    tag = "Cases",
    request_body = Case,
    responses(
        (status = 200, description = "Case created", body = Case),
        (status = 400, description = "Invalid case")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_case(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<Case>> {
    let case = state.cases().create(&body, &auth.user).await?;
    info!("[POST /cases] User {} created case {}", auth.user.user_id, case.id);
    Ok(Json(case))
}

/// PUT /cases/{case_etag} - Replace a case's fields
#[utoipa::path(
    put,
    path = "/cases/{case_etag}",
    tag = "Cases",
    params(("case_etag" = String, Path, description = "Case etag or id")),
    request_body = Case,
    responses(
        (status = 200, description = "Case updated", body = Case),
        (status = 409, description = "Stale etag")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_case(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<Case>> {
    let target = case_ref(&case_etag)?;
    let case = state
        .cases()
        .update(target, &body, &UpdateMode::Replace, &auth.user)
        .await?;
    Ok(Json(case))
}

/// PATCH /cases/{case_etag} - Update the masked fields of a case
#[utoipa::path(
    patch,
    path = "/cases/{case_etag}",
    tag = "Cases",
    params(
        ("case_etag" = String, Path, description = "Case etag or id"),
        PatchParams
    ),
    request_body = Case,
    responses(
        (status = 200, description = "Case updated", body = Case),
        (status = 409, description = "Stale etag")
    ),
    security(("bearer_auth" = []))
)]
pub async fn patch_case(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiQuery(params): ApiQuery<PatchParams>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<Case>> {
    let target = case_ref(&case_etag)?;
    let case = state
        .cases()
        .update(target, &body, &params.mode(), &auth.user)
        .await?;
    Ok(Json(case))
}

/// DELETE /cases/{case_etag} - Delete a case and everything under it
#[utoipa::path(
    delete,
    path = "/cases/{case_etag}",
    tag = "Cases",
    params(("case_etag" = String, Path, description = "Case etag or id")),
    responses(
        (status = 200, description = "Deleted case", body = Case),
        (status = 404, description = "Case not found"),
        (status = 409, description = "Stale etag")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_case(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
) -> ApiResult<Json<Case>> {
    let target = case_ref(&case_etag)?;
    let case = state.cases().delete(target).await?;
    info!("[DELETE /cases] User {} deleted case {}", auth.user.user_id, case.id);
    Ok(Json(case))
}
