//! Case file routes. File content lives in the file storage service; these
//! routes manage the metadata attached to a case.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{delete, get},
};
use serde_json::Value;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::cases::case_ref;
use super::error::ApiResult;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{CaseFile, Page};
use crate::services::{ListParams, ListQuery};

/// Create the files router
pub fn files_router() -> Router<AppState> {
    Router::new()
        .route("/cases/{case_etag}/files", get(list_files).post(attach_file))
        .route("/cases/{case_etag}/files/{id}", delete(delete_file))
}

/// GET /cases/{case_etag}/files - List files of a case
#[utoipa::path(
    get,
    path = "/cases/{case_etag}/files",
    tag = "Files",
    params(("case_etag" = String, Path, description = "Case etag or id"), ListParams),
    responses((status = 200, description = "Page of files", body = Object)),
    security(("bearer_auth" = []))
)]
pub async fn list_files(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Page<Value>>> {
    let case = case_ref(&case_etag)?;
    let query = ListQuery::new(&params, state.page_limits())?;
    Ok(Json(state.files().list(case.id, &query).await?))
}

/// POST /cases/{case_etag}/files - Attach file metadata
#[utoipa::path(
    post,
    path = "/cases/{case_etag}/files",
    tag = "Files",
    params(("case_etag" = String, Path, description = "Case etag or id")),
    request_body = CaseFile,
    responses((status = 200, description = "Attached file", body = CaseFile)),
    security(("bearer_auth" = []))
)]
pub async fn attach_file(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<CaseFile>> {
    let case = case_ref(&case_etag)?;
    Ok(Json(state.files().attach(case.id, &body, &auth.user).await?))
}

/// DELETE /cases/{case_etag}/files/{id} - Remove file metadata
#[utoipa::path(
    delete,
    path = "/cases/{case_etag}/files/{id}",
    tag = "Files",
    params(
        ("case_etag" = String, Path, description = "Case etag or id"),
        ("id" = i64, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "Removed file", body = CaseFile),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_file(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath((case_etag, id)): ApiPath<(String, i64)>,
) -> ApiResult<Json<CaseFile>> {
    let case = case_ref(&case_etag)?;
    Ok(Json(state.files().delete(case.id, id).await?))
}
