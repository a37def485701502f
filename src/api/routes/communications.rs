//! Routes linking communications to a case.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{delete, get},
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::cases::case_ref;
use super::error::ApiResult;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{CaseCommunication, Page, RecordRef};
use crate::services::{ListParams, ListQuery};
use crate::storage::RecordKind;

/// Response of DELETE /cases/{case_etag}/communication/{etag}
#[derive(Debug, Serialize, ToSchema)]
pub struct UnlinkResponse {
    pub affected: u64,
}

/// Create the communications router
pub fn communications_router() -> Router<AppState> {
    Router::new()
        .route(
            "/cases/{case_etag}/communication",
            get(list_communications).post(link_communications),
        )
        .route(
            "/cases/{case_etag}/communication/{etag}",
            delete(unlink_communication),
        )
}

/// GET /cases/{case_etag}/communication - List linked communications
#[utoipa::path(
    get,
    path = "/cases/{case_etag}/communication",
    tag = "Communications",
    params(("case_etag" = String, Path, description = "Case etag or id"), ListParams),
    responses((status = 200, description = "Page of links", body = Object)),
    security(("bearer_auth" = []))
)]
pub async fn list_communications(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Page<Value>>> {
    let case = case_ref(&case_etag)?;
    let query = ListQuery::new(&params, state.page_limits())?;
    Ok(Json(state.communications().list(case.id, &query).await?))
}

/// POST /cases/{case_etag}/communication - Link communications
#[utoipa::path(
    post,
    path = "/cases/{case_etag}/communication",
    tag = "Communications",
    params(("case_etag" = String, Path, description = "Case etag or id")),
    request_body = Vec<CaseCommunication>,
    responses(
        (status = 200, description = "Created links", body = Vec<CaseCommunication>),
        (status = 409, description = "Communication already linked")
    ),
    security(("bearer_auth" = []))
)]
pub async fn link_communications(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiJson(body): ApiJson<Vec<Value>>,
) -> ApiResult<Json<Vec<CaseCommunication>>> {
    let case = case_ref(&case_etag)?;
    Ok(Json(
        state
            .communications()
            .link(case.id, &body, &auth.user)
            .await?,
    ))
}

/// DELETE /cases/{case_etag}/communication/{etag} - Unlink a communication
#[utoipa::path(
    delete,
    path = "/cases/{case_etag}/communication/{etag}",
    tag = "Communications",
    params(
        ("case_etag" = String, Path, description = "Case etag or id"),
        ("etag" = String, Path, description = "Link etag or id")
    ),
    responses(
        (status = 200, description = "Number of links removed", body = UnlinkResponse),
        (status = 404, description = "Link not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unlink_communication(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath((case_etag, etag)): ApiPath<(String, String)>,
) -> ApiResult<Json<UnlinkResponse>> {
    let case = case_ref(&case_etag)?;
    let target = RecordRef::parse(&etag, RecordKind::CaseCommunication)?;
    let affected = state.communications().unlink(case.id, target).await?;
    Ok(Json(UnlinkResponse { affected }))
}
