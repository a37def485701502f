//! Case timeline routes.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::get,
};

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::cases::case_ref;
use super::error::ApiResult;
use super::extract::{ApiPath, ApiQuery};
use crate::models::{DayTimeline, EventTypeCounter, Page};
use crate::services::TimelineParams;

/// Create the timeline router
pub fn timeline_router() -> Router<AppState> {
    Router::new()
        .route("/cases/{case_etag}/timeline", get(get_timeline))
        .route("/cases/{case_etag}/timeline/counter", get(get_timeline_counter))
}

/// GET /cases/{case_etag}/timeline - Events grouped by day, newest first
#[utoipa::path(
    get,
    path = "/cases/{case_etag}/timeline",
    tag = "Timeline",
    params(("case_etag" = String, Path, description = "Case etag or id"), TimelineParams),
    responses((status = 200, description = "Page of days", body = Object)),
    security(("bearer_auth" = []))
)]
pub async fn get_timeline(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
    ApiQuery(params): ApiQuery<TimelineParams>,
) -> ApiResult<Json<Page<DayTimeline>>> {
    let case = case_ref(&case_etag)?;
    Ok(Json(state.timeline().timeline(case.id, &params).await?))
}

/// GET /cases/{case_etag}/timeline/counter - Event counts per type
#[utoipa::path(
    get,
    path = "/cases/{case_etag}/timeline/counter",
    tag = "Timeline",
    params(("case_etag" = String, Path, description = "Case etag or id")),
    responses((status = 200, description = "Counters", body = Vec<EventTypeCounter>)),
    security(("bearer_auth" = []))
)]
pub async fn get_timeline_counter(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(case_etag): ApiPath<String>,
) -> ApiResult<Json<Vec<EventTypeCounter>>> {
    let case = case_ref(&case_etag)?;
    Ok(Json(state.timeline().counter(case.id).await?))
}
