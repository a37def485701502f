//! API routes module - organizes all route handlers.
//!
//! Everything under /cases requires a bearer token. /health, /openapi.json
//! and /swagger are public.

pub mod app_state;
pub mod auth_context;
pub mod cases;
pub mod catalogs;
pub mod comments;
pub mod communications;
pub mod error;
pub mod extract;
pub mod files;
pub mod openapi;
pub mod related_cases;
pub mod timeline;

use axum::{
    Router, extract::State, http::StatusCode, middleware::from_fn_with_state, response::Json,
    routing::get,
};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::error;

pub use app_state::AppState;
pub use auth_context::AuthContext;
pub use error::{ApiError, ApiResult};

use crate::middleware::{create_cors_layer, rate_limit_middleware};

/// Create the main API router combining all route modules
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .merge(catalogs::catalogs_router())
        .merge(cases::cases_router())
        .merge(related_cases::related_cases_router())
        .merge(comments::comments_router())
        .merge(communications::communications_router())
        .merge(files::files_router())
        .merge(timeline::timeline_router())
        // OpenAPI documentation endpoints
        .merge(openapi::openapi_router())
}

/// Build the complete application: routes, state and middleware layers.
pub fn create_app(app_state: AppState) -> Router {
    let cors = create_cors_layer(&app_state.config.cors_origins);
    create_api_router()
        .layer(from_fn_with_state(
            app_state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// GET /health - Liveness and storage check
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.storage.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "cases-api",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "service": "cases-api",
                    "version": env!("CARGO_PKG_VERSION")
                })),
            )
        }
    }
}
