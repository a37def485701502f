//! Authentication context.
//!
//! Every `/cases` route takes an [`AuthContext`], which validates the
//! `Authorization: Bearer` token and yields the calling user.

use super::app_state::AppState;
use super::error::ApiError;
use crate::storage::UserContext;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};

/// Authentication context extracted from request
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user: UserContext,
    pub session_id: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    tracing::warn!("No authorization token provided");
                    ApiError::unauthorized("Missing bearer token")
                })?;

        let claims = state
            .jwt
            .validate_access_token(bearer.token())
            .map_err(|e| {
                tracing::warn!("JWT validation failed: {}", e);
                ApiError::unauthorized(e)
            })?;

        let user = claims.user().map_err(|e| {
            tracing::warn!("JWT subject rejected: {}", e);
            ApiError::unauthorized(e)
        })?;

        Ok(AuthContext {
            user,
            session_id: claims.session_id,
        })
    }
}
