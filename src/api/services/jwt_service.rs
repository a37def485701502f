//! JWT service for access token validation.
//!
//! Access tokens are minted by the identity provider that shares the signing
//! secret with this API. `issue_token` exists for tooling and tests.

use crate::storage::UserContext;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (numeric user id)
    pub sub: String,
    /// Display name of the user
    #[serde(default)]
    pub name: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Session ID (for tracking/revocation)
    #[serde(default)]
    pub session_id: String,
}

impl Claims {
    /// The caller described by these claims.
    pub fn user(&self) -> Result<UserContext, String> {
        let user_id: i64 = self
            .sub
            .parse()
            .map_err(|_| format!("Token subject '{}' is not a user id", self.sub))?;
        if user_id <= 0 {
            return Err("Token subject must be a positive user id".to_string());
        }
        Ok(UserContext {
            user_id,
            name: self.name.clone(),
        })
    }
}

/// JWT Service configuration
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_duration: Duration,
}

impl JwtService {
    /// Create a new JWT service with the given secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_duration: Duration::minutes(15),
        }
    }

    pub fn with_token_duration(mut self, duration: Duration) -> Self {
        self.token_duration = duration;
        self
    }

    /// Mint an access token for a user
    pub fn issue_token(&self, user: &UserContext, session_id: &str) -> Result<String, String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.user_id.to_string(),
            name: user.name.clone(),
            exp: (now + self.token_duration).timestamp(),
            iat: now.timestamp(),
            session_id: session_id.to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| format!("Failed to encode access token: {}", e))?;
        debug!(
            "Issued access token for user {} (session: {})",
            user.user_id, session_id
        );
        Ok(token)
    }

    /// Validate an access token and return the claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, String> {
        Ok(self.decode_token(token)?.claims)
    }

    /// Decode and validate a token (checks signature and expiration)
    fn decode_token(&self, token: &str) -> Result<TokenData<Claims>, String> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token has expired".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidToken => "Invalid token format".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                "Invalid token signature".to_string()
            }
            _ => format!("Token validation failed: {}", e),
        })
    }
}

/// Shared JWT service for use across the application
pub type SharedJwtService = Arc<JwtService>;
