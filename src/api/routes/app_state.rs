//! Application state management.
//!
//! Defines the AppState struct that holds all shared application state:
//! configuration, the storage backend, the JWT service and the rate limiter.

use crate::config::{ApiConfig, ConfigError};
use crate::middleware::{RateLimiterState, create_rate_limiter};
use crate::models::Entity;
use crate::services::{
    CaseService, CatalogRules, CatalogService, CommentService, CommunicationService, FileService,
    JwtService, PageLimits, RelatedCaseService, SharedJwtService, TimelineService,
};
use crate::storage::{MemoryStorageBackend, PostgresStorageBackend, StorageBackend, StorageError};
use axum::extract::FromRef;
use std::sync::Arc;
use tracing::info;

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    /// Storage backend (PostgreSQL or in-memory)
    pub storage: Arc<dyn StorageBackend>,
    pub jwt: SharedJwtService,
    pub rate_limiter: RateLimiterState,
}

impl AppState {
    /// Create application state over an existing storage backend.
    pub fn new(config: ApiConfig, storage: Arc<dyn StorageBackend>) -> Result<Self, ConfigError> {
        let secret = config.resolve_jwt_secret()?;
        Ok(Self {
            jwt: Arc::new(JwtService::new(&secret)),
            rate_limiter: create_rate_limiter(config.rate_limit_per_minute),
            config: Arc::new(config),
            storage,
        })
    }

    /// Application state backed by a fresh in-memory store.
    pub fn in_memory(config: ApiConfig) -> Result<Self, ConfigError> {
        Self::new(config, Arc::new(MemoryStorageBackend::new()))
    }

    /// Initialize the storage backend from configuration.
    ///
    /// Connects to PostgreSQL (running migrations) if a database URL is
    /// configured, otherwise uses the in-memory store.
    pub async fn init_storage(config: &ApiConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
        match &config.database_url {
            Some(url) => {
                let backend = PostgresStorageBackend::connect(url).await?;
                info!("Using PostgreSQL storage");
                Ok(Arc::new(backend))
            }
            None => {
                info!("DATABASE_URL not set, using in-memory storage");
                Ok(Arc::new(MemoryStorageBackend::new()))
            }
        }
    }

    pub fn page_limits(&self) -> PageLimits {
        self.config.page_limits()
    }

    pub fn cases(&self) -> CaseService {
        CaseService::new(
            self.storage.clone(),
            self.config.case_name_prefix.clone(),
            self.page_limits(),
        )
    }

    pub fn catalog<T: Entity + CatalogRules>(&self) -> CatalogService<T> {
        CatalogService::new(self.storage.clone())
    }

    pub fn related_cases(&self) -> RelatedCaseService {
        RelatedCaseService::new(self.storage.clone())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.storage.clone())
    }

    pub fn communications(&self) -> CommunicationService {
        CommunicationService::new(self.storage.clone())
    }

    pub fn files(&self) -> FileService {
        FileService::new(self.storage.clone())
    }

    pub fn timeline(&self) -> TimelineService {
        TimelineService::new(self.storage.clone(), self.page_limits())
    }
}

// Allow AppState to be extracted from references (for Axum)
impl FromRef<AppState> for RateLimiterState {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.rate_limiter.clone()
    }
}

impl FromRef<AppState> for SharedJwtService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.jwt.clone()
    }
}
