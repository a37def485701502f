//! Service configuration.
//!
//! Values come from an optional YAML file named by `CASES_API_CONFIG`,
//! then environment variables override individual settings.

use crate::services::query::PageLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-do-not-use-in-production-change-me-now";
const MIN_SECRET_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
    #[error("{0}")]
    Insecure(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Production,
    Development,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub app_env: AppEnv,
    pub rate_limit_per_minute: u32,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub case_name_prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8081,
            database_url: None,
            jwt_secret: None,
            app_env: AppEnv::Production,
            rate_limit_per_minute: 600,
            cors_origins: Vec::new(),
            default_page_size: 10,
            max_page_size: 1000,
            case_name_prefix: "CS".to_string(),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env_var(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value,
            }),
    }
}

impl ApiConfig {
    /// Load from `CASES_API_CONFIG` (if set) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match env_var("CASES_API_CONFIG") {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        base.with_env()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Apply environment overrides.
    pub fn with_env(mut self) -> Result<Self, ConfigError> {
        if let Some(port) = parse_env("PORT")? {
            self.port = port;
        }
        if let Some(url) = env_var("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(secret) = env_var("JWT_SECRET") {
            self.jwt_secret = Some(secret);
        }
        if let Some(env) = env_var("APP_ENV") {
            self.app_env = match env.to_lowercase().as_str() {
                "development" | "dev" => AppEnv::Development,
                "production" | "prod" => AppEnv::Production,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "APP_ENV".to_string(),
                        value: env,
                    });
                }
            };
        }
        if let Some(limit) = parse_env("RATE_LIMIT_PER_MINUTE")? {
            self.rate_limit_per_minute = limit;
        }
        if let Some(origins) = env_var("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(size) = parse_env("DEFAULT_PAGE_SIZE")? {
            self.default_page_size = size;
        }
        if let Some(size) = parse_env("MAX_PAGE_SIZE")? {
            self.max_page_size = size;
        }
        if let Some(prefix) = env_var("CASE_NAME_PREFIX") {
            self.case_name_prefix = prefix.trim().to_string();
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 || self.default_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "page size".to_string(),
                value: "0".to_string(),
            });
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::InvalidValue {
                name: "DEFAULT_PAGE_SIZE".to_string(),
                value: format!("{} (above MAX_PAGE_SIZE {})", self.default_page_size, self.max_page_size),
            });
        }
        if self.rate_limit_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                name: "RATE_LIMIT_PER_MINUTE".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.app_env == AppEnv::Development
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_size: self.default_page_size,
            max_size: self.max_page_size,
        }
    }

    /// The token signing secret.
    ///
    /// In production a missing or short secret is an error. In development a
    /// fixed secret is used with a warning.
    pub fn resolve_jwt_secret(&self) -> Result<String, ConfigError> {
        let secret = match &self.jwt_secret {
            Some(s) => s.clone(),
            None if self.is_development() => {
                warn!(
                    "JWT_SECRET not set! Using default secret for development. DO NOT USE IN PRODUCTION!"
                );
                DEV_JWT_SECRET.to_string()
            }
            None => {
                return Err(ConfigError::Insecure(
                    "JWT_SECRET environment variable is required in production".to_string(),
                ));
            }
        };

        if secret.len() < MIN_SECRET_LEN {
            if self.is_development() {
                warn!("JWT_SECRET is less than 32 characters. Consider using a longer secret.");
            } else {
                return Err(ConfigError::Insecure(
                    "JWT_SECRET must be at least 32 characters in production".to_string(),
                ));
            }
        }
        Ok(secret)
    }
}
