//! Errors raised by the domain services.

use crate::models::EtagError;
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    InvalidEtag(#[from] EtagError),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    /// A referenced record that must exist does not.
    pub fn missing_reference(field: &str, id: i64) -> Self {
        ServiceError::Validation(format!("{} {} does not exist", field, id))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
