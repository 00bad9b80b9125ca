//! Store and service error types.
//!
//! `StoreError` is what a storage backend reports. `ServiceError` is the single
//! error surface of the service layer; the API maps it to status codes.

use thiserror::Error;

use projtrack_auth::AuthzError;
use projtrack_core::DomainError;

/// Storage operation error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed record (project, module) is gone.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend is unavailable or the write failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Service operation error.
///
/// NotFound / Forbidden / Conflict / InvalidInput are caller-fixable and
/// surfaced as-is. Storage failures are never retried here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("forbidden")]
    Forbidden,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(what) => ServiceError::NotFound(what),
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::Storage(msg) => ServiceError::Storage(msg),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::InvalidInput(msg) | DomainError::InvalidId(msg) => {
                ServiceError::InvalidInput(msg)
            }
            DomainError::NotFound(what) => ServiceError::NotFound(what),
            DomainError::Forbidden => ServiceError::Forbidden,
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::NotFound => ServiceError::NotFound("project"),
            AuthzError::Forbidden => ServiceError::Forbidden,
        }
    }
}
