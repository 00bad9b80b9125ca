//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// These are the caller-fixable outcomes of a project or inbox operation.
/// Storage failures are not represented here; each store reports its own error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Caller-supplied input was rejected (empty module name, malformed date, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The addressed project or module does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The principal may not act on the resource.
    #[error("forbidden")]
    Forbidden,

    /// A uniqueness constraint was violated (e.g. duplicate external project id).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: &'static str) -> Self {
        Self::NotFound(what)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
