//! Domain-level errors.
//!
//! These errors represent invalid input to domain helpers.
//! They are independent of infrastructure concerns (database, connections).

use thiserror::Error;

/// Domain-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A string could not be converted to the store's key type
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create an invalid key error
    pub fn invalid_key(value: impl Into<String>) -> Self {
        DomainError::InvalidKey(value.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
