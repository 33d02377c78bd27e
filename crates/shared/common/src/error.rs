//! Unified error handling for the identity stores.
//!
//! Provides a single error type for every store operation that does not
//! report through an `IdentityResult`. Not-found is never an error here;
//! lookups return `None` or an empty list instead.

use domain::DomainError;
use thiserror::Error;

/// Store error types.
#[derive(Error, Debug)]
pub enum StoreError {
    // Caller errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Malformed SQL template: {0}")]
    Template(String),

    // Domain consistency
    #[error("Role {0} does not exist")]
    RoleNotFound(String),

    // Persistence
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    // Lifecycle
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Store has been disposed")]
    Disposed,
}

impl StoreError {
    /// Get stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::InvalidArgument(_) => "INVALID_ARGUMENT",
            StoreError::InvalidKey(_) => "INVALID_KEY",
            StoreError::Template(_) => "TEMPLATE_ERROR",
            StoreError::RoleNotFound(_) => "ROLE_NOT_FOUND",
            #[cfg(feature = "database")]
            StoreError::Database(_) => "DATABASE_ERROR",
            StoreError::Cancelled => "CANCELLED",
            StoreError::Disposed => "DISPOSED",
        }
    }

    /// Whether the caller can fix this by changing its input
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidArgument(_) | StoreError::InvalidKey(_)
        )
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => StoreError::InvalidArgument(msg),
            DomainError::InvalidKey(value) => StoreError::InvalidKey(value),
        }
    }
}

/// Result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Convenience constructors
impl StoreError {
    pub fn invalid_argument(name: impl Into<String>) -> Self {
        StoreError::InvalidArgument(name.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        StoreError::Template(msg.into())
    }

    pub fn role_not_found(name: impl Into<String>) -> Self {
        StoreError::RoleNotFound(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_not_found_is_distinct() {
        let err = StoreError::role_not_found("ADMIN");
        assert_eq!(err.code(), "ROLE_NOT_FOUND");
        assert_eq!(err.to_string(), "Role ADMIN does not exist");
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_domain_errors_convert_to_caller_errors() {
        let err: StoreError = DomainError::invalid_key("abc").into();
        assert!(matches!(err, StoreError::InvalidKey(ref v) if v == "abc"));
        assert!(err.is_caller_error());

        let err: StoreError = DomainError::validation("user_name").into();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_lifecycle_codes() {
        assert_eq!(StoreError::Cancelled.code(), "CANCELLED");
        assert_eq!(StoreError::Disposed.code(), "DISPOSED");
    }
}
