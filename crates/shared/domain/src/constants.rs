//! Domain-level constants.
//!
//! Reserved token names and separators shared by every store.

// =============================================================================
// Internal tokens
// =============================================================================

/// Login provider under which the store keeps its own tokens
pub const INTERNAL_LOGIN_PROVIDER: &str = "[IdentityStore]";

/// Token name holding the two-factor authenticator key
pub const AUTHENTICATOR_KEY_TOKEN_NAME: &str = "AuthenticatorKey";

/// Token name holding the joined recovery codes
pub const RECOVERY_CODE_TOKEN_NAME: &str = "RecoveryCodes";

/// Separator between recovery codes in the stored token value
pub const RECOVERY_CODE_SEPARATOR: &str = ";";

// =============================================================================
// Identity result codes
// =============================================================================

/// A unique index rejected the row (duplicate username, email, role name, key)
pub const ERROR_DUPLICATE_KEY: &str = "DuplicateKey";

/// A foreign key rejected the row
pub const ERROR_INVALID_REFERENCE: &str = "InvalidReference";

/// Any other persistence failure
pub const ERROR_PERSISTENCE_FAILURE: &str = "PersistenceFailure";
