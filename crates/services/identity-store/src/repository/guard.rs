//! Entry checks and result shaping shared by the stores.

use std::sync::atomic::{AtomicBool, Ordering};

use sea_orm::{DbErr, SqlErr};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use common::{StoreError, StoreResult};
use domain::{
    IdentityError, IdentityKey, IdentityResult, ERROR_DUPLICATE_KEY, ERROR_INVALID_REFERENCE,
    ERROR_PERSISTENCE_FAILURE,
};

/// Disposed flag of a store instance
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    disposed: AtomicBool,
}

impl Lifecycle {
    /// Fail fast before any I/O: cancellation first, then disposal.
    pub(crate) fn check(&self, cancel: &CancellationToken) -> StoreResult<()> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        if self.is_disposed() {
            return Err(StoreError::Disposed);
        }
        Ok(())
    }

    /// Returns `false` if the store was already disposed.
    pub(crate) fn dispose(&self) -> bool {
        !self.disposed.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

/// Structured failure for a persistence error
pub(crate) fn identity_failure(err: &DbErr) -> IdentityResult {
    let code = match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ERROR_DUPLICATE_KEY,
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => ERROR_INVALID_REFERENCE,
        _ => ERROR_PERSISTENCE_FAILURE,
    };
    IdentityResult::failed(IdentityError::new(code, err.to_string()))
}

/// Shape the outcome of a create, update or delete.
///
/// Database errors become `IdentityResult::Failed`. Anything else still
/// propagates.
pub(crate) fn to_identity_result(operation: &str, outcome: StoreResult<()>) -> StoreResult<IdentityResult> {
    match outcome {
        Ok(()) => Ok(IdentityResult::Succeeded),
        Err(StoreError::Database(err)) => {
            warn!(operation, error = %err, "Persistence failure");
            Ok(identity_failure(&err))
        }
        Err(other) => Err(other),
    }
}

pub(crate) fn require_key<K: IdentityKey>(id: &K, entity: &str) -> StoreResult<()> {
    if id.is_assigned() {
        Ok(())
    } else {
        Err(StoreError::invalid_argument(format!("{} has no id", entity)))
    }
}

pub(crate) fn require_non_empty(value: &str, argument: &str) -> StoreResult<()> {
    if value.is_empty() {
        Err(StoreError::invalid_argument(format!("{} must not be empty", argument)))
    } else {
        Ok(())
    }
}
