//! Source of scoped connections for store operations.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::Database;

/// Hands out a connection for the duration of one store operation.
///
/// The handle is dropped when the operation ends. Pooling is the
/// provider's concern.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn provide(&self) -> Result<DatabaseConnection, DbErr>;
}

#[async_trait]
impl ConnectionProvider for Database {
    async fn provide(&self) -> Result<DatabaseConnection, DbErr> {
        Ok(self.get_connection())
    }
}

#[async_trait]
impl ConnectionProvider for DatabaseConnection {
    async fn provide(&self) -> Result<DatabaseConnection, DbErr> {
        Ok(self.clone())
    }
}
