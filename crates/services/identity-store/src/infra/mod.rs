//! Infrastructure layer - connections and schema migrations.

mod db;
pub mod migrations;
mod provider;

pub use db::Database;
pub use migrations::Migrator;
pub use provider::ConnectionProvider;

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockConnectionProvider;
