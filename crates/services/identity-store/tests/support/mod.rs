//! Shared fixtures for integration tests.

#![allow(dead_code)]

use common::DatabaseConfig;
use domain::{normalize, IdentityRole, IdentityUser};
use identity_store::infra::Database;
use identity_store::{RoleStore, RoleUserStore};
use tokio_util::sync::CancellationToken;

/// Fresh in-memory database with every migration applied
pub async fn database() -> Database {
    Database::connect(&DatabaseConfig::sqlite_memory())
        .await
        .expect("in-memory database")
}

pub async fn user_store() -> RoleUserStore<i64, Database> {
    RoleUserStore::new(database().await)
}

/// Unsaved user with normalized name and email filled in
pub fn new_user(user_name: &str, email: &str) -> IdentityUser<i64> {
    let mut user = IdentityUser::new(user_name);
    user.normalized_user_name = Some(normalize(user_name));
    user.email = Some(email.to_string());
    user.normalized_email = Some(normalize(email));
    user
}

/// Create and return a saved user
pub async fn saved_user(
    store: &RoleUserStore<i64, Database>,
    user_name: &str,
) -> IdentityUser<i64> {
    let mut user = new_user(user_name, &format!("{}@x.com", user_name));
    let result = store
        .create(&mut user, &CancellationToken::new())
        .await
        .expect("create user");
    assert!(result.succeeded(), "{}", result);
    user
}

/// Create a role sharing the store's database
pub async fn saved_role(db: &Database, name: &str) -> IdentityRole<i64> {
    let roles: RoleStore<i64, Database> = RoleStore::new(db.clone());
    let mut role = IdentityRole::new(name);
    role.normalized_name = Some(normalize(name));
    let result = roles
        .create(&mut role, &CancellationToken::new())
        .await
        .expect("create role");
    assert!(result.succeeded(), "{}", result);
    role
}
