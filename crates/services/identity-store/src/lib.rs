//! Identity Store Library
//!
//! Relational persistence for an identity framework: users, roles, claims,
//! external logins, tokens and role membership, over raw parameterized SQL.
//! Can be embedded as a library or driven through the `identity-store` CLI.

pub mod config;
pub mod infra;
pub mod repository;
pub mod sql;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use domain::{normalize, IdentityRole, IdentityUser};

use crate::config::IdentityStoreConfig;
use crate::infra::Database;

pub use crate::infra::{ConnectionProvider, Migrator};
pub use crate::repository::{RoleStore, RoleUserStore, StoreKey, UserStore};

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = IdentityStoreConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Create a role with the given display name.
pub async fn create_role(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = IdentityStoreConfig::from_env();
    let db = Database::connect(&config.database).await?;
    let roles: RoleStore<i64, _> = RoleStore::new(db);

    let mut role = IdentityRole::new(name);
    role.normalized_name = Some(normalize(name));
    let result = roles.create(&mut role, &CancellationToken::new()).await?;
    if !result.succeeded() {
        return Err(result.to_string().into());
    }

    println!("{} {}", role.id, name);
    Ok(())
}

/// Print the user names of every member of a role.
pub async fn list_role_members(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = IdentityStoreConfig::from_env();
    let db = Database::connect(&config.database).await?;
    let store: RoleUserStore<i64, _> = RoleUserStore::new(db);

    let members = store
        .get_users_in_role(&normalize(name), &CancellationToken::new())
        .await?;
    for user in members {
        println!("{} {}", user.id, user.user_name.unwrap_or_default());
    }
    Ok(())
}

/// Print a user's profile and role names. The password hash is never shown.
pub async fn show_user(user_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = IdentityStoreConfig::from_env();
    let db = Database::connect(&config.database).await?;
    let store: RoleUserStore<i64, _> = RoleUserStore::new(db);
    let cancel = CancellationToken::new();

    let Some(user) = store.find_by_name(&normalize(user_name), &cancel).await? else {
        return Err(format!("user {} not found", user_name).into());
    };
    let roles = store.get_roles(&user, &cancel).await?;

    print_user(&user, &roles);
    Ok(())
}

fn print_user(user: &IdentityUser<i64>, roles: &[String]) {
    println!("id:                 {}", user.id);
    println!("user_name:          {}", user.user_name.as_deref().unwrap_or("-"));
    println!("email:              {}", user.email.as_deref().unwrap_or("-"));
    println!("email_confirmed:    {}", user.email_confirmed);
    println!("phone_number:       {}", user.phone_number.as_deref().unwrap_or("-"));
    println!("two_factor_enabled: {}", user.two_factor_enabled);
    println!("lockout_enabled:    {}", user.lockout_enabled);
    println!("locked_out:         {}", user.is_locked_out(Utc::now()));
    match user.lockout_end {
        Some(end) => println!("lockout_end:        {}", end.to_rfc3339()),
        None => println!("lockout_end:        -"),
    }
    println!("access_failed:      {}", user.access_failed_count);
    println!("roles:              {}", roles.join(", "));
}
