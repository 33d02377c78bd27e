//! User store with role membership.

use std::ops::Deref;

use sea_orm::{ConnectionTrait, DatabaseConnection};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use common::{StoreError, StoreResult};
use domain::{IdentityUser, UserRole};

use super::guard::{require_key, require_non_empty};
use super::key::StoreKey;
use super::mappers::role_from_row;
use super::statements;
use super::user_store::UserStore;
use crate::infra::ConnectionProvider;
use crate::sql::schema::NAME;

/// [`UserStore`] plus role-membership operations.
///
/// Derefs to the wrapped store, so every user operation is available.
pub struct RoleUserStore<K: StoreKey, P: ConnectionProvider> {
    users: UserStore<K, P>,
}

impl<K: StoreKey, P: ConnectionProvider> RoleUserStore<K, P> {
    pub fn new(provider: P) -> Self {
        Self {
            users: UserStore::new(provider),
        }
    }

    /// Id of the role with this normalized name, or `RoleNotFound`
    async fn resolve_role(conn: &DatabaseConnection, normalized_role_name: &str) -> StoreResult<K> {
        let statement = statements::find_role_by_name(conn.get_database_backend(), normalized_role_name)?;
        match conn.query_one(statement).await? {
            Some(row) => Ok(role_from_row::<K>(&row)?.id),
            None => Err(StoreError::role_not_found(normalized_role_name)),
        }
    }

    fn check_membership_args(user: &IdentityUser<K>, normalized_role_name: &str) -> StoreResult<()> {
        require_key(&user.id, "user")?;
        require_non_empty(normalized_role_name, "normalized_role_name")
    }

    /// Add the user to the role. Adding an existing membership is a no-op.
    pub async fn add_to_role(
        &self,
        user: &IdentityUser<K>,
        normalized_role_name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        Self::check_membership_args(user, normalized_role_name)?;
        let conn = self.connection().await?;
        let membership = UserRole {
            user_id: user.id.clone(),
            role_id: Self::resolve_role(&conn, normalized_role_name).await?,
        };
        let statement = statements::insert_user_role(conn.get_database_backend(), &membership)?;
        let result = conn.execute(statement).await?;
        debug!(
            user_id = %user.id,
            role = normalized_role_name,
            added = result.rows_affected(),
            "Role membership added"
        );
        Ok(())
    }

    pub async fn remove_from_role(
        &self,
        user: &IdentityUser<K>,
        normalized_role_name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        Self::check_membership_args(user, normalized_role_name)?;
        let conn = self.connection().await?;
        let membership = UserRole {
            user_id: user.id.clone(),
            role_id: Self::resolve_role(&conn, normalized_role_name).await?,
        };
        let statement = statements::delete_user_role(conn.get_database_backend(), &membership)?;
        conn.execute(statement).await?;
        Ok(())
    }

    /// Names of the user's roles
    pub async fn get_roles(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Vec<String>> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        let conn = self.connection().await?;
        let statement = statements::role_names_for_user(conn.get_database_backend(), &user.id)?;
        let rows = conn.query_all(statement).await?;
        let mut names = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(name) = row.try_get::<Option<String>>("", NAME)? {
                names.push(name);
            }
        }
        Ok(names)
    }

    pub async fn is_in_role(
        &self,
        user: &IdentityUser<K>,
        normalized_role_name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<bool> {
        self.check(cancel)?;
        Self::check_membership_args(user, normalized_role_name)?;
        let conn = self.connection().await?;
        let membership = UserRole {
            user_id: user.id.clone(),
            role_id: Self::resolve_role(&conn, normalized_role_name).await?,
        };
        let statement = statements::count_user_role(conn.get_database_backend(), &membership)?;
        let total = match conn.query_one(statement).await? {
            Some(row) => row.try_get::<i64>("", "total")?,
            None => 0,
        };
        Ok(total > 0)
    }

    /// Members of the role. An unknown role has no members.
    pub async fn get_users_in_role(
        &self,
        normalized_role_name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Vec<IdentityUser<K>>> {
        self.check(cancel)?;
        require_non_empty(normalized_role_name, "normalized_role_name")?;
        let conn = self.connection().await?;
        let statement = statements::users_in_role(conn.get_database_backend(), normalized_role_name)?;
        UserStore::<K, P>::query_users(&conn, statement).await
    }
}

impl<K: StoreKey, P: ConnectionProvider> Deref for RoleUserStore<K, P> {
    type Target = UserStore<K, P>;

    fn deref(&self) -> &Self::Target {
        &self.users
    }
}
