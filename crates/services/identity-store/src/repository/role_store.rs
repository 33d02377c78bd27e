//! Role persistence.

use std::marker::PhantomData;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use common::{StoreError, StoreResult};
use domain::{convert_id_from_string, convert_id_to_string, Claim, IdentityResult, IdentityRole, RoleClaim};

use super::guard::{require_key, to_identity_result, Lifecycle};
use super::key::{key_for_insert, StoreKey};
use super::mappers::{role_claim_from_row, role_from_row};
use super::statements;
use crate::infra::ConnectionProvider;
use crate::sql::schema::ID;

/// Store for roles and their claims.
///
/// Shares the entry checks and failure policy of [`UserStore`](super::UserStore).
pub struct RoleStore<K: StoreKey, P: ConnectionProvider> {
    provider: P,
    lifecycle: Lifecycle,
    _key: PhantomData<fn() -> K>,
}

impl<K: StoreKey, P: ConnectionProvider> RoleStore<K, P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            lifecycle: Lifecycle::default(),
            _key: PhantomData,
        }
    }

    pub fn dispose(&self) {
        if self.lifecycle.dispose() {
            debug!("Role store disposed");
        }
    }

    async fn connection(&self) -> StoreResult<DatabaseConnection> {
        Ok(self.provider.provide().await?)
    }

    pub async fn create(
        &self,
        role: &mut IdentityRole<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<IdentityResult> {
        self.lifecycle.check(cancel)?;
        let outcome = self.insert(role).await.map(|id| {
            info!(role_id = %id, name = ?role.name, "Role created");
            role.id = id;
        });
        to_identity_result("create role", outcome)
    }

    async fn insert(&self, role: &IdentityRole<K>) -> StoreResult<K> {
        let conn = self.connection().await?;
        let mut id = role.id.clone();
        let explicit = key_for_insert(&mut id);
        let statement = statements::insert_role(conn.get_database_backend(), explicit, role)?;
        let row = conn
            .query_one(statement)
            .await?
            .ok_or(DbErr::RecordNotInserted)?;
        Ok(row.try_get::<K>("", ID)?)
    }

    pub async fn update(
        &self,
        role: &IdentityRole<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<IdentityResult> {
        self.lifecycle.check(cancel)?;
        let outcome = async {
            let conn = self.connection().await?;
            conn.execute(statements::update_role(conn.get_database_backend(), role)?)
                .await?;
            Ok::<(), StoreError>(())
        }
        .await;
        to_identity_result("update role", outcome)
    }

    /// Delete the role. Memberships and role claims cascade.
    pub async fn delete(
        &self,
        role: &IdentityRole<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<IdentityResult> {
        self.lifecycle.check(cancel)?;
        let outcome = async {
            let conn = self.connection().await?;
            conn.execute(statements::delete_role(conn.get_database_backend(), &role.id)?)
                .await?;
            info!(role_id = %role.id, "Role deleted");
            Ok::<(), StoreError>(())
        }
        .await;
        to_identity_result("delete role", outcome)
    }

    pub async fn find_by_id(
        &self,
        role_id: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<IdentityRole<K>>> {
        self.lifecycle.check(cancel)?;
        let Some(id) = convert_id_from_string::<K>(Some(role_id))? else {
            return Ok(None);
        };
        let conn = self.connection().await?;
        let statement = statements::find_role_by_id(conn.get_database_backend(), &id)?;
        let row = conn.query_one(statement).await?;
        Ok(row.as_ref().map(role_from_row).transpose()?)
    }

    pub async fn find_by_name(
        &self,
        normalized_name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<IdentityRole<K>>> {
        self.lifecycle.check(cancel)?;
        let conn = self.connection().await?;
        let statement = statements::find_role_by_name(conn.get_database_backend(), normalized_name)?;
        let row = conn.query_one(statement).await?;
        Ok(row.as_ref().map(role_from_row).transpose()?)
    }

    pub fn get_role_id(
        &self,
        role: &IdentityRole<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.lifecycle.check(cancel)?;
        Ok(convert_id_to_string(&role.id))
    }

    pub fn get_role_name(
        &self,
        role: &IdentityRole<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.lifecycle.check(cancel)?;
        Ok(role.name.clone())
    }

    pub fn set_role_name(
        &self,
        role: &mut IdentityRole<K>,
        name: Option<String>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.lifecycle.check(cancel)?;
        role.name = name;
        Ok(())
    }

    pub fn get_normalized_role_name(
        &self,
        role: &IdentityRole<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.lifecycle.check(cancel)?;
        Ok(role.normalized_name.clone())
    }

    pub fn set_normalized_role_name(
        &self,
        role: &mut IdentityRole<K>,
        normalized_name: Option<String>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.lifecycle.check(cancel)?;
        role.normalized_name = normalized_name;
        Ok(())
    }

    pub async fn get_claims(
        &self,
        role: &IdentityRole<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Vec<Claim>> {
        self.lifecycle.check(cancel)?;
        require_key(&role.id, "role")?;
        let conn = self.connection().await?;
        let statement = statements::role_claims(conn.get_database_backend(), &role.id)?;
        let rows = conn.query_all(statement).await?;
        let claims = rows
            .iter()
            .map(role_claim_from_row::<K>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(claims.iter().map(RoleClaim::to_claim).collect())
    }

    pub async fn add_claim(
        &self,
        role: &IdentityRole<K>,
        claim: &Claim,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.lifecycle.check(cancel)?;
        require_key(&role.id, "role")?;
        let conn = self.connection().await?;
        let row = RoleClaim::from_claim(role.id.clone(), claim);
        conn.execute(statements::insert_role_claim(conn.get_database_backend(), &row)?)
            .await?;
        Ok(())
    }

    pub async fn remove_claim(
        &self,
        role: &IdentityRole<K>,
        claim: &Claim,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.lifecycle.check(cancel)?;
        require_key(&role.id, "role")?;
        let conn = self.connection().await?;
        let statement = statements::delete_role_claim(
            conn.get_database_backend(),
            &role.id,
            &claim.claim_type,
            &claim.value,
        )?;
        conn.execute(statement).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockConnectionProvider;
    use domain::ERROR_PERSISTENCE_FAILURE;

    #[tokio::test]
    async fn test_create_failure_is_structured() {
        let mut provider = MockConnectionProvider::new();
        provider
            .expect_provide()
            .returning(|| Err(DbErr::Custom("connection refused".to_string())));
        let store: RoleStore<i64, _> = RoleStore::new(provider);
        let mut role = IdentityRole::new("Admin");

        let result = store.create(&mut role, &CancellationToken::new()).await.unwrap();
        assert_eq!(result.errors()[0].code, ERROR_PERSISTENCE_FAILURE);
    }

    #[test]
    fn test_disposed_role_store_rejects_accessors() {
        let mut provider = MockConnectionProvider::new();
        provider.expect_provide().never();
        let store: RoleStore<i64, _> = RoleStore::new(provider);
        store.dispose();

        let role = IdentityRole::new("Admin");
        assert!(matches!(
            store.get_role_name(&role, &CancellationToken::new()),
            Err(StoreError::Disposed)
        ));
    }
}
