//! User persistence over raw parameterized SQL.
//!
//! Every operation takes a [`CancellationToken`] that is checked on entry,
//! followed by the disposed flag. A single connection is taken from the
//! provider per operation and dropped when the operation returns.
//!
//! Setters only stage changes on the passed user. Nothing reaches the
//! database until [`UserStore::update`] is called.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, QueryResult, Statement};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use common::{StoreError, StoreResult};
use domain::{
    convert_id_from_string, convert_id_to_string, Claim, IdentityResult, IdentityUser,
    RecoveryCodes, UserClaim, UserLogin, UserLoginInfo, AUTHENTICATOR_KEY_TOKEN_NAME,
    INTERNAL_LOGIN_PROVIDER, RECOVERY_CODE_TOKEN_NAME,
};

use super::guard::{require_key, require_non_empty, to_identity_result, Lifecycle};
use super::key::{key_for_insert, StoreKey};
use super::mappers::{login_from_row, token_from_row, user_claim_from_row, user_from_row};
use super::statements;
use crate::infra::ConnectionProvider;
use crate::sql::schema::ID;

fn require_login(login_provider: &str, provider_key: &str) -> StoreResult<()> {
    require_non_empty(login_provider, "login_provider")?;
    require_non_empty(provider_key, "provider_key")
}

fn require_token(login_provider: &str, name: &str) -> StoreResult<()> {
    require_non_empty(login_provider, "login_provider")?;
    require_non_empty(name, "name")
}

/// Store for users and their claims, logins and tokens.
pub struct UserStore<K: StoreKey, P: ConnectionProvider> {
    provider: P,
    lifecycle: Lifecycle,
    _key: PhantomData<fn() -> K>,
}

impl<K: StoreKey, P: ConnectionProvider> UserStore<K, P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            lifecycle: Lifecycle::default(),
            _key: PhantomData,
        }
    }

    /// Release the store. Every later call fails with `Disposed`.
    pub fn dispose(&self) {
        if self.lifecycle.dispose() {
            debug!("User store disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    pub(crate) fn check(&self, cancel: &CancellationToken) -> StoreResult<()> {
        self.lifecycle.check(cancel)
    }

    pub(crate) async fn connection(&self) -> StoreResult<DatabaseConnection> {
        Ok(self.provider.provide().await?)
    }

    pub(crate) async fn query_user(
        conn: &DatabaseConnection,
        statement: Statement,
    ) -> StoreResult<Option<IdentityUser<K>>> {
        let row = conn.query_one(statement).await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    pub(crate) async fn query_users(
        conn: &DatabaseConnection,
        statement: Statement,
    ) -> StoreResult<Vec<IdentityUser<K>>> {
        let rows = conn.query_all(statement).await?;
        Ok(rows.iter().map(user_from_row).collect::<Result<_, _>>()?)
    }

    // =========================================================================
    // Create / Update / Delete
    // =========================================================================

    /// Insert the user and write the generated id back onto it.
    ///
    /// Persistence failures are reported as `IdentityResult::Failed`.
    pub async fn create(
        &self,
        user: &mut IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<IdentityResult> {
        self.check(cancel)?;
        let outcome = self.insert(user).await.map(|id| {
            info!(user_id = %id, "User created");
            user.id = id;
        });
        to_identity_result("create user", outcome)
    }

    async fn insert(&self, user: &IdentityUser<K>) -> StoreResult<K> {
        let conn = self.connection().await?;
        let mut id = user.id.clone();
        let explicit = key_for_insert(&mut id);
        let statement = statements::insert_user(conn.get_database_backend(), explicit, user)?;
        let row = conn
            .query_one(statement)
            .await?
            .ok_or(DbErr::RecordNotInserted)?;
        Ok(row.try_get::<K>("", ID)?)
    }

    /// Full-row update by id. The concurrency stamp is not compared.
    pub async fn update(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<IdentityResult> {
        self.check(cancel)?;
        let outcome = async {
            let conn = self.connection().await?;
            let statement = statements::update_user(conn.get_database_backend(), user)?;
            let result = conn.execute(statement).await?;
            debug!(user_id = %user.id, rows = result.rows_affected(), "User updated");
            Ok::<(), StoreError>(())
        }
        .await;
        to_identity_result("update user", outcome)
    }

    pub async fn delete(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<IdentityResult> {
        self.check(cancel)?;
        let outcome = async {
            let conn = self.connection().await?;
            let statement = statements::delete_user(conn.get_database_backend(), &user.id)?;
            let result = conn.execute(statement).await?;
            info!(user_id = %user.id, rows = result.rows_affected(), "User deleted");
            Ok::<(), StoreError>(())
        }
        .await;
        to_identity_result("delete user", outcome)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Find a user by its external string id. An empty id finds nothing.
    pub async fn find_by_id(
        &self,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<IdentityUser<K>>> {
        self.check(cancel)?;
        let Some(id) = convert_id_from_string::<K>(Some(user_id))? else {
            return Ok(None);
        };
        let conn = self.connection().await?;
        let statement = statements::find_user_by_id(conn.get_database_backend(), &id)?;
        Self::query_user(&conn, statement).await
    }

    pub async fn find_by_name(
        &self,
        normalized_user_name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<IdentityUser<K>>> {
        self.check(cancel)?;
        let conn = self.connection().await?;
        let statement = statements::find_user_by_name(conn.get_database_backend(), normalized_user_name)?;
        Self::query_user(&conn, statement).await
    }

    pub async fn find_by_email(
        &self,
        normalized_email: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<IdentityUser<K>>> {
        self.check(cancel)?;
        let conn = self.connection().await?;
        let statement = statements::find_user_by_email(conn.get_database_backend(), normalized_email)?;
        Self::query_user(&conn, statement).await
    }

    // =========================================================================
    // Accessors (in-memory only)
    // =========================================================================

    /// External string form of the user's id, `None` while unassigned.
    pub fn get_user_id(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.check(cancel)?;
        Ok(convert_id_to_string(&user.id))
    }

    pub fn get_user_name(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.check(cancel)?;
        Ok(user.user_name.clone())
    }

    pub fn set_user_name(
        &self,
        user: &mut IdentityUser<K>,
        user_name: Option<String>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.user_name = user_name;
        Ok(())
    }

    pub fn get_normalized_user_name(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.check(cancel)?;
        Ok(user.normalized_user_name.clone())
    }

    pub fn set_normalized_user_name(
        &self,
        user: &mut IdentityUser<K>,
        normalized_user_name: Option<String>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.normalized_user_name = normalized_user_name;
        Ok(())
    }

    pub fn get_email(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.check(cancel)?;
        Ok(user.email.clone())
    }

    pub fn set_email(
        &self,
        user: &mut IdentityUser<K>,
        email: Option<String>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.email = email;
        Ok(())
    }

    pub fn get_normalized_email(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.check(cancel)?;
        Ok(user.normalized_email.clone())
    }

    pub fn set_normalized_email(
        &self,
        user: &mut IdentityUser<K>,
        normalized_email: Option<String>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.normalized_email = normalized_email;
        Ok(())
    }

    pub fn get_email_confirmed(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<bool> {
        self.check(cancel)?;
        Ok(user.email_confirmed)
    }

    pub fn set_email_confirmed(
        &self,
        user: &mut IdentityUser<K>,
        confirmed: bool,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.email_confirmed = confirmed;
        Ok(())
    }

    pub fn get_password_hash(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.check(cancel)?;
        Ok(user.password_hash.clone())
    }

    pub fn set_password_hash(
        &self,
        user: &mut IdentityUser<K>,
        password_hash: Option<String>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.password_hash = password_hash;
        Ok(())
    }

    pub fn has_password(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<bool> {
        self.check(cancel)?;
        Ok(user.password_hash.is_some())
    }

    pub fn get_security_stamp(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.check(cancel)?;
        Ok(user.security_stamp.clone())
    }

    pub fn set_security_stamp(
        &self,
        user: &mut IdentityUser<K>,
        stamp: Option<String>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.security_stamp = stamp;
        Ok(())
    }

    pub fn get_phone_number(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.check(cancel)?;
        Ok(user.phone_number.clone())
    }

    pub fn set_phone_number(
        &self,
        user: &mut IdentityUser<K>,
        phone_number: Option<String>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.phone_number = phone_number;
        Ok(())
    }

    pub fn get_phone_number_confirmed(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<bool> {
        self.check(cancel)?;
        Ok(user.phone_number_confirmed)
    }

    pub fn set_phone_number_confirmed(
        &self,
        user: &mut IdentityUser<K>,
        confirmed: bool,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.phone_number_confirmed = confirmed;
        Ok(())
    }

    pub fn get_two_factor_enabled(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<bool> {
        self.check(cancel)?;
        Ok(user.two_factor_enabled)
    }

    pub fn set_two_factor_enabled(
        &self,
        user: &mut IdentityUser<K>,
        enabled: bool,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.two_factor_enabled = enabled;
        Ok(())
    }

    pub fn get_lockout_end(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        self.check(cancel)?;
        Ok(user.lockout_end)
    }

    pub fn set_lockout_end(
        &self,
        user: &mut IdentityUser<K>,
        lockout_end: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.lockout_end = lockout_end;
        Ok(())
    }

    pub fn get_lockout_enabled(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<bool> {
        self.check(cancel)?;
        Ok(user.lockout_enabled)
    }

    pub fn set_lockout_enabled(
        &self,
        user: &mut IdentityUser<K>,
        enabled: bool,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.lockout_enabled = enabled;
        Ok(())
    }

    pub fn get_access_failed_count(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<i32> {
        self.check(cancel)?;
        Ok(user.access_failed_count)
    }

    /// Bump the counter and return the new value. Lockout policy is the caller's.
    pub fn increment_access_failed_count(
        &self,
        user: &mut IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<i32> {
        self.check(cancel)?;
        user.access_failed_count = user.access_failed_count.saturating_add(1);
        Ok(user.access_failed_count)
    }

    pub fn reset_access_failed_count(
        &self,
        user: &mut IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        user.access_failed_count = 0;
        Ok(())
    }

    // =========================================================================
    // Claims
    // =========================================================================

    pub async fn get_claims(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Vec<Claim>> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        let conn = self.connection().await?;
        let statement = statements::user_claims(conn.get_database_backend(), &user.id)?;
        let rows = conn.query_all(statement).await?;
        let claims = rows
            .iter()
            .map(user_claim_from_row::<K>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(claims.iter().map(UserClaim::to_claim).collect())
    }

    /// Insert one row per claim
    pub async fn add_claims(
        &self,
        user: &IdentityUser<K>,
        claims: &[Claim],
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        for claim in claims {
            claim.validate()?;
        }
        let conn = self.connection().await?;
        let backend = conn.get_database_backend();
        for claim in claims {
            let row = UserClaim::from_claim(user.id.clone(), claim);
            conn.execute(statements::insert_user_claim(backend, &row)?)
                .await?;
        }
        debug!(user_id = %user.id, count = claims.len(), "Claims added");
        Ok(())
    }

    /// Swap `claim` for `new_claim`.
    ///
    /// Runs as one delete and one conditional insert without a transaction.
    /// Repeating the call leaves a single `new_claim` row.
    pub async fn replace_claim(
        &self,
        user: &IdentityUser<K>,
        claim: &Claim,
        new_claim: &Claim,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        claim.validate()?;
        new_claim.validate()?;
        let conn = self.connection().await?;
        let old = UserClaim::from_claim(user.id.clone(), claim);
        let new = UserClaim::from_claim(user.id.clone(), new_claim);
        let batch = statements::replace_user_claim(conn.get_database_backend(), &old, &new)?;
        batch.execute(&conn).await?;
        Ok(())
    }

    /// Delete each exactly matching claim row
    pub async fn remove_claims(
        &self,
        user: &IdentityUser<K>,
        claims: &[Claim],
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        for claim in claims {
            claim.validate()?;
        }
        let conn = self.connection().await?;
        let backend = conn.get_database_backend();
        for claim in claims {
            let statement =
                statements::delete_user_claim(backend, &user.id, &claim.claim_type, &claim.value)?;
            conn.execute(statement).await?;
        }
        Ok(())
    }

    /// Users holding a claim with both the same type and value
    pub async fn get_users_for_claim(
        &self,
        claim: &Claim,
        cancel: &CancellationToken,
    ) -> StoreResult<Vec<IdentityUser<K>>> {
        self.check(cancel)?;
        claim.validate()?;
        let conn = self.connection().await?;
        let statement =
            statements::users_for_claim(conn.get_database_backend(), &claim.claim_type, &claim.value)?;
        Self::query_users(&conn, statement).await
    }

    // =========================================================================
    // External logins
    // =========================================================================

    pub async fn add_login(
        &self,
        user: &IdentityUser<K>,
        login: &UserLoginInfo,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        login.validate()?;
        let conn = self.connection().await?;
        let row = UserLogin::from_info(user.id.clone(), login);
        conn.execute(statements::insert_login(conn.get_database_backend(), &row)?)
            .await?;
        debug!(user_id = %user.id, provider = %login.login_provider, "Login added");
        Ok(())
    }

    pub async fn remove_login(
        &self,
        user: &IdentityUser<K>,
        login_provider: &str,
        provider_key: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        require_login(login_provider, provider_key)?;
        let conn = self.connection().await?;
        let statement = statements::delete_login(
            conn.get_database_backend(),
            &user.id,
            login_provider,
            provider_key,
        )?;
        conn.execute(statement).await?;
        Ok(())
    }

    pub async fn get_logins(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Vec<UserLoginInfo>> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        let conn = self.connection().await?;
        let statement = statements::user_logins(conn.get_database_backend(), &user.id)?;
        let rows = conn.query_all(statement).await?;
        let logins = rows
            .iter()
            .map(login_from_row::<K>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logins.iter().map(UserLogin::to_info).collect())
    }

    /// Resolve the login row first, then the user it points to.
    pub async fn find_by_login(
        &self,
        login_provider: &str,
        provider_key: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<IdentityUser<K>>> {
        self.check(cancel)?;
        require_login(login_provider, provider_key)?;
        let conn = self.connection().await?;
        let backend = conn.get_database_backend();
        let statement = statements::find_login(backend, login_provider, provider_key)?;
        let Some(row) = conn.query_one(statement).await? else {
            return Ok(None);
        };
        let login = login_from_row::<K>(&row)?;
        let statement = statements::find_user_by_id(backend, &login.user_id)?;
        Self::query_user(&conn, statement).await
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    async fn read_token(
        conn: &DatabaseConnection,
        user_id: &K,
        login_provider: &str,
        name: &str,
    ) -> StoreResult<Option<QueryResult>> {
        let statement =
            statements::find_token(conn.get_database_backend(), user_id, login_provider, name)?;
        Ok(conn.query_one(statement).await?)
    }

    /// Update the token if present, insert it otherwise
    async fn write_token(
        conn: &DatabaseConnection,
        user_id: &K,
        login_provider: &str,
        name: &str,
        value: Option<&str>,
    ) -> StoreResult<()> {
        let backend = conn.get_database_backend();
        let statement = match Self::read_token(conn, user_id, login_provider, name).await? {
            Some(_) => statements::update_token(backend, user_id, login_provider, name, value)?,
            None => statements::insert_token(backend, user_id, login_provider, name, value)?,
        };
        conn.execute(statement).await?;
        Ok(())
    }

    pub async fn set_token(
        &self,
        user: &IdentityUser<K>,
        login_provider: &str,
        name: &str,
        value: Option<&str>,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        require_token(login_provider, name)?;
        let conn = self.connection().await?;
        Self::write_token(&conn, &user.id, login_provider, name, value).await
    }

    /// Token value, `None` when the token is missing or holds no value
    pub async fn get_token(
        &self,
        user: &IdentityUser<K>,
        login_provider: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        require_token(login_provider, name)?;
        let conn = self.connection().await?;
        match Self::read_token(&conn, &user.id, login_provider, name).await? {
            Some(row) => Ok(token_from_row::<K>(&row)?.value),
            None => Ok(None),
        }
    }

    pub async fn remove_token(
        &self,
        user: &IdentityUser<K>,
        login_provider: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        require_token(login_provider, name)?;
        let conn = self.connection().await?;
        if Self::read_token(&conn, &user.id, login_provider, name)
            .await?
            .is_some()
        {
            let statement =
                statements::delete_token(conn.get_database_backend(), &user.id, login_provider, name)?;
            conn.execute(statement).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Two-factor: authenticator key and recovery codes
    // =========================================================================

    pub async fn set_authenticator_key(
        &self,
        user: &IdentityUser<K>,
        key: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        self.set_token(
            user,
            INTERNAL_LOGIN_PROVIDER,
            AUTHENTICATOR_KEY_TOKEN_NAME,
            Some(key),
            cancel,
        )
        .await
    }

    pub async fn get_authenticator_key(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<String>> {
        self.get_token(user, INTERNAL_LOGIN_PROVIDER, AUTHENTICATOR_KEY_TOKEN_NAME, cancel)
            .await
    }

    /// Overwrite the stored recovery codes
    pub async fn replace_codes<I, S>(
        &self,
        user: &IdentityUser<K>,
        codes: I,
        cancel: &CancellationToken,
    ) -> StoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined = RecoveryCodes::new(codes).join();
        self.set_token(
            user,
            INTERNAL_LOGIN_PROVIDER,
            RECOVERY_CODE_TOKEN_NAME,
            Some(joined.as_str()),
            cancel,
        )
        .await
    }

    /// Consume one code, ignoring case. Returns `false` if nothing matched.
    pub async fn redeem_code(
        &self,
        user: &IdentityUser<K>,
        code: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<bool> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        require_non_empty(code, "code")?;
        let conn = self.connection().await?;
        let mut codes = Self::read_codes(&conn, &user.id).await?;
        if !codes.redeem(code) {
            return Ok(false);
        }
        Self::write_token(
            &conn,
            &user.id,
            INTERNAL_LOGIN_PROVIDER,
            RECOVERY_CODE_TOKEN_NAME,
            Some(codes.join().as_str()),
        )
        .await?;
        debug!(user_id = %user.id, remaining = codes.count(), "Recovery code redeemed");
        Ok(true)
    }

    pub async fn count_codes(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> StoreResult<usize> {
        self.check(cancel)?;
        require_key(&user.id, "user")?;
        let conn = self.connection().await?;
        Ok(Self::read_codes(&conn, &user.id).await?.count())
    }

    async fn read_codes(conn: &DatabaseConnection, user_id: &K) -> StoreResult<RecoveryCodes> {
        let row = Self::read_token(conn, user_id, INTERNAL_LOGIN_PROVIDER, RECOVERY_CODE_TOKEN_NAME).await?;
        let value = match row {
            Some(row) => token_from_row::<K>(&row)?.value,
            None => None,
        };
        Ok(RecoveryCodes::parse(value.as_deref().unwrap_or_default()))
    }
}
