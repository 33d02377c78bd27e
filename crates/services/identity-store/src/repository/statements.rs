//! Parameterized statements issued by the stores.

use sea_orm::{DbBackend, Statement};

use common::StoreResult;
use domain::{IdentityRole, IdentityUser, RoleClaim, UserClaim, UserLogin, UserRole};

use super::key::StoreKey;
use super::mappers::{role_values, user_values};
use crate::sql::schema::*;
use crate::sql::{insert_clause, projection, set_clause, where_clause, Batch, Params};

// =============================================================================
// Users
// =============================================================================

fn user_projection(alias: &str) -> String {
    let mut columns = vec![ID];
    columns.extend_from_slice(USER_COLUMNS);
    projection(alias, &columns)
}

/// Insert a user and return its id. `id` is `None` for database-generated keys.
pub fn insert_user<K: StoreKey>(
    backend: DbBackend,
    id: Option<K>,
    user: &IdentityUser<K>,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let mut columns: Vec<&str> = Vec::with_capacity(USER_COLUMNS.len() + 1);
    let mut placeholders = Vec::with_capacity(USER_COLUMNS.len() + 1);
    if let Some(id) = id {
        columns.push(ID);
        placeholders.push(params.bind(id));
    }
    for (column, value) in USER_COLUMNS.iter().copied().zip(user_values(user)) {
        columns.push(column);
        placeholders.push(params.bind(value));
    }
    let sql = format!(
        "INSERT INTO {} {} RETURNING {}",
        USERS,
        insert_clause(&columns, &placeholders)?,
        ID
    );
    Ok(params.into_statement(sql))
}

/// Full-row update by id. No concurrency-stamp condition.
pub fn update_user<K: StoreKey>(
    backend: DbBackend,
    user: &IdentityUser<K>,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let placeholders: Vec<String> = user_values(user)
        .into_iter()
        .map(|value| params.bind(value))
        .collect();
    let set = set_clause(USER_COLUMNS, &placeholders)?;
    let filter = where_clause(&[params.eq(ID, user.id.clone())])?;
    Ok(params.into_statement(format!("UPDATE {} {} {}", USERS, set, filter)))
}

pub fn delete_user<K: StoreKey>(backend: DbBackend, id: &K) -> StoreResult<Statement> {
    delete_by_id(backend, USERS, id)
}

pub fn find_user_by_id<K: StoreKey>(backend: DbBackend, id: &K) -> StoreResult<Statement> {
    find_user_where(backend, ID, id.clone())
}

pub fn find_user_by_name(backend: DbBackend, normalized_user_name: &str) -> StoreResult<Statement> {
    find_user_where(backend, NORMALIZED_USER_NAME, normalized_user_name)
}

pub fn find_user_by_email(backend: DbBackend, normalized_email: &str) -> StoreResult<Statement> {
    find_user_where(backend, NORMALIZED_EMAIL, normalized_email)
}

fn find_user_where(
    backend: DbBackend,
    column: &str,
    value: impl Into<sea_orm::Value>,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[params.eq(&format!("u.{}", column), value)])?;
    Ok(params.into_statement(format!(
        "SELECT {} FROM {} u {}",
        user_projection("u"),
        USERS,
        filter
    )))
}

/// Users holding a claim with exactly this type and value
pub fn users_for_claim(
    backend: DbBackend,
    claim_type: &str,
    claim_value: &str,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[
        params.eq(CLAIM_TYPE, claim_type),
        params.eq(CLAIM_VALUE, claim_value),
    ])?;
    Ok(params.into_statement(format!(
        "SELECT {} FROM {} u WHERE u.{} IN (SELECT {} FROM {} {})",
        user_projection("u"),
        USERS,
        ID,
        USER_ID,
        USER_CLAIMS,
        filter
    )))
}

/// Users assigned to the role with this normalized name
pub fn users_in_role(backend: DbBackend, normalized_role_name: &str) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[params.eq(&format!("r.{}", NORMALIZED_NAME), normalized_role_name)])?;
    Ok(params.into_statement(format!(
        "SELECT {} FROM {} u \
         INNER JOIN {} ur ON ur.{} = u.{} \
         INNER JOIN {} r ON r.{} = ur.{} {}",
        user_projection("u"),
        USERS,
        USER_ROLES,
        USER_ID,
        ID,
        ROLES,
        ID,
        ROLE_ID,
        filter
    )))
}

// =============================================================================
// Claims
// =============================================================================

pub fn user_claims<K: StoreKey>(backend: DbBackend, user_id: &K) -> StoreResult<Statement> {
    claims_of(backend, USER_CLAIMS, USER_ID, user_id)
}

pub fn insert_user_claim<K: StoreKey>(
    backend: DbBackend,
    claim: &UserClaim<K>,
) -> StoreResult<Statement> {
    insert_claim_row(
        backend,
        USER_CLAIMS,
        USER_ID,
        claim.user_id.clone(),
        claim.claim_type.clone(),
        claim.claim_value.clone(),
    )
}

pub fn delete_user_claim<K: StoreKey>(
    backend: DbBackend,
    user_id: &K,
    claim_type: &str,
    claim_value: &str,
) -> StoreResult<Statement> {
    delete_claim_row(backend, USER_CLAIMS, USER_ID, user_id, claim_type, claim_value)
}

/// Delete `old` if present, then insert `new` unless the user already holds it.
pub fn replace_user_claim<K: StoreKey>(
    backend: DbBackend,
    old: &UserClaim<K>,
    new: &UserClaim<K>,
) -> StoreResult<Batch> {
    let delete = delete_user_claim(
        backend,
        &old.user_id,
        old.claim_type.as_deref().unwrap_or_default(),
        old.claim_value.as_deref().unwrap_or_default(),
    )?;

    let mut params = Params::new(backend);
    let columns = [USER_ID, CLAIM_TYPE, CLAIM_VALUE];
    let values = [
        params.bind(new.user_id.clone()),
        params.bind(new.claim_type.clone()),
        params.bind(new.claim_value.clone()),
    ];
    let exists = where_clause(&[
        params.eq(USER_ID, new.user_id.clone()),
        params.eq(CLAIM_TYPE, new.claim_type.clone()),
        params.eq(CLAIM_VALUE, new.claim_value.clone()),
    ])?;
    let insert = params.into_statement(format!(
        "INSERT INTO {} ({}) SELECT {} WHERE NOT EXISTS (SELECT 1 FROM {} {})",
        USER_CLAIMS,
        columns.join(", "),
        values.join(", "),
        USER_CLAIMS,
        exists
    ));

    Ok(Batch::new().push(delete).push(insert))
}

pub fn role_claims<K: StoreKey>(backend: DbBackend, role_id: &K) -> StoreResult<Statement> {
    claims_of(backend, ROLE_CLAIMS, ROLE_ID, role_id)
}

pub fn insert_role_claim<K: StoreKey>(
    backend: DbBackend,
    claim: &RoleClaim<K>,
) -> StoreResult<Statement> {
    insert_claim_row(
        backend,
        ROLE_CLAIMS,
        ROLE_ID,
        claim.role_id.clone(),
        claim.claim_type.clone(),
        claim.claim_value.clone(),
    )
}

pub fn delete_role_claim<K: StoreKey>(
    backend: DbBackend,
    role_id: &K,
    claim_type: &str,
    claim_value: &str,
) -> StoreResult<Statement> {
    delete_claim_row(backend, ROLE_CLAIMS, ROLE_ID, role_id, claim_type, claim_value)
}

fn claims_of<K: StoreKey>(
    backend: DbBackend,
    table: &str,
    owner_column: &str,
    owner: &K,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[params.eq(owner_column, owner.clone())])?;
    Ok(params.into_statement(format!(
        "SELECT {}, {}, {}, {} FROM {} {} ORDER BY {}",
        ID, owner_column, CLAIM_TYPE, CLAIM_VALUE, table, filter, ID
    )))
}

fn insert_claim_row<K: StoreKey>(
    backend: DbBackend,
    table: &str,
    owner_column: &str,
    owner: K,
    claim_type: Option<String>,
    claim_value: Option<String>,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let placeholders = [
        params.bind(owner),
        params.bind(claim_type),
        params.bind(claim_value),
    ];
    let values = insert_clause(&[owner_column, CLAIM_TYPE, CLAIM_VALUE], &placeholders)?;
    Ok(params.into_statement(format!("INSERT INTO {} {}", table, values)))
}

fn delete_claim_row<K: StoreKey>(
    backend: DbBackend,
    table: &str,
    owner_column: &str,
    owner: &K,
    claim_type: &str,
    claim_value: &str,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[
        params.eq(owner_column, owner.clone()),
        params.eq(CLAIM_TYPE, claim_type),
        params.eq(CLAIM_VALUE, claim_value),
    ])?;
    Ok(params.into_statement(format!("DELETE FROM {} {}", table, filter)))
}

// =============================================================================
// Logins
// =============================================================================

const LOGIN_COLUMNS: [&str; 4] = [LOGIN_PROVIDER, PROVIDER_KEY, PROVIDER_DISPLAY_NAME, USER_ID];

pub fn insert_login<K: StoreKey>(backend: DbBackend, login: &UserLogin<K>) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let placeholders = [
        params.bind(login.login_provider.clone()),
        params.bind(login.provider_key.clone()),
        params.bind(login.provider_display_name.clone()),
        params.bind(login.user_id.clone()),
    ];
    let values = insert_clause(&LOGIN_COLUMNS, &placeholders)?;
    Ok(params.into_statement(format!("INSERT INTO {} {}", USER_LOGINS, values)))
}

pub fn delete_login<K: StoreKey>(
    backend: DbBackend,
    user_id: &K,
    login_provider: &str,
    provider_key: &str,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[
        params.eq(USER_ID, user_id.clone()),
        params.eq(LOGIN_PROVIDER, login_provider),
        params.eq(PROVIDER_KEY, provider_key),
    ])?;
    Ok(params.into_statement(format!("DELETE FROM {} {}", USER_LOGINS, filter)))
}

pub fn user_logins<K: StoreKey>(backend: DbBackend, user_id: &K) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[params.eq(USER_ID, user_id.clone())])?;
    Ok(params.into_statement(format!(
        "SELECT {} FROM {} {}",
        LOGIN_COLUMNS.join(", "),
        USER_LOGINS,
        filter
    )))
}

pub fn find_login(
    backend: DbBackend,
    login_provider: &str,
    provider_key: &str,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[
        params.eq(LOGIN_PROVIDER, login_provider),
        params.eq(PROVIDER_KEY, provider_key),
    ])?;
    Ok(params.into_statement(format!(
        "SELECT {} FROM {} {}",
        LOGIN_COLUMNS.join(", "),
        USER_LOGINS,
        filter
    )))
}

// =============================================================================
// Tokens
// =============================================================================

fn token_filter<K: StoreKey>(
    params: &mut Params,
    user_id: &K,
    login_provider: &str,
    name: &str,
) -> StoreResult<String> {
    where_clause(&[
        params.eq(USER_ID, user_id.clone()),
        params.eq(LOGIN_PROVIDER, login_provider),
        params.eq(NAME, name),
    ])
}

pub fn find_token<K: StoreKey>(
    backend: DbBackend,
    user_id: &K,
    login_provider: &str,
    name: &str,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = token_filter(&mut params, user_id, login_provider, name)?;
    Ok(params.into_statement(format!(
        "SELECT {}, {}, {}, {} FROM {} {}",
        USER_ID, LOGIN_PROVIDER, NAME, VALUE, USER_TOKENS, filter
    )))
}

pub fn insert_token<K: StoreKey>(
    backend: DbBackend,
    user_id: &K,
    login_provider: &str,
    name: &str,
    value: Option<&str>,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let placeholders = [
        params.bind(user_id.clone()),
        params.bind(login_provider),
        params.bind(name),
        params.bind(value.map(str::to_string)),
    ];
    let values = insert_clause(&[USER_ID, LOGIN_PROVIDER, NAME, VALUE], &placeholders)?;
    Ok(params.into_statement(format!("INSERT INTO {} {}", USER_TOKENS, values)))
}

pub fn update_token<K: StoreKey>(
    backend: DbBackend,
    user_id: &K,
    login_provider: &str,
    name: &str,
    value: Option<&str>,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let set = set_clause(&[VALUE], &[params.bind(value.map(str::to_string))])?;
    let filter = token_filter(&mut params, user_id, login_provider, name)?;
    Ok(params.into_statement(format!("UPDATE {} {} {}", USER_TOKENS, set, filter)))
}

pub fn delete_token<K: StoreKey>(
    backend: DbBackend,
    user_id: &K,
    login_provider: &str,
    name: &str,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = token_filter(&mut params, user_id, login_provider, name)?;
    Ok(params.into_statement(format!("DELETE FROM {} {}", USER_TOKENS, filter)))
}

// =============================================================================
// Roles and memberships
// =============================================================================

fn role_projection() -> String {
    let mut columns = vec![ID];
    columns.extend_from_slice(ROLE_COLUMNS);
    columns.join(", ")
}

pub fn insert_role<K: StoreKey>(
    backend: DbBackend,
    id: Option<K>,
    role: &IdentityRole<K>,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let mut columns: Vec<&str> = Vec::with_capacity(ROLE_COLUMNS.len() + 1);
    let mut placeholders = Vec::with_capacity(ROLE_COLUMNS.len() + 1);
    if let Some(id) = id {
        columns.push(ID);
        placeholders.push(params.bind(id));
    }
    for (column, value) in ROLE_COLUMNS.iter().copied().zip(role_values(role)) {
        columns.push(column);
        placeholders.push(params.bind(value));
    }
    let sql = format!(
        "INSERT INTO {} {} RETURNING {}",
        ROLES,
        insert_clause(&columns, &placeholders)?,
        ID
    );
    Ok(params.into_statement(sql))
}

pub fn update_role<K: StoreKey>(
    backend: DbBackend,
    role: &IdentityRole<K>,
) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let placeholders: Vec<String> = role_values(role)
        .into_iter()
        .map(|value| params.bind(value))
        .collect();
    let set = set_clause(ROLE_COLUMNS, &placeholders)?;
    let filter = where_clause(&[params.eq(ID, role.id.clone())])?;
    Ok(params.into_statement(format!("UPDATE {} {} {}", ROLES, set, filter)))
}

pub fn delete_role<K: StoreKey>(backend: DbBackend, id: &K) -> StoreResult<Statement> {
    delete_by_id(backend, ROLES, id)
}

pub fn find_role_by_id<K: StoreKey>(backend: DbBackend, id: &K) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[params.eq(ID, id.clone())])?;
    Ok(params.into_statement(format!(
        "SELECT {} FROM {} {}",
        role_projection(),
        ROLES,
        filter
    )))
}

pub fn find_role_by_name(backend: DbBackend, normalized_name: &str) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[params.eq(NORMALIZED_NAME, normalized_name)])?;
    Ok(params.into_statement(format!(
        "SELECT {} FROM {} {}",
        role_projection(),
        ROLES,
        filter
    )))
}

/// Add the membership unless it already exists
pub fn insert_user_role<K: StoreKey>(
    backend: DbBackend,
    membership: &UserRole<K>,
) -> StoreResult<Statement> {
    let (user_id, role_id) = (&membership.user_id, &membership.role_id);
    let mut params = Params::new(backend);
    let values = [params.bind(user_id.clone()), params.bind(role_id.clone())];
    let exists = where_clause(&[
        params.eq(USER_ID, user_id.clone()),
        params.eq(ROLE_ID, role_id.clone()),
    ])?;
    Ok(params.into_statement(format!(
        "INSERT INTO {} ({}, {}) SELECT {} WHERE NOT EXISTS (SELECT 1 FROM {} {})",
        USER_ROLES,
        USER_ID,
        ROLE_ID,
        values.join(", "),
        USER_ROLES,
        exists
    )))
}

pub fn delete_user_role<K: StoreKey>(
    backend: DbBackend,
    membership: &UserRole<K>,
) -> StoreResult<Statement> {
    let (user_id, role_id) = (&membership.user_id, &membership.role_id);
    let mut params = Params::new(backend);
    let filter = where_clause(&[
        params.eq(USER_ID, user_id.clone()),
        params.eq(ROLE_ID, role_id.clone()),
    ])?;
    Ok(params.into_statement(format!("DELETE FROM {} {}", USER_ROLES, filter)))
}

/// Names of every role the user belongs to
pub fn role_names_for_user<K: StoreKey>(backend: DbBackend, user_id: &K) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[params.eq(&format!("ur.{}", USER_ID), user_id.clone())])?;
    Ok(params.into_statement(format!(
        "SELECT r.{} FROM {} r INNER JOIN {} ur ON ur.{} = r.{} {} ORDER BY r.{}",
        NAME, ROLES, USER_ROLES, ROLE_ID, ID, filter, NAME
    )))
}

pub fn count_user_role<K: StoreKey>(
    backend: DbBackend,
    membership: &UserRole<K>,
) -> StoreResult<Statement> {
    let (user_id, role_id) = (&membership.user_id, &membership.role_id);
    let mut params = Params::new(backend);
    let filter = where_clause(&[
        params.eq(USER_ID, user_id.clone()),
        params.eq(ROLE_ID, role_id.clone()),
    ])?;
    Ok(params.into_statement(format!(
        "SELECT COUNT(*) AS total FROM {} {}",
        USER_ROLES, filter
    )))
}

fn delete_by_id<K: StoreKey>(backend: DbBackend, table: &str, id: &K) -> StoreResult<Statement> {
    let mut params = Params::new(backend);
    let filter = where_clause(&[params.eq(ID, id.clone())])?;
    Ok(params.into_statement(format!("DELETE FROM {} {}", table, filter)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Claim;

    #[test]
    fn test_insert_user_without_key_lets_database_assign_it() {
        let user: IdentityUser<i64> = IdentityUser::new("alice");
        let statement = insert_user(DbBackend::Postgres, None, &user).unwrap();
        assert!(statement.sql.starts_with("INSERT INTO users (user_name, "));
        assert!(statement.sql.ends_with("$14) RETURNING id"));
    }

    #[test]
    fn test_insert_user_with_key_binds_id_first() {
        let user: IdentityUser<i64> = IdentityUser::new("alice");
        let statement = insert_user(DbBackend::Postgres, Some(5i64), &user).unwrap();
        assert!(statement.sql.starts_with("INSERT INTO users (id, user_name, "));
        assert!(statement.sql.contains("$15) RETURNING id"));
    }

    #[test]
    fn test_update_user_filters_on_id_only() {
        let mut user: IdentityUser<i64> = IdentityUser::new("alice");
        user.id = 3;
        let statement = update_user(DbBackend::Postgres, &user).unwrap();
        assert!(statement.sql.starts_with("UPDATE users SET user_name = $1, "));
        assert!(statement.sql.ends_with("WHERE id = $15"));
        assert!(!statement.sql.contains("WHERE concurrency_stamp"));
    }

    #[test]
    fn test_find_by_name_uses_normalized_column() {
        let statement = find_user_by_name(DbBackend::Sqlite, "ALICE").unwrap();
        assert!(statement.sql.ends_with("WHERE u.normalized_user_name = ?"));
    }

    #[test]
    fn test_replace_claim_is_delete_then_conditional_insert() {
        let old = UserClaim::from_claim(1i64, &Claim::new("t", "old"));
        let new = UserClaim::from_claim(1i64, &Claim::new("t", "new"));
        let batch = replace_user_claim(DbBackend::Postgres, &old, &new).unwrap();
        let statements = batch.statements();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].sql.starts_with("DELETE FROM user_claims WHERE"));
        assert_eq!(
            statements[1].sql,
            "INSERT INTO user_claims (user_id, claim_type, claim_value) SELECT $1, $2, $3 \
             WHERE NOT EXISTS (SELECT 1 FROM user_claims WHERE user_id = $4 AND claim_type = $5 AND claim_value = $6)"
        );
    }

    #[test]
    fn test_users_in_role_joins_through_memberships() {
        let statement = users_in_role(DbBackend::Postgres, "ADMIN").unwrap();
        assert!(statement.sql.contains("INNER JOIN user_roles ur ON ur.user_id = u.id"));
        assert!(statement.sql.contains("INNER JOIN roles r ON r.id = ur.role_id"));
        assert!(statement.sql.ends_with("WHERE r.normalized_name = $1"));
    }

    #[test]
    fn test_update_token_binds_value_before_filter() {
        let statement = update_token(DbBackend::Postgres, &1i64, "p", "n", Some("v")).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE user_tokens SET value = $1 WHERE user_id = $2 AND login_provider = $3 AND name = $4"
        );
    }
}
