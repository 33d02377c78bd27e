//! Conversion between domain entities and row parameter sets.
//!
//! Value vectors follow the column order in [`crate::sql::schema`].

use sea_orm::{DbErr, QueryResult, Value};

use domain::{IdentityRole, IdentityUser, RoleClaim, UserClaim, UserLogin, UserToken};

use super::key::StoreKey;
use crate::sql::schema::{
    CLAIM_TYPE, CLAIM_VALUE, ID, LOGIN_PROVIDER, NAME, NORMALIZED_NAME, PROVIDER_DISPLAY_NAME,
    PROVIDER_KEY, ROLE_ID, USER_ID, VALUE,
};

/// Parameter values for [`USER_COLUMNS`](crate::sql::schema::USER_COLUMNS)
pub fn user_values<K: StoreKey>(user: &IdentityUser<K>) -> Vec<Value> {
    vec![
        user.user_name.clone().into(),
        user.normalized_user_name.clone().into(),
        user.email.clone().into(),
        user.normalized_email.clone().into(),
        user.email_confirmed.into(),
        user.password_hash.clone().into(),
        user.security_stamp.clone().into(),
        user.concurrency_stamp.clone().into(),
        user.phone_number.clone().into(),
        user.phone_number_confirmed.into(),
        user.two_factor_enabled.into(),
        user.lockout_end.into(),
        user.lockout_enabled.into(),
        user.access_failed_count.into(),
    ]
}

pub fn user_from_row<K: StoreKey>(row: &QueryResult) -> Result<IdentityUser<K>, DbErr> {
    Ok(IdentityUser {
        id: row.try_get("", ID)?,
        user_name: row.try_get("", "user_name")?,
        normalized_user_name: row.try_get("", "normalized_user_name")?,
        email: row.try_get("", "email")?,
        normalized_email: row.try_get("", "normalized_email")?,
        email_confirmed: row.try_get("", "email_confirmed")?,
        password_hash: row.try_get("", "password_hash")?,
        security_stamp: row.try_get("", "security_stamp")?,
        concurrency_stamp: row.try_get("", "concurrency_stamp")?,
        phone_number: row.try_get("", "phone_number")?,
        phone_number_confirmed: row.try_get("", "phone_number_confirmed")?,
        two_factor_enabled: row.try_get("", "two_factor_enabled")?,
        lockout_end: row.try_get("", "lockout_end")?,
        lockout_enabled: row.try_get("", "lockout_enabled")?,
        access_failed_count: row.try_get("", "access_failed_count")?,
    })
}

/// Parameter values for [`ROLE_COLUMNS`](crate::sql::schema::ROLE_COLUMNS)
pub fn role_values<K: StoreKey>(role: &IdentityRole<K>) -> Vec<Value> {
    vec![
        role.name.clone().into(),
        role.normalized_name.clone().into(),
        role.concurrency_stamp.clone().into(),
    ]
}

pub fn role_from_row<K: StoreKey>(row: &QueryResult) -> Result<IdentityRole<K>, DbErr> {
    Ok(IdentityRole {
        id: row.try_get("", ID)?,
        name: row.try_get("", NAME)?,
        normalized_name: row.try_get("", NORMALIZED_NAME)?,
        concurrency_stamp: row.try_get("", "concurrency_stamp")?,
    })
}

pub fn user_claim_from_row<K: StoreKey>(row: &QueryResult) -> Result<UserClaim<K>, DbErr> {
    Ok(UserClaim {
        id: row.try_get("", ID)?,
        user_id: row.try_get("", USER_ID)?,
        claim_type: row.try_get("", CLAIM_TYPE)?,
        claim_value: row.try_get("", CLAIM_VALUE)?,
    })
}

pub fn role_claim_from_row<K: StoreKey>(row: &QueryResult) -> Result<RoleClaim<K>, DbErr> {
    Ok(RoleClaim {
        id: row.try_get("", ID)?,
        role_id: row.try_get("", ROLE_ID)?,
        claim_type: row.try_get("", CLAIM_TYPE)?,
        claim_value: row.try_get("", CLAIM_VALUE)?,
    })
}

pub fn login_from_row<K: StoreKey>(row: &QueryResult) -> Result<UserLogin<K>, DbErr> {
    Ok(UserLogin {
        login_provider: row.try_get("", LOGIN_PROVIDER)?,
        provider_key: row.try_get("", PROVIDER_KEY)?,
        provider_display_name: row.try_get("", PROVIDER_DISPLAY_NAME)?,
        user_id: row.try_get("", USER_ID)?,
    })
}

pub fn token_from_row<K: StoreKey>(row: &QueryResult) -> Result<UserToken<K>, DbErr> {
    Ok(UserToken {
        user_id: row.try_get("", USER_ID)?,
        login_provider: row.try_get("", LOGIN_PROVIDER)?,
        name: row.try_get("", NAME)?,
        value: row.try_get("", VALUE)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::schema::{ROLE_COLUMNS, USER_COLUMNS};

    #[test]
    fn test_user_values_match_column_list() {
        let user: IdentityUser<i64> = IdentityUser::new("alice");
        let values = user_values(&user);
        assert_eq!(values.len(), USER_COLUMNS.len());
        assert_eq!(values[0], Value::from(Some("alice".to_string())));
        assert_eq!(values[13], Value::from(0i32));
    }

    #[test]
    fn test_role_values_match_column_list() {
        let role: IdentityRole<i64> = IdentityRole::new("Admin");
        assert_eq!(role_values(&role).len(), ROLE_COLUMNS.len());
    }
}
