//! User domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::key::IdentityKey;

/// Canonical form used for case-insensitive uniqueness and lookup.
pub fn normalize(value: &str) -> String {
    value.to_uppercase()
}

/// User account as persisted in the `users` table.
///
/// Field changes made through store setters live only on this value until
/// the store's `update` is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityUser<K: IdentityKey> {
    pub id: K,
    pub user_name: Option<String>,
    pub normalized_user_name: Option<String>,
    pub email: Option<String>,
    pub normalized_email: Option<String>,
    pub email_confirmed: bool,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub security_stamp: Option<String>,
    pub concurrency_stamp: Option<String>,
    pub phone_number: Option<String>,
    pub phone_number_confirmed: bool,
    pub two_factor_enabled: bool,
    /// End of lockout (None or past = not locked out)
    pub lockout_end: Option<DateTime<Utc>>,
    pub lockout_enabled: bool,
    pub access_failed_count: i32,
}

impl<K: IdentityKey> Default for IdentityUser<K> {
    fn default() -> Self {
        Self {
            id: K::default(),
            user_name: None,
            normalized_user_name: None,
            email: None,
            normalized_email: None,
            email_confirmed: false,
            password_hash: None,
            security_stamp: None,
            concurrency_stamp: Some(Uuid::new_v4().to_string()),
            phone_number: None,
            phone_number_confirmed: false,
            two_factor_enabled: false,
            lockout_end: None,
            lockout_enabled: false,
            access_failed_count: 0,
        }
    }
}

impl<K: IdentityKey> IdentityUser<K> {
    /// Create an unsaved user with fresh security and concurrency stamps
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: Some(user_name.into()),
            security_stamp: Some(Uuid::new_v4().to_string()),
            ..Self::default()
        }
    }

    /// Check if the user is locked out at the given instant
    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.lockout_enabled && self.lockout_end.is_some_and(|end| end > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_normalize_uppercases() {
        assert_eq!(normalize("alice@x.com"), "ALICE@X.COM");
    }

    #[test]
    fn test_new_user_has_stamps_and_no_id() {
        let user: IdentityUser<i64> = IdentityUser::new("alice");
        assert_eq!(user.id, 0);
        assert_eq!(user.user_name.as_deref(), Some("alice"));
        assert!(user.security_stamp.is_some());
        assert!(user.concurrency_stamp.is_some());
        assert_eq!(user.access_failed_count, 0);
    }

    #[test]
    fn test_lockout_requires_enabled_flag_and_future_end() {
        let now = Utc::now();
        let mut user: IdentityUser<i64> = IdentityUser::new("bob");
        user.lockout_end = Some(now + Duration::minutes(5));
        assert!(!user.is_locked_out(now));

        user.lockout_enabled = true;
        assert!(user.is_locked_out(now));

        user.lockout_end = Some(now - Duration::minutes(5));
        assert!(!user.is_locked_out(now));
    }
}
