//! External login bindings.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::key::IdentityKey;

/// Provider binding as exchanged with the authentication framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLoginInfo {
    pub login_provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
}

impl UserLoginInfo {
    pub fn new(
        login_provider: impl Into<String>,
        provider_key: impl Into<String>,
        provider_display_name: Option<String>,
    ) -> Self {
        Self {
            login_provider: login_provider.into(),
            provider_key: provider_key.into(),
            provider_display_name,
        }
    }

    /// Provider and key together identify the login and must both be set
    pub fn validate(&self) -> DomainResult<()> {
        if self.login_provider.is_empty() {
            return Err(DomainError::validation("login_provider must not be empty"));
        }
        if self.provider_key.is_empty() {
            return Err(DomainError::validation("provider_key must not be empty"));
        }
        Ok(())
    }
}

/// Row of the `user_logins` table. At most one user per (provider, key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLogin<K: IdentityKey> {
    pub login_provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
    pub user_id: K,
}

impl<K: IdentityKey> UserLogin<K> {
    pub fn from_info(user_id: K, info: &UserLoginInfo) -> Self {
        Self {
            login_provider: info.login_provider.clone(),
            provider_key: info.provider_key.clone(),
            provider_display_name: info.provider_display_name.clone(),
            user_id,
        }
    }

    pub fn to_info(&self) -> UserLoginInfo {
        UserLoginInfo {
            login_provider: self.login_provider.clone(),
            provider_key: self.provider_key.clone(),
            provider_display_name: self.provider_display_name.clone(),
        }
    }
}
