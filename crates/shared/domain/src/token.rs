//! Authentication tokens stored per user.

use serde::{Deserialize, Serialize};

use crate::key::IdentityKey;

/// Row of the `user_tokens` table, keyed by (user, provider, name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken<K: IdentityKey> {
    pub user_id: K,
    pub login_provider: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub value: Option<String>,
}
