//! Role domain entity and the user-role join row.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::key::IdentityKey;

/// Role as persisted in the `roles` table. Unique by normalized name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRole<K: IdentityKey> {
    pub id: K,
    pub name: Option<String>,
    pub normalized_name: Option<String>,
    pub concurrency_stamp: Option<String>,
}

impl<K: IdentityKey> IdentityRole<K> {
    /// Create an unsaved role
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: K::default(),
            name: Some(name.into()),
            normalized_name: None,
            concurrency_stamp: Some(Uuid::new_v4().to_string()),
        }
    }
}

/// Membership of a user in a role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRole<K: IdentityKey> {
    pub user_id: K,
    pub role_id: K,
}
