//! Claims attached to users and roles.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::key::IdentityKey;

/// Type/value pair exchanged with the authentication framework
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    /// A claim needs a type. Empty values are allowed.
    pub fn validate(&self) -> DomainResult<()> {
        if self.claim_type.is_empty() {
            return Err(DomainError::validation("claim_type must not be empty"));
        }
        Ok(())
    }
}

/// Row of the `user_claims` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaim<K: IdentityKey> {
    pub id: i32,
    pub user_id: K,
    pub claim_type: Option<String>,
    pub claim_value: Option<String>,
}

impl<K: IdentityKey> UserClaim<K> {
    /// Build an unsaved row for `claim`
    pub fn from_claim(user_id: K, claim: &Claim) -> Self {
        Self {
            id: 0,
            user_id,
            claim_type: Some(claim.claim_type.clone()),
            claim_value: Some(claim.value.clone()),
        }
    }

    pub fn to_claim(&self) -> Claim {
        Claim::new(
            self.claim_type.clone().unwrap_or_default(),
            self.claim_value.clone().unwrap_or_default(),
        )
    }
}

/// Row of the `role_claims` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaim<K: IdentityKey> {
    pub id: i32,
    pub role_id: K,
    pub claim_type: Option<String>,
    pub claim_value: Option<String>,
}

impl<K: IdentityKey> RoleClaim<K> {
    pub fn from_claim(role_id: K, claim: &Claim) -> Self {
        Self {
            id: 0,
            role_id,
            claim_type: Some(claim.claim_type.clone()),
            claim_value: Some(claim.value.clone()),
        }
    }

    pub fn to_claim(&self) -> Claim {
        Claim::new(
            self.claim_type.clone().unwrap_or_default(),
            self.claim_value.clone().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_claim_keeps_type_and_value() {
        let claim = Claim::new("department", "sales");
        let row = UserClaim::from_claim(7i64, &claim);
        assert_eq!(row.user_id, 7);
        assert_eq!(row.to_claim(), claim);
    }

    #[test]
    fn test_claim_without_type_is_invalid() {
        assert!(Claim::new("", "x").validate().is_err());
        assert!(Claim::new("t", "").validate().is_ok());
    }

    #[test]
    fn test_missing_claim_columns_map_to_empty_strings() {
        let row: RoleClaim<i64> = RoleClaim {
            id: 1,
            role_id: 3,
            claim_type: None,
            claim_value: None,
        };
        assert_eq!(row.to_claim(), Claim::new("", ""));
    }
}
