//! Identity keys and their string conversion.
//!
//! External callers address users and roles by string id. The store keeps a
//! native key type; these helpers translate between the two.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Key type usable as a user or role identity.
///
/// The `Default` value stands for "not assigned yet".
pub trait IdentityKey:
    Clone + Default + Debug + Display + FromStr + PartialEq + Eq + Hash + Send + Sync + 'static
{
    /// Whether this key has been assigned.
    fn is_assigned(&self) -> bool {
        *self != Self::default()
    }
}

impl IdentityKey for i32 {}
impl IdentityKey for i64 {}
impl IdentityKey for Uuid {}
impl IdentityKey for String {}

/// Convert a key to its external string form. Unassigned keys become `None`.
pub fn convert_id_to_string<K: IdentityKey>(id: &K) -> Option<String> {
    id.is_assigned().then(|| id.to_string())
}

/// Parse an external string id. Absent or empty input is `Ok(None)`.
pub fn convert_id_from_string<K: IdentityKey>(id: Option<&str>) -> DomainResult<Option<K>> {
    match id {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s
            .parse::<K>()
            .map(Some)
            .map_err(|_| DomainError::invalid_key(s)),
    }
}
