//! Key types the stores can bind and read back.

use sea_orm::{TryGetable, Value};
use uuid::Uuid;

use domain::IdentityKey;

/// Identity key persisted through sea-orm.
pub trait StoreKey: IdentityKey + Into<Value> + TryGetable {
    /// Key for a new row, or `None` when the database assigns it.
    fn generate() -> Option<Self> {
        None
    }
}

impl StoreKey for i32 {}

impl StoreKey for i64 {}

impl StoreKey for Uuid {
    fn generate() -> Option<Self> {
        Some(Uuid::new_v4())
    }
}

impl StoreKey for String {
    fn generate() -> Option<Self> {
        Some(Uuid::new_v4().to_string())
    }
}

/// Key to insert explicitly, if any. Assigns a generated key to `id` in place.
pub(crate) fn key_for_insert<K: StoreKey>(id: &mut K) -> Option<K> {
    if id.is_assigned() {
        return Some(id.clone());
    }
    let generated = K::generate()?;
    *id = generated.clone();
    Some(generated)
}
