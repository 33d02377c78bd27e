//! Repository layer for identity data access.

mod guard;
pub mod key;
mod mappers;
mod role_store;
mod role_user_store;
pub mod statements;
mod user_store;

pub use key::StoreKey;
pub use role_store::RoleStore;
pub use role_user_store::RoleUserStore;
pub use user_store::UserStore;
