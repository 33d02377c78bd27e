//! Domain layer - Identity entities and value objects.
//!
//! This crate contains the shapes an authentication framework hands to the
//! store: users, roles, claims, external logins and tokens. All types are
//! generic over the key type and carry no infrastructure dependencies.

pub mod claim;
pub mod constants;
pub mod error;
pub mod key;
pub mod login;
pub mod recovery;
pub mod result;
pub mod role;
pub mod token;
pub mod user;

pub use claim::{Claim, RoleClaim, UserClaim};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use key::{convert_id_from_string, convert_id_to_string, IdentityKey};
pub use login::{UserLogin, UserLoginInfo};
pub use recovery::RecoveryCodes;
pub use result::{IdentityError, IdentityResult};
pub use role::{IdentityRole, UserRole};
pub use token::UserToken;
pub use user::{normalize, IdentityUser};
