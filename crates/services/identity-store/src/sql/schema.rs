//! Table and column names of the identity schema.
//!
//! Must stay in sync with `infra::migrations`.

pub const USERS: &str = "users";
pub const ROLES: &str = "roles";
pub const USER_CLAIMS: &str = "user_claims";
pub const USER_LOGINS: &str = "user_logins";
pub const USER_ROLES: &str = "user_roles";
pub const USER_TOKENS: &str = "user_tokens";
pub const ROLE_CLAIMS: &str = "role_claims";

pub const ID: &str = "id";
pub const USER_ID: &str = "user_id";
pub const ROLE_ID: &str = "role_id";

pub const NORMALIZED_USER_NAME: &str = "normalized_user_name";
pub const NORMALIZED_EMAIL: &str = "normalized_email";

/// `users` columns other than `id`, in mapper order
pub const USER_COLUMNS: &[&str] = &[
    "user_name",
    NORMALIZED_USER_NAME,
    "email",
    NORMALIZED_EMAIL,
    "email_confirmed",
    "password_hash",
    "security_stamp",
    "concurrency_stamp",
    "phone_number",
    "phone_number_confirmed",
    "two_factor_enabled",
    "lockout_end",
    "lockout_enabled",
    "access_failed_count",
];

pub const NAME: &str = "name";
pub const NORMALIZED_NAME: &str = "normalized_name";

/// `roles` columns other than `id`, in mapper order
pub const ROLE_COLUMNS: &[&str] = &[NAME, NORMALIZED_NAME, "concurrency_stamp"];

pub const CLAIM_TYPE: &str = "claim_type";
pub const CLAIM_VALUE: &str = "claim_value";

pub const LOGIN_PROVIDER: &str = "login_provider";
pub const PROVIDER_KEY: &str = "provider_key";
pub const PROVIDER_DISPLAY_NAME: &str = "provider_display_name";

pub const VALUE: &str = "value";
