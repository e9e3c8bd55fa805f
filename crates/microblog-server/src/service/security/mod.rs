//! Credential hashing and session token services.

mod password_hasher;
mod session_keys;

pub use password_hasher::PasswordHasher;
pub use session_keys::{MIN_SECRET_LENGTH, SessionClaims, SessionKeys, SessionKeysConfig};
