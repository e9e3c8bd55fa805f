//! Authentication request types.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for registration.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Register {
    /// Unique handle of the new user.
    #[validate(length(min = 1, max = 32))]
    pub username: String,

    /// Email address; the domain part is stored lowercased.
    #[validate(email, length(max = 255))]
    pub email: String,

    /// Plaintext password.
    pub password: String,
}

/// Request payload for login.
///
/// `hashed_password` carries either the plaintext password or the exact
/// stored hash.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Login {
    /// Email address of the account.
    #[validate(email, length(max = 255))]
    pub email: String,

    /// Password or stored hash of the account.
    pub hashed_password: String,
}
