//! Authentication response types.

use microblog_postgres::model::User;
use serde::{Deserialize, Serialize};

/// Response returned after a successful registration.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registered {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for Registered {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Response returned after a successful login.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Signed session token to send as `Authorization: Bearer <token>`.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
}

impl Token {
    /// Wraps a bearer access token.
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_owned(),
        }
    }
}
