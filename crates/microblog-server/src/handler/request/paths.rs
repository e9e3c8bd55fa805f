//! Path parameter types for HTTP handlers.

use serde::{Deserialize, Serialize};

/// Path parameters for post operations.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PostPathParams {
    /// Identifier of the post.
    pub id: i64,
}

/// Path parameters for public profile lookups.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPathParams {
    pub username: String,
}
