//! Likes: presence of a row means the user likes the post.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::likes;
use crate::types::HasCreatedAt;

/// A like of one post by one user.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Like {
    /// Unique like identifier.
    pub id: i64,
    /// User who liked the post.
    pub user_id: i64,
    /// Liked post.
    pub post_id: i64,
    /// Timestamp when the like was created.
    pub created_at: Timestamp,
}

/// Data for creating a like.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewLike {
    /// User who likes the post.
    pub user_id: i64,
    /// Liked post.
    pub post_id: i64,
}

/// Outcome of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    /// Whether the user likes the post after the toggle.
    pub liked: bool,
    /// Number of likes after the toggle.
    pub likes_count: i64,
}

impl HasCreatedAt for Like {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}
