//! Posts and the feed view.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::posts;
use crate::types::{HasCreatedAt, HasUpdatedAt};

/// A short text update owned by a single user.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    /// Unique post identifier.
    pub id: i64,
    /// Owner; never changes after creation.
    pub user_id: i64,
    /// Trimmed text, 1 to 280 characters.
    pub content: String,
    /// Timestamp when the post was created.
    pub created_at: Timestamp,
    /// Timestamp when the post was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a post.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPost {
    /// Owner of the post.
    pub user_id: i64,
    /// Already validated and trimmed text.
    pub content: String,
}

/// A post joined with its author and its derived counters.
#[derive(Debug, Clone, PartialEq)]
pub struct PostView {
    /// The post row.
    pub post: Post,
    /// Author username.
    pub username: String,
    /// Author display name.
    pub display_name: Option<String>,
    /// Number of likes, counted at read time.
    pub likes_count: i64,
    /// Number of replies, counted at read time.
    pub replies_count: i64,
}

impl PostView {
    /// Returns whether `user_id` owns the post.
    #[inline]
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.post.is_owned_by(user_id)
    }
}

impl Post {
    /// Returns whether `user_id` owns the post.
    #[inline]
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

impl HasCreatedAt for Post {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

impl HasUpdatedAt for Post {
    fn updated_at(&self) -> jiff::Timestamp {
        self.updated_at.into()
    }
}
