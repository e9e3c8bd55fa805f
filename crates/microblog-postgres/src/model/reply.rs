//! Replies to posts.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::replies;
use crate::types::HasCreatedAt;

/// A reply to a post.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = replies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reply {
    /// Unique reply identifier.
    pub id: i64,
    /// Parent post.
    pub post_id: i64,
    /// Author of the reply.
    pub user_id: i64,
    /// Trimmed text, 1 to 280 characters.
    pub content: String,
    /// Timestamp when the reply was created.
    pub created_at: Timestamp,
}

/// Data for creating a reply.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = replies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewReply {
    /// Parent post.
    pub post_id: i64,
    /// Author of the reply.
    pub user_id: i64,
    /// Already validated and trimmed text.
    pub content: String,
}

/// A reply joined with its author's username.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyView {
    /// The reply row.
    pub reply: Reply,
    /// Author username.
    pub username: String,
}

impl HasCreatedAt for Reply {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}
