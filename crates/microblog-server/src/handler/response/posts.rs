//! Post, reply and like response types.

use jiff::Timestamp;
use microblog_postgres::model::{LikeToggle, PostView, ReplyView};
use serde::{Deserialize, Serialize};

use crate::service::PostDetail as PostDetailView;

/// A post as it appears in feeds and profiles.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub username: String,
    pub display_name: Option<String>,
    pub likes_count: i64,
    pub replies_count: i64,
}

impl From<PostView> for PostSummary {
    fn from(view: PostView) -> Self {
        Self {
            id: view.post.id,
            user_id: view.post.user_id,
            content: view.post.content,
            created_at: view.post.created_at.into(),
            updated_at: view.post.updated_at.into(),
            username: view.username,
            display_name: view.display_name,
            likes_count: view.likes_count,
            replies_count: view.replies_count,
        }
    }
}

/// A single post with its replies, oldest reply first.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub username: String,
    pub display_name: Option<String>,
    pub likes_count: i64,
    pub replies: Vec<Reply>,
}

impl From<PostDetailView> for PostDetail {
    fn from(detail: PostDetailView) -> Self {
        let PostDetailView { view, replies } = detail;
        Self {
            id: view.post.id,
            user_id: view.post.user_id,
            content: view.post.content,
            created_at: view.post.created_at.into(),
            updated_at: view.post.updated_at.into(),
            username: view.username,
            display_name: view.display_name,
            likes_count: view.likes_count,
            replies: replies.into_iter().map(Reply::from).collect(),
        }
    }
}

/// A reply to a post.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: Timestamp,
    pub username: String,
}

impl From<ReplyView> for Reply {
    fn from(view: ReplyView) -> Self {
        Self {
            id: view.reply.id,
            post_id: view.reply.post_id,
            user_id: view.reply.user_id,
            content: view.reply.content,
            created_at: view.reply.created_at.into(),
            username: view.username,
        }
    }
}

/// Number of likes on a post.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikeCount {
    pub post_id: i64,
    pub likes_count: i64,
}

/// Outcome of a like toggle.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeStatus {
    /// Whether the caller likes the post after the toggle.
    pub liked: bool,
    pub likes_count: i64,
}

impl From<LikeToggle> for LikeStatus {
    fn from(toggle: LikeToggle) -> Self {
        Self {
            liked: toggle.liked,
            likes_count: toggle.likes_count,
        }
    }
}
