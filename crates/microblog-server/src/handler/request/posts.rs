//! Post, reply and like request types.

use microblog_postgres::types::Pagination;
use serde::{Deserialize, Serialize};

/// Request payload for creating a post or a reply.
///
/// Content rules (trimming, emptiness, length) are enforced by the content
/// service so that posts and replies report their own messages.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateContent {
    pub content: String,
}

/// Query parameters of the feed.
#[must_use]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct FeedParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FeedParams {
    /// Clamps the parameters into a valid [`Pagination`].
    #[inline]
    pub fn into_pagination(self) -> Pagination {
        Pagination::from_params(self.limit, self.offset)
    }
}

/// Query parameters of the like counter.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikeCountParams {
    pub post_id: i64,
}
