//! Posts, likes and replies.
//!
//! Every mutation takes the already resolved author, validates its input
//! before touching the store, and relies on the database constraints as the
//! final guard against concurrent writers.

use microblog_postgres::model::{LikeToggle, NewPost, NewReply, PostView, ReplyView, User};
use microblog_postgres::query::{LikeRepository, PostRepository, ReplyRepository};
use microblog_postgres::types::Pagination;
use microblog_postgres::types::constants::content::MAX_CONTENT_LENGTH;
use microblog_postgres::{PgClient, Store};

use crate::utility::trimmed_len;
use crate::utility::tracing_targets::TRACING_TARGET_CONTENT as TRACING_TARGET;
use crate::{ContentViolation, Error, ErrorKind, Resource, Result};

/// Kind of text body being validated; selects the error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Post,
    Reply,
}

impl ContentKind {
    const fn empty_message(self) -> &'static str {
        match self {
            Self::Post => "Content cannot be empty",
            Self::Reply => "Reply content cannot be empty",
        }
    }

    const fn too_long_message(self) -> &'static str {
        match self {
            Self::Post => "Content exceeds 280 characters",
            Self::Reply => "Reply exceeds 280 characters",
        }
    }
}

/// Trims `content` and checks it is non-empty and at most 280 characters.
pub fn validate_content(content: &str, kind: ContentKind) -> Result<String> {
    let (trimmed, len) = trimmed_len(content);

    if len == 0 {
        return Err(Error::validation(
            ContentViolation::Empty,
            kind.empty_message(),
        ));
    }

    if len > MAX_CONTENT_LENGTH {
        return Err(Error::validation(
            ContentViolation::TooLong,
            kind.too_long_message(),
        ));
    }

    Ok(trimmed.to_owned())
}

/// A post with its replies, oldest reply first.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub view: PostView,
    pub replies: Vec<ReplyView>,
}

/// Content integrity rules for posts, likes and replies.
#[derive(Debug, Clone)]
pub struct ContentService<S = PgClient> {
    store: S,
}

impl<S: Store> ContentService<S> {
    /// Creates a new content service.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Publishes a post owned by `author`.
    pub async fn create_post(&self, author: &User, content: &str) -> Result<PostView> {
        let content = validate_content(content, ContentKind::Post)?;
        let mut conn = self.store.connection().await?;

        let post = conn
            .create_post(NewPost {
                user_id: author.id,
                content,
            })
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = author.id,
            post_id = post.id,
            "post created"
        );

        Ok(PostView {
            post,
            username: author.username.clone(),
            display_name: author.display_name.clone(),
            likes_count: 0,
            replies_count: 0,
        })
    }

    /// Returns one page of the global feed, newest first.
    pub async fn list_feed(&self, pagination: Pagination) -> Result<Vec<PostView>> {
        let mut conn = self.store.connection().await?;
        Ok(conn.list_posts(pagination).await?)
    }

    /// Returns a post with its counters and replies.
    pub async fn get_post(&self, post_id: i64) -> Result<PostDetail> {
        let mut conn = self.store.connection().await?;
        let view = conn
            .find_post_view(post_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Post))?;

        let replies = conn.list_replies(post_id).await?;
        Ok(PostDetail { view, replies })
    }

    /// Counts the likes of an existing post.
    pub async fn get_like_count(&self, post_id: i64) -> Result<i64> {
        let mut conn = self.store.connection().await?;
        if !conn.post_exists(post_id).await? {
            return Err(Error::not_found(Resource::Post));
        }

        Ok(conn.count_likes(post_id).await?)
    }

    /// Likes the post if `user` has not liked it yet, otherwise removes the like.
    ///
    /// Losing an insert race against the same user surfaces as a conflict.
    pub async fn toggle_like(&self, user: &User, post_id: i64) -> Result<LikeToggle> {
        let mut conn = self.store.connection().await?;

        let toggle = match conn.toggle_like(user.id, post_id).await {
            Ok(Some(toggle)) => toggle,
            Ok(None) => return Err(Error::not_found(Resource::Post)),
            Err(err) => {
                let error = Error::from(err);
                if error.kind() == ErrorKind::Conflict {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        user_id = user.id,
                        post_id,
                        "concurrent like lost the race"
                    );
                }
                return Err(error);
            }
        };

        tracing::debug!(
            target: TRACING_TARGET,
            user_id = user.id,
            post_id,
            liked = toggle.liked,
            likes_count = toggle.likes_count,
            "like toggled"
        );

        Ok(toggle)
    }

    /// Adds a reply by `author` to an existing post.
    ///
    /// The parent post is checked before the content, so replying to a
    /// missing post reports not found even for invalid content.
    pub async fn create_reply(
        &self,
        author: &User,
        post_id: i64,
        content: &str,
    ) -> Result<ReplyView> {
        let mut conn = self.store.connection().await?;
        if !conn.post_exists(post_id).await? {
            return Err(Error::not_found(Resource::Post));
        }

        let content = validate_content(content, ContentKind::Reply)?;
        let reply = conn
            .create_reply(NewReply {
                post_id,
                user_id: author.id,
                content,
            })
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = author.id,
            post_id,
            reply_id = reply.id,
            "reply created"
        );

        Ok(ReplyView {
            reply,
            username: author.username.clone(),
        })
    }

    /// Lists the replies of an existing post, oldest first.
    pub async fn list_replies(&self, post_id: i64) -> Result<Vec<ReplyView>> {
        let mut conn = self.store.connection().await?;
        if !conn.post_exists(post_id).await? {
            return Err(Error::not_found(Resource::Post));
        }

        Ok(conn.list_replies(post_id).await?)
    }

    /// Deletes a post owned by `user`, together with its likes and replies.
    pub async fn delete_post(&self, user: &User, post_id: i64) -> Result<()> {
        let mut conn = self.store.connection().await?;
        let post = conn
            .find_post_by_id(post_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Post))?;

        if !post.is_owned_by(user.id) {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = user.id,
                post_id,
                "refused to delete a post owned by another user"
            );
            return Err(Error::forbidden("Only the author can delete this post"));
        }

        if !conn.delete_post(post_id).await? {
            return Err(Error::not_found(Resource::Post));
        }

        tracing::info!(
            target: TRACING_TARGET,
            user_id = user.id,
            post_id,
            "post deleted"
        );

        Ok(())
    }
}
