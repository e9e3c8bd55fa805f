//! Like repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use super::post::post_exists;
use crate::model::{Like, LikeToggle, NewLike};
use crate::{PgConn, PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for likes.
pub trait LikeRepository {
    /// Flips the like of `user_id` on `post_id` and re-counts.
    ///
    /// Runs in a single transaction: checks the post, deletes an existing like
    /// or inserts a new one, then counts. Returns `None` if the post does not
    /// exist. A concurrent insert of the same like fails with a unique
    /// violation on `uix_user_post_like` and rolls back.
    fn toggle_like(
        &mut self,
        user_id: i64,
        post_id: i64,
    ) -> impl Future<Output = PgResult<Option<LikeToggle>>> + Send;

    /// Finds the like of `user_id` on `post_id`.
    fn find_like(
        &mut self,
        user_id: i64,
        post_id: i64,
    ) -> impl Future<Output = PgResult<Option<Like>>> + Send;

    /// Inserts a like.
    fn create_like(&mut self, new_like: NewLike) -> impl Future<Output = PgResult<Like>> + Send;

    /// Counts the likes of a post.
    fn count_likes(&mut self, post_id: i64) -> impl Future<Output = PgResult<i64>> + Send;
}

impl LikeRepository for PgConn {
    async fn toggle_like(&mut self, user_id: i64, post_id: i64) -> PgResult<Option<LikeToggle>> {
        let toggle: PgResult<Option<LikeToggle>> = self
            .transaction(|conn| {
                async move {
                    let conn: &mut PgConnection = conn;
                    if !post_exists(conn, post_id).await? {
                        return Ok(None);
                    }

                    let liked = match find_like(conn, user_id, post_id).await? {
                        Some(like) => {
                            delete_like(conn, like.id).await?;
                            false
                        }
                        None => {
                            insert_like(conn, NewLike { user_id, post_id }).await?;
                            true
                        }
                    };

                    let likes_count = count_likes(conn, post_id).await?;
                    Ok(Some(LikeToggle { liked, likes_count }))
                }
                .scope_boxed()
            })
            .await;
        let toggle = toggle?;

        if let Some(toggle) = toggle {
            tracing::debug!(
                target: TRACING_TARGET_QUERY,
                user_id,
                post_id,
                liked = toggle.liked,
                likes_count = toggle.likes_count,
                "like toggled"
            );
        }

        Ok(toggle)
    }

    async fn find_like(&mut self, user_id: i64, post_id: i64) -> PgResult<Option<Like>> {
        let conn: &mut PgConnection = self;
        find_like(conn, user_id, post_id).await
    }

    async fn create_like(&mut self, new_like: NewLike) -> PgResult<Like> {
        let conn: &mut PgConnection = self;
        insert_like(conn, new_like).await
    }

    async fn count_likes(&mut self, post_id: i64) -> PgResult<i64> {
        let conn: &mut PgConnection = self;
        count_likes(conn, post_id).await
    }
}

async fn find_like(conn: &mut PgConnection, user_id: i64, post_id: i64) -> PgResult<Option<Like>> {
    use schema::likes::{self, dsl};

    likes::table
        .filter(dsl::user_id.eq(user_id))
        .filter(dsl::post_id.eq(post_id))
        .select(Like::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(PgError::from)
}

async fn insert_like(conn: &mut PgConnection, new_like: NewLike) -> PgResult<Like> {
    use schema::likes;

    diesel::insert_into(likes::table)
        .values(&new_like)
        .returning(Like::as_returning())
        .get_result(conn)
        .await
        .map_err(PgError::from)
}

async fn delete_like(conn: &mut PgConnection, like_id: i64) -> PgResult<()> {
    use schema::likes::{self, dsl};

    diesel::delete(likes::table.filter(dsl::id.eq(like_id)))
        .execute(conn)
        .await?;

    Ok(())
}

async fn count_likes(conn: &mut PgConnection, post_id: i64) -> PgResult<i64> {
    use schema::likes::{self, dsl};

    likes::table
        .filter(dsl::post_id.eq(post_id))
        .count()
        .get_result(conn)
        .await
        .map_err(PgError::from)
}
