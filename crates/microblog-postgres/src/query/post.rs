//! Post repository and feed queries.

use std::collections::HashMap;
use std::future::Future;

use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewPost, Post, PostView};
use crate::types::Pagination;
use crate::{PgConn, PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for posts.
///
/// Every listing is ordered newest first with the id as tie-break, so pages
/// never overlap or skip rows.
pub trait PostRepository {
    /// Inserts a new post.
    fn create_post(&mut self, new_post: NewPost) -> impl Future<Output = PgResult<Post>> + Send;

    /// Finds a post by id.
    fn find_post_by_id(
        &mut self,
        post_id: i64,
    ) -> impl Future<Output = PgResult<Option<Post>>> + Send;

    /// Finds a post with its author and counters.
    fn find_post_view(
        &mut self,
        post_id: i64,
    ) -> impl Future<Output = PgResult<Option<PostView>>> + Send;

    /// Lists one page of the global feed.
    fn list_posts(
        &mut self,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<PostView>>> + Send;

    /// Lists every post of one user.
    fn list_user_posts(
        &mut self,
        user_id: i64,
    ) -> impl Future<Output = PgResult<Vec<PostView>>> + Send;

    /// Deletes a post together with its likes and replies.
    ///
    /// Returns whether a row was deleted.
    fn delete_post(&mut self, post_id: i64) -> impl Future<Output = PgResult<bool>> + Send;

    /// Returns whether the post exists.
    fn post_exists(&mut self, post_id: i64) -> impl Future<Output = PgResult<bool>> + Send;
}

impl PostRepository for PgConn {
    async fn create_post(&mut self, new_post: NewPost) -> PgResult<Post> {
        use schema::posts;

        let conn: &mut PgConnection = self;
        let post = diesel::insert_into(posts::table)
            .values(&new_post)
            .returning(Post::as_returning())
            .get_result(conn)
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            post_id = post.id,
            user_id = post.user_id,
            "post created"
        );
        Ok(post)
    }

    async fn find_post_by_id(&mut self, post_id: i64) -> PgResult<Option<Post>> {
        use schema::posts::{self, dsl};

        let conn: &mut PgConnection = self;
        posts::table
            .filter(dsl::id.eq(post_id))
            .select(Post::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_post_view(&mut self, post_id: i64) -> PgResult<Option<PostView>> {
        use schema::{posts, users};

        let conn: &mut PgConnection = self;
        let rows = posts::table
            .inner_join(users::table)
            .filter(posts::id.eq(post_id))
            .select((Post::as_select(), users::username, users::display_name))
            .load::<AuthoredPost>(conn)
            .await?;

        Ok(attach_counters(conn, rows).await?.pop())
    }

    async fn list_posts(&mut self, pagination: Pagination) -> PgResult<Vec<PostView>> {
        use schema::{posts, users};

        let conn: &mut PgConnection = self;
        let rows = posts::table
            .inner_join(users::table)
            .select((Post::as_select(), users::username, users::display_name))
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load::<AuthoredPost>(conn)
            .await?;

        attach_counters(conn, rows).await
    }

    async fn list_user_posts(&mut self, user_id: i64) -> PgResult<Vec<PostView>> {
        use schema::{posts, users};

        let conn: &mut PgConnection = self;
        let rows = posts::table
            .inner_join(users::table)
            .filter(posts::user_id.eq(user_id))
            .select((Post::as_select(), users::username, users::display_name))
            .order((posts::created_at.desc(), posts::id.desc()))
            .load::<AuthoredPost>(conn)
            .await?;

        attach_counters(conn, rows).await
    }

    async fn delete_post(&mut self, post_id: i64) -> PgResult<bool> {
        use schema::posts::{self, dsl};

        let conn: &mut PgConnection = self;
        let deleted = diesel::delete(posts::table.filter(dsl::id.eq(post_id)))
            .execute(conn)
            .await?;

        Ok(deleted > 0)
    }

    async fn post_exists(&mut self, post_id: i64) -> PgResult<bool> {
        let conn: &mut PgConnection = self;
        post_exists(conn, post_id).await
    }
}

/// A post row joined with its author's username and display name.
type AuthoredPost = (Post, String, Option<String>);

/// Returns whether the post exists.
pub(crate) async fn post_exists(conn: &mut PgConnection, post_id: i64) -> PgResult<bool> {
    use schema::posts::{self, dsl};

    diesel::select(diesel::dsl::exists(posts::table.filter(dsl::id.eq(post_id))))
        .get_result(conn)
        .await
        .map_err(PgError::from)
}

/// Counts likes and replies for the given posts with one grouped query each.
async fn attach_counters(
    conn: &mut PgConnection,
    rows: Vec<AuthoredPost>,
) -> PgResult<Vec<PostView>> {
    use schema::{likes, replies};

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i64> = rows.iter().map(|(post, ..)| post.id).collect();

    let likes_counts: HashMap<i64, i64> = likes::table
        .filter(likes::post_id.eq_any(&post_ids))
        .group_by(likes::post_id)
        .select((likes::post_id, count_star()))
        .load::<(i64, i64)>(conn)
        .await?
        .into_iter()
        .collect();

    let replies_counts: HashMap<i64, i64> = replies::table
        .filter(replies::post_id.eq_any(&post_ids))
        .group_by(replies::post_id)
        .select((replies::post_id, count_star()))
        .load::<(i64, i64)>(conn)
        .await?
        .into_iter()
        .collect();

    let views = rows
        .into_iter()
        .map(|(post, username, display_name)| PostView {
            likes_count: likes_counts.get(&post.id).copied().unwrap_or_default(),
            replies_count: replies_counts.get(&post.id).copied().unwrap_or_default(),
            post,
            username,
            display_name,
        })
        .collect();

    Ok(views)
}
