//! Reply repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewReply, Reply, ReplyView};
use crate::{PgConn, PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for replies.
pub trait ReplyRepository {
    /// Inserts a reply.
    ///
    /// Fails with a foreign key violation on `replies_post_id_fkey` if the
    /// parent post was deleted in the meantime.
    fn create_reply(
        &mut self,
        new_reply: NewReply,
    ) -> impl Future<Output = PgResult<Reply>> + Send;

    /// Lists the replies of a post, oldest first.
    fn list_replies(
        &mut self,
        post_id: i64,
    ) -> impl Future<Output = PgResult<Vec<ReplyView>>> + Send;

    /// Counts the replies of a post.
    fn count_replies(&mut self, post_id: i64) -> impl Future<Output = PgResult<i64>> + Send;
}

impl ReplyRepository for PgConn {
    async fn create_reply(&mut self, new_reply: NewReply) -> PgResult<Reply> {
        use schema::replies;

        let conn: &mut PgConnection = self;
        let reply = diesel::insert_into(replies::table)
            .values(&new_reply)
            .returning(Reply::as_returning())
            .get_result(conn)
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            reply_id = reply.id,
            post_id = reply.post_id,
            "reply created"
        );
        Ok(reply)
    }

    async fn list_replies(&mut self, post_id: i64) -> PgResult<Vec<ReplyView>> {
        use schema::{replies, users};

        let conn: &mut PgConnection = self;
        let rows = replies::table
            .inner_join(users::table)
            .filter(replies::post_id.eq(post_id))
            .select((Reply::as_select(), users::username))
            .order((replies::created_at.asc(), replies::id.asc()))
            .load::<(Reply, String)>(conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(reply, username)| ReplyView { reply, username })
            .collect())
    }

    async fn count_replies(&mut self, post_id: i64) -> PgResult<i64> {
        use schema::replies::{self, dsl};

        let conn: &mut PgConnection = self;
        replies::table
            .filter(dsl::post_id.eq(post_id))
            .count()
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }
}
