//! Repositories over the pooled connection and the [`Store`] abstraction.
//!
//! Each repository trait is implemented on [`PgConn`]. Services are written
//! against [`Store`], which hands out connections implementing all of them, so
//! the same service code runs on PostgreSQL and on the in-memory store used in
//! tests.

pub mod like;
pub mod post;
pub mod reply;
pub mod user;

use std::future::Future;

pub use like::LikeRepository;
pub use post::PostRepository;
pub use reply::ReplyRepository;
pub use user::UserRepository;

use crate::{PgClient, PgConn, PgResult};

/// A source of connections that implement every repository.
pub trait Store: Clone + Send + Sync + 'static {
    /// Connection type handed out for one unit of work.
    type Connection: UserRepository
        + PostRepository
        + LikeRepository
        + ReplyRepository
        + Send;

    /// Checks a connection out of the store.
    fn connection(&self) -> impl Future<Output = PgResult<Self::Connection>> + Send;

    /// Verifies that the store is reachable.
    fn ping(&self) -> impl Future<Output = PgResult<()>> + Send;
}

impl Store for PgClient {
    type Connection = PgConn;

    async fn connection(&self) -> PgResult<PgConn> {
        self.get_connection().await
    }

    async fn ping(&self) -> PgResult<()> {
        PgClient::ping(self).await
    }
}
