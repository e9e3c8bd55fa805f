//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use microblog_server::handler::routes;
//! use microblog_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example(config: ServiceConfig) -> anyhow::Result<()> {
//! let state = ServiceState::from_config(&config).await?;
//! let router = routes(state);
//! # let _ = router;
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod accounts;
mod authentication;
mod error;
mod likes;
mod monitors;
mod posts;
mod replies;
pub mod request;
pub mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};
use microblog_postgres::Store;

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with every route of the API bound to `state`.
///
/// Unknown paths answer with a `404 not_found` JSON body.
pub fn routes<S: Store>(state: ServiceState<S>) -> Router {
    Router::new()
        .merge(authentication::routes())
        .merge(accounts::routes())
        .merge(posts::routes())
        .merge(likes::routes())
        .merge(replies::routes())
        .merge(monitors::routes())
        .fallback(fallback)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test {
    use std::time::Duration;

    use axum_test::TestServer;
    use microblog_test::MemoryStore;
    use serde_json::json;

    use crate::handler::response::Token;
    use crate::service::{ServiceState, SessionKeys};

    /// Signing secret shared by handler tests.
    pub const TEST_SECRET: &[u8] = b"handler-test-secret-with-32-plus-bytes";

    /// Password every test user registers with.
    pub const TEST_PASSWORD: &str = "correct horse battery staple";

    /// Returns application state over a fresh in-memory store.
    pub fn create_test_state() -> anyhow::Result<ServiceState<MemoryStore>> {
        let session_keys = SessionKeys::from_secret(TEST_SECRET, Duration::from_secs(3600))?;
        Ok(ServiceState::new(MemoryStore::new(), session_keys))
    }

    /// Returns a new [`TestServer`] over the full router and its store.
    pub fn create_test_server() -> anyhow::Result<(TestServer, MemoryStore)> {
        let state = create_test_state()?;
        let store = state.store.clone();
        let server = TestServer::new(super::routes(state))?;
        Ok((server, store))
    }

    /// Registers `username` and logs in, returning the access token.
    pub async fn register_and_login(server: &TestServer, username: &str) -> String {
        let email = format!("{username}@example.com");

        server
            .post("/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": TEST_PASSWORD,
            }))
            .await
            .assert_status_ok();

        let response = server
            .post("/login")
            .json(&json!({ "email": email, "hashed_password": TEST_PASSWORD }))
            .await;
        response.assert_status_ok();

        response.json::<Token>().access_token
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server.get("/does-not-exist").expect_failure().await;
        response.assert_status_not_found();

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }
}
