//! Health check handler.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use microblog_postgres::Store;

use super::response::Health;
use crate::extract::Json;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "microblog_server::handler::monitors";

/// Reports process liveness and database reachability.
///
/// Answers `503` while the database cannot be reached.
#[tracing::instrument(skip_all)]
async fn health<S: Store>(State(state): State<ServiceState<S>>) -> (StatusCode, Json<Health>) {
    let database_up = match state.store.ping().await {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "database ping failed"
            );
            false
        }
    };

    let health = Health::from_database(database_up);
    let status_code = match health.is_healthy() {
        true => StatusCode::OK,
        false => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Returns a [`Router`] with the health route.
pub fn routes<S: Store>() -> Router<ServiceState<S>> {
    Router::new().route("/health", get(health::<S>))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::handler::response::Health;
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn healthy_when_database_is_up() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server.get("/health").await;
        response.assert_status_ok();

        let health = response.json::<Health>();
        assert_eq!(health.status, "ok");
        assert_eq!(health.database, "up");
        Ok(())
    }

    #[tokio::test]
    async fn degraded_when_database_is_down() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;
        store.set_available(false);

        let response = server.get("/health").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let health = response.json::<Health>();
        assert_eq!(health.status, "degraded");
        assert_eq!(health.database, "down");
        Ok(())
    }
}
