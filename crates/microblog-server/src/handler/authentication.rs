//! Registration and login handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::post;
use microblog_postgres::Store;

use super::request::{Login, Register};
use super::response::{Registered, Token};
use crate::extract::{Json, ValidateJson};
use crate::handler::Result;
use crate::service::{AuthService, ServiceState};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "microblog_server::handler::authentication";

/// Creates a new account.
#[tracing::instrument(skip_all)]
async fn register<S: Store>(
    State(auth_service): State<AuthService<S>>,
    ValidateJson(request): ValidateJson<Register>,
) -> Result<Json<Registered>> {
    tracing::debug!(
        target: TRACING_TARGET,
        username = %request.username,
        "registration requested"
    );

    let user = auth_service
        .register(&request.username, &request.email, &request.password)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = user.id,
        "user registered"
    );

    Ok(Json(Registered::from(user)))
}

/// Exchanges credentials for a bearer token.
#[tracing::instrument(skip_all)]
async fn login<S: Store>(
    State(auth_service): State<AuthService<S>>,
    ValidateJson(request): ValidateJson<Login>,
) -> Result<Json<Token>> {
    let session = auth_service
        .login(&request.email, &request.hashed_password)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        login_path = session.login_path.as_str(),
        "login succeeded"
    );

    Ok(Json(Token::bearer(session.access_token)))
}

/// Returns a [`Router`] with registration and login.
pub fn routes<S: Store>() -> Router<ServiceState<S>> {
    Router::new()
        .route("/register", post(register::<S>))
        .route("/login", post(login::<S>))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use super::*;
    use crate::handler::test::{TEST_PASSWORD, create_test_server, register_and_login};

    #[tokio::test]
    async fn register_returns_public_fields() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;

        let response = server
            .post("/register")
            .json(&json!({
                "username": "ada",
                "email": "Ada@Example.COM",
                "password": TEST_PASSWORD,
            }))
            .await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["username"], "ada");
        assert_eq!(body["email"], "Ada@example.com");
        assert!(body["id"].is_i64());
        assert!(body.get("password_hash").is_none());
        assert_eq!(store.user_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        register_and_login(&server, "ada").await;

        let response = server
            .post("/register")
            .json(&json!({
                "username": "ada",
                "email": "other@example.com",
                "password": TEST_PASSWORD,
            }))
            .await;
        response.assert_status_bad_request();

        let body = response.json::<Value>();
        assert_eq!(body["message"], "Username already registered");
        assert_eq!(body["resource"], "username");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        register_and_login(&server, "ada").await;

        let response = server
            .post("/register")
            .json(&json!({
                "username": "grace",
                "email": "ada@EXAMPLE.com",
                "password": TEST_PASSWORD,
            }))
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["message"], "Email already registered");
        Ok(())
    }

    #[tokio::test]
    async fn email_local_part_keeps_its_case() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;

        for (username, email) in [("alice", "Alice@example.com"), ("bob", "alice@example.com")] {
            server
                .post("/register")
                .json(&json!({
                    "username": username,
                    "email": email,
                    "password": TEST_PASSWORD,
                }))
                .await
                .assert_status_ok();
        }
        assert_eq!(store.user_count(), 2);

        let response = server
            .post("/login")
            .json(&json!({ "email": "Alice@Example.com", "hashed_password": TEST_PASSWORD }))
            .await;
        response.assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn invalid_registration_payloads_are_bad_requests() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;

        let long_username = "x".repeat(33);
        let payloads = [
            json!({ "username": "ada", "email": "not-an-email", "password": "pw" }),
            json!({ "username": long_username, "email": "a@example.com", "password": "pw" }),
            json!({ "username": "ada", "email": "a@example.com" }),
        ];

        for payload in payloads {
            let response = server.post("/register").json(&payload).await;
            response.assert_status_bad_request();
            assert_eq!(response.json::<Value>()["name"], "bad_request");
        }

        assert_eq!(store.user_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn login_requires_a_valid_email() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        register_and_login(&server, "ada").await;

        let response = server
            .post("/login")
            .json(&json!({ "email": "ada", "hashed_password": TEST_PASSWORD }))
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["name"], "bad_request");
        Ok(())
    }

    #[tokio::test]
    async fn login_issues_bearer_token() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        let token = register_and_login(&server, "ada").await;
        assert_eq!(token.split('.').count(), 3);

        let response = server
            .post("/login")
            .json(&json!({ "email": "ada@example.com", "hashed_password": TEST_PASSWORD }))
            .await;
        assert_eq!(response.json::<Token>().token_type, "bearer");
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        register_and_login(&server, "ada").await;

        let wrong_password = server
            .post("/login")
            .json(&json!({ "email": "ada@example.com", "hashed_password": "nope" }))
            .await;
        let unknown_email = server
            .post("/login")
            .json(&json!({ "email": "who@example.com", "hashed_password": "nope" }))
            .await;

        for response in [wrong_password, unknown_email] {
            response.assert_status(StatusCode::UNAUTHORIZED);
            assert_eq!(
                response.json::<Value>()["message"],
                "Incorrect email or password"
            );
        }
        Ok(())
    }
}
