//! Current user and public profile handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use microblog_postgres::Store;

use super::request::{UpdateProfile, UserPathParams};
use super::response::{Me, UserProfile};
use crate::extract::{AuthState, Json, Path, ValidateJson};
use crate::handler::Result;
use crate::service::{AuthService, ServiceState};

/// Tracing target for account operations.
const TRACING_TARGET: &str = "microblog_server::handler::accounts";

/// Returns the authenticated user.
#[tracing::instrument(skip_all)]
async fn get_me(AuthState(user): AuthState) -> Result<Json<Me>> {
    Ok(Json(Me::from(user)))
}

/// Updates the profile fields present in the body.
#[tracing::instrument(skip_all)]
async fn update_me<S: Store>(
    State(auth_service): State<AuthService<S>>,
    AuthState(user): AuthState,
    ValidateJson(request): ValidateJson<UpdateProfile>,
) -> Result<Json<Me>> {
    let updated = auth_service
        .update_profile(&user, request.into_model())
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = updated.id,
        "profile updated"
    );

    Ok(Json(Me::from(updated)))
}

/// Returns a public profile with the user's posts.
#[tracing::instrument(skip_all)]
async fn get_user<S: Store>(
    State(auth_service): State<AuthService<S>>,
    Path(path): Path<UserPathParams>,
) -> Result<Json<UserProfile>> {
    let profile = auth_service.get_profile(&path.username).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        user_id = profile.user.id,
        posts = profile.posts.len(),
        "profile read"
    );

    Ok(Json(UserProfile::from(profile)))
}

/// Returns a [`Router`] with the account routes.
pub fn routes<S: Store>() -> Router<ServiceState<S>> {
    Router::new()
        .route("/me", get(get_me).put(update_me::<S>))
        .route("/users/{username}", get(get_user::<S>))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::http::header::WWW_AUTHENTICATE;
    use serde_json::{Value, json};

    use crate::handler::response::UserProfile;
    use crate::handler::test::{create_test_server, register_and_login};

    #[tokio::test]
    async fn me_requires_a_token() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server.get("/me").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.header(WWW_AUTHENTICATE), "Bearer");
        assert_eq!(response.json::<Value>()["message"], "Not authenticated");

        let response = server.get("/me").authorization_bearer("garbage").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<Value>()["message"],
            "Could not validate credentials"
        );
        Ok(())
    }

    #[tokio::test]
    async fn me_returns_current_user() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        let token = register_and_login(&server, "ada").await;

        let response = server.get("/me").authorization_bearer(&token).await;
        response.assert_status_ok();
        response.assert_json(&json!({ "username": "ada", "email": "ada@example.com" }));
        Ok(())
    }

    #[tokio::test]
    async fn update_keeps_absent_fields() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        let token = register_and_login(&server, "ada").await;

        server
            .put("/me")
            .authorization_bearer(&token)
            .json(&json!({ "display_name": "Ada L.", "bio": "Analyst" }))
            .await
            .assert_status_ok();

        server
            .put("/me")
            .authorization_bearer(&token)
            .json(&json!({ "bio": "Poet" }))
            .await
            .assert_status_ok();

        let profile = server.get("/users/ada").await.json::<UserProfile>();
        assert_eq!(profile.display_name.as_deref(), Some("Ada L."));
        assert_eq!(profile.bio.as_deref(), Some("Poet"));
        assert_eq!(profile.avatar_url, None);
        Ok(())
    }

    #[tokio::test]
    async fn profile_lists_posts_newest_first() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        let token = register_and_login(&server, "ada").await;

        for content in ["first", "second"] {
            server
                .post("/posts")
                .authorization_bearer(&token)
                .json(&json!({ "content": content }))
                .await
                .assert_status_ok();
        }

        let profile = server.get("/users/ada").await.json::<UserProfile>();
        let contents: Vec<_> = profile.posts.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, ["second", "first"]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server.get("/users/nobody").await;
        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["message"], "User not found");
        Ok(())
    }
}
