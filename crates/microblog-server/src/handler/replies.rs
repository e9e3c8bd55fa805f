//! Reply handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use microblog_postgres::Store;

use super::request::{CreateContent, PostPathParams};
use super::response::Reply;
use crate::extract::{AuthState, Json, Path};
use crate::handler::Result;
use crate::service::{ContentService, ServiceState};

/// Tracing target for reply operations.
const TRACING_TARGET: &str = "microblog_server::handler::replies";

/// Replies to a post as the authenticated user.
#[tracing::instrument(skip_all)]
async fn create_reply<S: Store>(
    State(content_service): State<ContentService<S>>,
    AuthState(user): AuthState,
    Path(path): Path<PostPathParams>,
    Json(request): Json<CreateContent>,
) -> Result<Json<Reply>> {
    let reply = content_service
        .create_reply(&user, path.id, &request.content)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        post_id = path.id,
        reply_id = reply.reply.id,
        user_id = user.id,
        "reply created"
    );

    Ok(Json(Reply::from(reply)))
}

/// Lists the replies of a post, oldest first.
#[tracing::instrument(skip_all)]
async fn list_replies<S: Store>(
    State(content_service): State<ContentService<S>>,
    Path(path): Path<PostPathParams>,
) -> Result<Json<Vec<Reply>>> {
    let replies = content_service.list_replies(path.id).await?;
    Ok(Json(replies.into_iter().map(Reply::from).collect()))
}

/// Returns a [`Router`] with the reply routes.
pub fn routes<S: Store>() -> Router<ServiceState<S>> {
    Router::new()
        .route("/posts/{id}/reply", post(create_reply::<S>))
        .route("/posts/{id}/replies", get(list_replies::<S>))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::handler::response::{PostSummary, Reply};
    use crate::handler::test::{create_test_server, register_and_login};

    #[tokio::test]
    async fn replies_are_listed_oldest_first() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        let ada = register_and_login(&server, "ada").await;
        let grace = register_and_login(&server, "grace").await;

        let post = server
            .post("/posts")
            .authorization_bearer(&ada)
            .json(&json!({ "content": "thoughts?" }))
            .await
            .json::<PostSummary>();
        let reply_path = format!("/posts/{}/reply", post.id);

        let reply = server
            .post(&reply_path)
            .authorization_bearer(&grace)
            .json(&json!({ "content": "  agreed  " }))
            .await
            .json::<Reply>();
        assert_eq!(reply.content, "agreed");
        assert_eq!(reply.username, "grace");
        assert_eq!(reply.post_id, post.id);

        server
            .post(&reply_path)
            .authorization_bearer(&ada)
            .json(&json!({ "content": "thanks" }))
            .await
            .assert_status_ok();

        let replies = server
            .get(&format!("/posts/{}/replies", post.id))
            .await
            .json::<Vec<Reply>>();
        let contents: Vec<_> = replies.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["agreed", "thanks"]);
        Ok(())
    }

    #[tokio::test]
    async fn reply_validation_uses_reply_messages() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;
        let token = register_and_login(&server, "ada").await;

        let post = server
            .post("/posts")
            .authorization_bearer(&token)
            .json(&json!({ "content": "hello" }))
            .await
            .json::<PostSummary>();
        let reply_path = format!("/posts/{}/reply", post.id);

        let cases = [
            (" ".to_owned(), "Reply content cannot be empty"),
            ("b".repeat(281), "Reply exceeds 280 characters"),
        ];

        for (content, message) in cases {
            let response = server
                .post(&reply_path)
                .authorization_bearer(&token)
                .json(&json!({ "content": content }))
                .await;
            response.assert_status_bad_request();
            assert_eq!(response.json::<Value>()["message"], message);
        }

        assert_eq!(store.reply_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn missing_post_is_checked_before_content() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        let token = register_and_login(&server, "ada").await;

        let response = server
            .post("/posts/777/reply")
            .authorization_bearer(&token)
            .json(&json!({ "content": "" }))
            .await;
        response.assert_status_not_found();

        server.get("/posts/777/replies").await.assert_status_not_found();
        Ok(())
    }
}
