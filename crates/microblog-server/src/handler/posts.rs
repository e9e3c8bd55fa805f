//! Post handlers: create, feed, detail and delete.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use microblog_postgres::Store;

use super::request::{CreateContent, FeedParams, PostPathParams};
use super::response::{PostDetail, PostSummary};
use crate::extract::{AuthState, Json, Path, Query};
use crate::handler::Result;
use crate::service::{ContentService, ServiceState};

/// Tracing target for post operations.
const TRACING_TARGET: &str = "microblog_server::handler::posts";

/// Publishes a post as the authenticated user.
#[tracing::instrument(skip_all)]
async fn create_post<S: Store>(
    State(content_service): State<ContentService<S>>,
    AuthState(user): AuthState,
    Json(request): Json<CreateContent>,
) -> Result<Json<PostSummary>> {
    let view = content_service.create_post(&user, &request.content).await?;

    tracing::info!(
        target: TRACING_TARGET,
        post_id = view.post.id,
        user_id = user.id,
        "post created"
    );

    Ok(Json(PostSummary::from(view)))
}

/// Returns one page of the global feed, newest first.
#[tracing::instrument(skip_all)]
async fn list_posts<S: Store>(
    State(content_service): State<ContentService<S>>,
    Query(params): Query<FeedParams>,
) -> Result<Json<Vec<PostSummary>>> {
    let pagination = params.into_pagination();
    let posts = content_service.list_feed(pagination).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        limit = pagination.limit,
        offset = pagination.offset,
        count = posts.len(),
        "feed listed"
    );

    Ok(Json(posts.into_iter().map(PostSummary::from).collect()))
}

/// Returns a post with its replies.
#[tracing::instrument(skip_all)]
async fn get_post<S: Store>(
    State(content_service): State<ContentService<S>>,
    Path(path): Path<PostPathParams>,
) -> Result<Json<PostDetail>> {
    let detail = content_service.get_post(path.id).await?;
    Ok(Json(PostDetail::from(detail)))
}

/// Deletes a post owned by the authenticated user.
#[tracing::instrument(skip_all)]
async fn delete_post<S: Store>(
    State(content_service): State<ContentService<S>>,
    AuthState(user): AuthState,
    Path(path): Path<PostPathParams>,
) -> Result<StatusCode> {
    content_service.delete_post(&user, path.id).await?;

    tracing::info!(
        target: TRACING_TARGET,
        post_id = path.id,
        user_id = user.id,
        "post deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with the post routes.
pub fn routes<S: Store>() -> Router<ServiceState<S>> {
    Router::new()
        .route("/posts", get(list_posts::<S>).post(create_post::<S>))
        .route("/posts/{id}", get(get_post::<S>).delete(delete_post::<S>))
}
