//! Like counter and toggle handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use microblog_postgres::Store;

use super::request::{LikeCountParams, PostPathParams};
use super::response::{LikeCount, LikeStatus};
use crate::extract::{AuthState, Json, Path, Query};
use crate::handler::Result;
use crate::service::{ContentService, ServiceState};

/// Tracing target for like operations.
const TRACING_TARGET: &str = "microblog_server::handler::likes";

/// Returns the number of likes on a post.
#[tracing::instrument(skip_all)]
async fn get_like_count<S: Store>(
    State(content_service): State<ContentService<S>>,
    Query(params): Query<LikeCountParams>,
) -> Result<Json<LikeCount>> {
    let likes_count = content_service.get_like_count(params.post_id).await?;

    Ok(Json(LikeCount {
        post_id: params.post_id,
        likes_count,
    }))
}

/// Likes the post, or removes the like if the caller already liked it.
#[tracing::instrument(skip_all)]
async fn toggle_like<S: Store>(
    State(content_service): State<ContentService<S>>,
    AuthState(user): AuthState,
    Path(path): Path<PostPathParams>,
) -> Result<Json<LikeStatus>> {
    let toggle = content_service.toggle_like(&user, path.id).await?;

    tracing::info!(
        target: TRACING_TARGET,
        post_id = path.id,
        user_id = user.id,
        liked = toggle.liked,
        likes_count = toggle.likes_count,
        "like toggled"
    );

    Ok(Json(LikeStatus::from(toggle)))
}

/// Returns a [`Router`] with the like routes.
pub fn routes<S: Store>() -> Router<ServiceState<S>> {
    Router::new()
        .route("/get_like_numbers_by_post_id", get(get_like_count::<S>))
        .route("/posts/{id}/like", post(toggle_like::<S>))
}
