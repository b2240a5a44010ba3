//! Comment endpoints, nested under a post.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    routing::get,
};
use yatube_common::AppResult;
use yatube_core::{CreateCommentInput, UpdateCommentInput};
use yatube_db::entities::user;

use crate::{
    extractors::{AuthUser, JsonBody, PathParams},
    middleware::AppState,
    permissions::{authenticated_or_read_only, ensure_author},
    response::{CommentResponse, Created, no_content},
};

/// List the comments of a post.
async fn list(
    State(state): State<AppState>,
    PathParams(post_id): PathParams<i64>,
) -> AppResult<Json<Vec<CommentResponse>>> {
    let comments = state.comment_service.list(post_id).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// Get one comment of a post.
async fn retrieve(
    State(state): State<AppState>,
    PathParams((post_id, id)): PathParams<(i64, i64)>,
) -> AppResult<Json<CommentResponse>> {
    let detail = state.comment_service.get(post_id, id).await?;
    Ok(Json(detail.into()))
}

/// Comment on a post as the current user.
async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathParams(post_id): PathParams<i64>,
    JsonBody(input): JsonBody<CreateCommentInput>,
) -> AppResult<Created<CommentResponse>> {
    let detail = state.comment_service.create(post_id, &user, input).await?;
    Ok(Created(detail.into()))
}

async fn apply_update(
    state: &AppState,
    user: &user::Model,
    (post_id, id): (i64, i64),
    input: UpdateCommentInput,
    partial: bool,
) -> AppResult<CommentResponse> {
    let existing = state.comment_service.get(post_id, id).await?;
    ensure_author(user, &existing)?;

    let detail = state
        .comment_service
        .update(existing, input, partial)
        .await?;
    Ok(detail.into())
}

/// Replace a comment.
async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathParams(ids): PathParams<(i64, i64)>,
    JsonBody(input): JsonBody<UpdateCommentInput>,
) -> AppResult<Json<CommentResponse>> {
    apply_update(&state, &user, ids, input, false).await.map(Json)
}

/// Patch a comment.
async fn partial_update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathParams(ids): PathParams<(i64, i64)>,
    JsonBody(input): JsonBody<UpdateCommentInput>,
) -> AppResult<Json<CommentResponse>> {
    apply_update(&state, &user, ids, input, true).await.map(Json)
}

/// Delete a comment.
async fn destroy(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathParams((post_id, id)): PathParams<(i64, i64)>,
) -> AppResult<StatusCode> {
    let existing = state.comment_service.get(post_id, id).await?;
    ensure_author(&user, &existing)?;

    state.comment_service.delete(existing).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/{post_id}/comments/", get(list).post(create))
        .route(
            "/posts/{post_id}/comments/{id}/",
            get(retrieve)
                .put(update)
                .patch(partial_update)
                .delete(destroy),
        )
        .route_layer(middleware::from_fn(authenticated_or_read_only))
}
