//! Post endpoints.

use axum::{
    Json, Router,
    extract::{OriginalUri, State},
    http::StatusCode,
    middleware,
    routing::get,
};
use yatube_common::{AppResult, LimitOffset, Page};
use yatube_core::{CreatePostInput, UpdatePostInput};
use yatube_db::entities::user;

use crate::{
    extractors::{AuthUser, JsonBody, PathParams, QueryParams},
    middleware::AppState,
    permissions::{authenticated_or_read_only, ensure_author},
    response::{Created, Listing, PostResponse, no_content},
};

/// List posts, newest first.
///
/// Without a `limit` every post is returned as a plain array.
async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    QueryParams(params): QueryParams<LimitOffset>,
) -> AppResult<Json<Listing<PostResponse>>> {
    let window = params.resolve(state.max_page_size);
    let (posts, count) = state.post_service.list(window).await?;

    let results: Vec<PostResponse> = posts
        .into_iter()
        .map(|detail| PostResponse::new(detail, &state.post_service))
        .collect();

    Ok(Json(match window {
        Some(request) => {
            let path = format!("{}{}", state.public_url, uri.path());
            Listing::Page(Page::new(results, count, request, &path))
        }
        None => Listing::All(results),
    }))
}

/// Get a post.
async fn retrieve(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
) -> AppResult<Json<PostResponse>> {
    let detail = state.post_service.get(id).await?;
    Ok(Json(PostResponse::new(detail, &state.post_service)))
}

/// Create a post as the current user.
async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(input): JsonBody<CreatePostInput>,
) -> AppResult<Created<PostResponse>> {
    let detail = state.post_service.create(&user, input).await?;
    Ok(Created(PostResponse::new(detail, &state.post_service)))
}

async fn apply_update(
    state: &AppState,
    user: &user::Model,
    id: i64,
    input: UpdatePostInput,
    partial: bool,
) -> AppResult<PostResponse> {
    let existing = state.post_service.get(id).await?;
    ensure_author(user, &existing)?;

    let detail = state.post_service.update(existing, input, partial).await?;
    Ok(PostResponse::new(detail, &state.post_service))
}

/// Replace a post.
async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathParams(id): PathParams<i64>,
    JsonBody(input): JsonBody<UpdatePostInput>,
) -> AppResult<Json<PostResponse>> {
    apply_update(&state, &user, id, input, false).await.map(Json)
}

/// Patch a post.
async fn partial_update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathParams(id): PathParams<i64>,
    JsonBody(input): JsonBody<UpdatePostInput>,
) -> AppResult<Json<PostResponse>> {
    apply_update(&state, &user, id, input, true).await.map(Json)
}

/// Delete a post.
async fn destroy(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathParams(id): PathParams<i64>,
) -> AppResult<StatusCode> {
    let existing = state.post_service.get(id).await?;
    ensure_author(&user, &existing)?;

    state.post_service.delete(existing).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/", get(list).post(create))
        .route(
            "/posts/{post_id}/",
            get(retrieve)
                .put(update)
                .patch(partial_update)
                .delete(destroy),
        )
        .route_layer(middleware::from_fn(authenticated_or_read_only))
}
