//! Follow endpoints.

use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::get,
};
use serde::Deserialize;
use yatube_common::AppResult;
use yatube_core::{CreateFollowInput, FollowDetail};

use crate::{
    extractors::{AuthUser, JsonBody, QueryParams},
    middleware::AppState,
    permissions::authenticated,
    response::Created,
};

/// Query parameters for listing follows.
#[derive(Debug, Default, Deserialize)]
pub struct FollowQuery {
    /// Case-insensitive fragment of the followed username.
    pub search: Option<String>,
}

/// List the users the current user follows.
async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<FollowQuery>,
) -> AppResult<Json<Vec<FollowDetail>>> {
    let follows = state
        .follow_service
        .list(&user, query.search.as_deref())
        .await?;
    Ok(Json(follows))
}

/// Follow a user.
async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(input): JsonBody<CreateFollowInput>,
) -> AppResult<Created<FollowDetail>> {
    let detail = state.follow_service.create(&user, input).await?;
    Ok(Created(detail))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/", get(list).post(create))
        .route_layer(middleware::from_fn(authenticated))
}
