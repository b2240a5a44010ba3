//! API endpoints.

mod admin;
mod comments;
mod follow;
mod groups;
mod jwt;
mod posts;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(jwt::router())
        .merge(posts::router())
        .merge(comments::router())
        .merge(groups::router())
        .merge(follow::router())
        .merge(admin::router())
}
