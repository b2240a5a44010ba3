//! HTTP API layer for yatube.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: posts, comments, groups, follows, JWT and staff administration
//! - **Extractors**: authenticated user, JSON bodies
//! - **Middleware**: bearer token authentication
//! - **Permissions**: read-only access for anonymous users, author-only changes
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod permissions;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::AppState;

/// Path prefix the API is served under.
pub const API_PREFIX: &str = "/api/v1";

/// Build the API application: routes under [`API_PREFIX`] behind the
/// authentication middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, router())
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .with_state(state)
}
