//! Permission checks.
//!
//! Request-level checks run as route layers, after the auth middleware has
//! attached the user. Object-level checks run in handlers once the target
//! has been loaded.

use axum::{
    body::Body,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use yatube_common::{AppError, AppResult};
use yatube_core::{CommentDetail, PostDetail};
use yatube_db::entities::user;

const DENIED: &str = "You do not have permission to perform this action.";

/// Something with an author.
pub trait Authored {
    /// ID of the user who wrote it.
    fn author_id(&self) -> i64;
}

impl Authored for PostDetail {
    fn author_id(&self) -> i64 {
        self.post.author_id
    }
}

impl Authored for CommentDetail {
    fn author_id(&self) -> i64 {
        self.comment.author_id
    }
}

/// GET, HEAD and OPTIONS.
#[must_use]
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Safe methods for everyone; anything else needs a user.
pub async fn authenticated_or_read_only(req: Request<Body>, next: Next) -> Response {
    if !is_safe_method(req.method()) && req.extensions().get::<user::Model>().is_none() {
        return AppError::Unauthorized.into_response();
    }
    next.run(req).await
}

/// Every method needs a user.
pub async fn authenticated(req: Request<Body>, next: Next) -> Response {
    if req.extensions().get::<user::Model>().is_none() {
        return AppError::Unauthorized.into_response();
    }
    next.run(req).await
}

/// Only the author may change `resource`.
pub fn ensure_author<T: Authored>(user: &user::Model, resource: &T) -> AppResult<()> {
    if resource.author_id() == user.id {
        Ok(())
    } else {
        tracing::debug!(
            user_id = user.id,
            author_id = resource.author_id(),
            "Rejected change by non-author"
        );
        Err(AppError::Forbidden(DENIED.to_string()))
    }
}

/// Only staff may use the administrative endpoints.
pub fn ensure_staff(user: &user::Model) -> AppResult<()> {
    if user.is_staff {
        Ok(())
    } else {
        Err(AppError::Forbidden(DENIED.to_string()))
    }
}
