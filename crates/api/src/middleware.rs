//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use sea_orm::DatabaseConnection;
use yatube_common::{AppError, AppResult, Config, StorageBackend};
use yatube_core::{
    CommentService, FollowService, GroupService, PostService, TokenService, UserService,
};
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub token_service: TokenService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub group_service: GroupService,
    pub follow_service: FollowService,
    /// Upper bound for the `limit` query parameter.
    pub max_page_size: u64,
    /// Public base URL, used for pagination links.
    pub public_url: String,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &Config,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let group_repo = GroupRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let follow_repo = FollowRepository::new(db);

        let user_service = UserService::new(user_repo.clone());
        let token_service = TokenService::new(user_service.clone(), &config.auth);
        let post_service = PostService::new(
            post_repo.clone(),
            group_repo.clone(),
            user_repo.clone(),
            storage,
        );
        let comment_service = CommentService::new(comment_repo, post_repo, user_repo.clone());
        let group_service = GroupService::new(group_repo);
        let follow_service = FollowService::new(follow_repo, user_repo);

        Self {
            user_service,
            token_service,
            post_service,
            comment_service,
            group_service,
            follow_service,
            max_page_size: config.pagination.max_limit,
            public_url: config.server.url.trim_end_matches('/').to_string(),
        }
    }
}

/// Authentication middleware.
///
/// Requests without an `Authorization` header pass through anonymously. A
/// header that is present but does not carry a valid access token is
/// rejected outright, whatever the method.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(req.headers()) {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    if let Some(token) = token {
        match state.token_service.authenticate(&token).await {
            Ok(user) => {
                tracing::trace!(user_id = user.id, "Authenticated request");
                req.extensions_mut().insert(user);
            }
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}

/// Extract the bearer token, if any.
///
/// Headers using another scheme are left to other authenticators, so the
/// request stays anonymous. A `Bearer` header that does not parse is an error.
fn bearer_token(headers: &HeaderMap) -> AppResult<Option<String>> {
    let uses_bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split_whitespace().next())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("bearer"));
    if !uses_bearer {
        return Ok(None);
    }

    headers
        .typed_try_get::<Authorization<Bearer>>()
        .map(|header| header.map(|auth| auth.token().to_string()))
        .map_err(|_| {
            AppError::InvalidToken("Authorization header must contain a Bearer token".to_string())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers).unwrap(), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap().as_deref(), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers).unwrap(), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert!(bearer_token(&headers).is_err());
    }
}
