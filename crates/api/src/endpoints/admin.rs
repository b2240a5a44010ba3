//! Administrative endpoints for staff.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, patch, post},
};
use serde::Serialize;
use yatube_common::AppResult;
use yatube_core::{CreateGroupInput, CreateUserInput, UpdateGroupInput};
use yatube_db::entities::user;

use crate::{
    extractors::{AuthUser, JsonBody, PathParams},
    middleware::AppState,
    permissions::{authenticated, ensure_staff},
    response::{Created, GroupResponse, no_content},
};

/// User as shown to administrators.
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
    pub date_joined: sea_orm::prelude::DateTimeWithTimeZone,
}

impl From<user::Model> for AdminUserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_staff: user.is_staff,
            date_joined: user.date_joined,
        }
    }
}

async fn create_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    JsonBody(input): JsonBody<CreateUserInput>,
) -> AppResult<Created<AdminUserResponse>> {
    ensure_staff(&admin)?;
    let user = state.user_service.create(input).await?;
    Ok(Created(user.into()))
}

async fn delete_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    Path(username): Path<String>,
) -> AppResult<StatusCode> {
    ensure_staff(&admin)?;
    state.user_service.delete_by_username(&username).await?;
    Ok(no_content())
}

async fn create_group(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    JsonBody(input): JsonBody<CreateGroupInput>,
) -> AppResult<Created<GroupResponse>> {
    ensure_staff(&admin)?;
    let group = state.group_service.create(input).await?;
    Ok(Created(group.into()))
}

async fn update_group(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    PathParams(id): PathParams<i64>,
    JsonBody(input): JsonBody<UpdateGroupInput>,
) -> AppResult<Json<GroupResponse>> {
    ensure_staff(&admin)?;
    let group = state.group_service.update(id, input).await?;
    Ok(Json(group.into()))
}

async fn delete_group(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    PathParams(id): PathParams<i64>,
) -> AppResult<StatusCode> {
    ensure_staff(&admin)?;
    state.group_service.delete(id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users/", post(create_user))
        .route("/admin/users/{username}/", delete(delete_user))
        .route("/admin/groups/", post(create_group))
        .route("/admin/groups/{id}/", patch(update_group).delete(delete_group))
        .route_layer(middleware::from_fn(authenticated))
}
