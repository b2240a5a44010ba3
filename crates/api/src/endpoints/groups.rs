//! Group endpoints (read-only).

use axum::{Json, Router, extract::State, routing::get};
use yatube_common::AppResult;

use crate::{extractors::PathParams, middleware::AppState, response::GroupResponse};

async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<GroupResponse>>> {
    let groups = state.group_service.list().await?;
    Ok(Json(groups.into_iter().map(GroupResponse::from).collect()))
}

async fn retrieve(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
) -> AppResult<Json<GroupResponse>> {
    Ok(Json(state.group_service.get(id).await?.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/groups/", get(list))
        .route("/groups/{id}/", get(retrieve))
}
