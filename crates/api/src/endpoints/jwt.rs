//! JWT endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use yatube_common::AppResult;
use yatube_core::TokenPair;

use crate::{extractors::JsonBody, middleware::AppState};

/// Credentials for obtaining a token pair.
#[derive(Debug, Deserialize)]
pub struct ObtainRequest {
    pub username: String,
    pub password: String,
}

/// Refresh token exchange.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Freshly minted access token.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Token to check.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

async fn obtain(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ObtainRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state
        .token_service
        .obtain_pair(&req.username, &req.password)
        .await?;
    Ok(Json(pair))
}

async fn refresh(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let access = state.token_service.refresh(&req.refresh)?;
    Ok(Json(RefreshResponse { access }))
}

async fn verify(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<VerifyRequest>,
) -> AppResult<Json<Value>> {
    state.token_service.verify(&req.token)?;
    Ok(Json(json!({})))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jwt/create/", post(obtain))
        .route("/jwt/refresh/", post(refresh))
        .route("/jwt/verify/", post(verify))
}
