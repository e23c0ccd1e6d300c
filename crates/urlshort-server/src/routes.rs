//! Request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::debug;
use urlshort_auth::{AuthError, LoginInput, RefreshInput, RegisterInput};
use urlshort_core::models::token::{
    IdentityResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPair,
};
use uuid::Uuid;

use crate::app::SharedState;
use crate::error::ApiError;
use crate::extract::AuthUser;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    req.validate()?;
    let pair = state
        .auth
        .login(LoginInput {
            username: req.username,
            password: req.password,
        })
        .await?;
    Ok(Json(pair))
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    req.validate()?;
    let pair = state
        .auth
        .register(RegisterInput {
            username: req.username,
            password: req.password,
            nickname: req.nickname,
            role: req.account_type,
        })
        .await?;
    Ok(Json(pair))
}

pub async fn refresh_token(
    State(state): State<SharedState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    req.validate()?;
    // An id that is not a UUID cannot own a session.
    let user_id = Uuid::parse_str(&req.user_id).map_err(|e| {
        debug!(error = %e, "refresh with unparseable user id");
        AuthError::RefreshInvalid
    })?;
    let pair = state
        .auth
        .refresh(RefreshInput {
            user_id,
            refresh_token: req.refresh_token,
        })
        .await?;
    Ok(Json(pair))
}

pub async fn logout(
    State(state): State<SharedState>,
    AuthUser(identity): AuthUser,
) -> Result<StatusCode, ApiError> {
    state.auth.logout(identity.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(AuthUser(identity): AuthUser) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        user_id: identity.id.to_string(),
        nickname: identity.display_name,
        role: identity.role,
    })
}
