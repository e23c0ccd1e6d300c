//! HTTP error mapping.

use axum::Json;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use urlshort_auth::AuthError;
use urlshort_core::error::CoreError;

/// Set on `401` responses caused by an expired access token.
pub const TOKEN_EXPIRED_HEADER: &str = "token-expired";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// Protected route called without a bearer token.
    #[error("missing bearer credentials")]
    MissingCredentials,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(AuthError::InvalidCredentials) => {
                (StatusCode::BAD_REQUEST, "Invalid username or password.").into_response()
            }
            ApiError::Auth(AuthError::RefreshInvalid | AuthError::RefreshExpired) => {
                (StatusCode::UNAUTHORIZED, "Invalid refresh token.").into_response()
            }
            ApiError::Auth(AuthError::TokenExpired) => {
                challenge("TOKEN_EXPIRED", "Token has expired", true)
            }
            ApiError::Auth(AuthError::TokenInvalidSignature) => {
                challenge("INVALID_SIGNATURE", "Invalid token signature", false)
            }
            ApiError::Auth(AuthError::TokenMalformed(_)) => {
                challenge("INVALID_TOKEN", "Invalid token", false)
            }
            ApiError::MissingCredentials => challenge("AUTH_FAILED", "Authentication failed", false),
            ApiError::Auth(AuthError::Repository(e)) | ApiError::Core(e) => core_response(e),
            other => internal(&other),
        }
    }
}

fn core_response(err: CoreError) -> Response {
    match err {
        CoreError::Validation { message } => (StatusCode::BAD_REQUEST, message).into_response(),
        CoreError::AlreadyExists { .. } => {
            (StatusCode::BAD_REQUEST, "Username already exists.").into_response()
        }
        other => internal(&other),
    }
}

fn challenge(code: &str, message: &str, expired: bool) -> Response {
    let body = Json(json!({
        "error": code,
        "message": message,
        "timestamp": Utc::now().to_rfc3339(),
    }));
    let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
    if expired {
        response
            .headers_mut()
            .insert(TOKEN_EXPIRED_HEADER, HeaderValue::from_static("true"));
    }
    response
}

fn internal(err: &dyn std::error::Error) -> Response {
    error!(error = %err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "An internal error occurred.",
    )
        .into_response()
}
