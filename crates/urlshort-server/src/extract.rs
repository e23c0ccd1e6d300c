//! Bearer-token extractor for protected routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;
use urlshort_core::models::user::Identity;

use crate::app::SharedState;
use crate::error::ApiError;

/// The caller's identity, taken from a validated `Authorization: Bearer`
/// access token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingCredentials)?;

        let identity = state
            .auth
            .validate(token)
            .inspect_err(|e| debug!(error = %e, "access token rejected"))?;
        Ok(AuthUser(identity))
    }
}
