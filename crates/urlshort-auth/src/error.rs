//! Authentication error types.

use thiserror::Error;
use urlshort_core::error::CoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user and wrong password share this variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("token signature is invalid")]
    TokenInvalidSignature,

    #[error("token is malformed: {0}")]
    TokenMalformed(String),

    /// Wrong value, or a value that has already been rotated away.
    #[error("refresh token is invalid")]
    RefreshInvalid,

    #[error("refresh token has expired")]
    RefreshExpired,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error(transparent)]
    Repository(#[from] CoreError),
}

impl AuthError {
    /// True for failures of a presented access or refresh credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::TokenExpired
                | AuthError::TokenInvalidSignature
                | AuthError::TokenMalformed(_)
                | AuthError::RefreshInvalid
                | AuthError::RefreshExpired
        )
    }
}
