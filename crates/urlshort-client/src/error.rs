//! Client-side error types.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("request was cancelled")]
    Cancelled,

    #[error("no client session")]
    NoSession,

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("token could not be decoded: {0}")]
    Decode(String),

    #[error("session could not be persisted: {0}")]
    Persist(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
