//! Client configuration.

use std::time::Duration;

use crate::error::ClientResult;

/// Configuration for the authenticated HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the auth endpoints (`/login`, `/refresh-token`, ...).
    pub base_url: String,
    /// Upper bound for every request, every refresh and every retry
    /// (default: 30 seconds).
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Build the underlying `reqwest` client with the configured timeout.
    pub fn http_client(&self) -> ClientResult<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
            request_timeout: Duration::from_secs(30),
        }
    }
}
