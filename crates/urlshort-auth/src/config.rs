//! Authentication configuration.

use crate::error::AuthError;

/// Shortest HMAC secret accepted for signing access tokens (bytes).
pub const MIN_SECRET_LEN: usize = 32;

/// Configuration for the authentication service.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared HMAC secret used to sign and verify access tokens (HS512).
    pub jwt_secret: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// JWT audience (`aud` claim).
    pub jwt_audience: String,
    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 604_800 = 7 days).
    pub refresh_token_lifetime_secs: u64,
    /// Clock skew tolerated when checking `exp` (default: 60 seconds).
    pub leeway_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
}

impl AuthConfig {
    /// Reject configurations that would make tokens forgeable or let the
    /// access credential outlive the refresh credential.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Config(format!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if self.access_token_lifetime_secs == 0 {
            return Err(AuthError::Config(
                "access token lifetime must be positive".into(),
            ));
        }
        if self.access_token_lifetime_secs >= self.refresh_token_lifetime_secs {
            return Err(AuthError::Config(
                "access token lifetime must be shorter than refresh token lifetime".into(),
            ));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "urlshort".into(),
            jwt_audience: "urlshort-clients".into(),
            access_token_lifetime_secs: 900,
            refresh_token_lifetime_secs: 604_800,
            leeway_secs: 60,
            pepper: None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("access_token_lifetime_secs", &self.access_token_lifetime_secs)
            .field("refresh_token_lifetime_secs", &self.refresh_token_lifetime_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
