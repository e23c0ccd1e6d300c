//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use urlshort_auth::AuthConfig;

use crate::logging::LogFormat;

#[derive(Debug, Clone, Parser)]
#[command(name = "urlshort-server", version, about = "URL shortener auth server")]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "URLSHORT_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// HMAC secret for access tokens, at least 32 bytes.
    #[arg(long, env = "URLSHORT_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    #[arg(long, env = "URLSHORT_ISSUER", default_value = "urlshort")]
    pub issuer: String,

    #[arg(long, env = "URLSHORT_AUDIENCE", default_value = "urlshort-clients")]
    pub audience: String,

    #[arg(long, env = "URLSHORT_ACCESS_TTL_SECS", default_value_t = 900)]
    pub access_ttl_secs: u64,

    #[arg(long, env = "URLSHORT_REFRESH_TTL_SECS", default_value_t = 604_800)]
    pub refresh_ttl_secs: u64,

    /// Optional secret mixed into every password hash.
    #[arg(long, env = "URLSHORT_PEPPER", hide_env_values = true)]
    pub pepper: Option<String>,

    /// Seed an admin account with this username (needs --admin-password).
    #[arg(long, env = "URLSHORT_ADMIN_USERNAME", requires = "admin_password")]
    pub admin_username: Option<String>,

    #[arg(long, env = "URLSHORT_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// How often lapsed session records are swept.
    #[arg(long, env = "URLSHORT_SWEEP_INTERVAL_SECS", default_value_t = 300)]
    pub sweep_interval_secs: u64,

    #[arg(long, env = "URLSHORT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt_secret.clone(),
            jwt_issuer: self.issuer.clone(),
            jwt_audience: self.audience.clone(),
            access_token_lifetime_secs: self.access_ttl_secs,
            refresh_token_lifetime_secs: self.refresh_ttl_secs,
            pepper: self.pepper.clone(),
            ..Default::default()
        }
    }

    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        Some((self.admin_username.as_deref()?, self.admin_password.as_deref()?))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}
