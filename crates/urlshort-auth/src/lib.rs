//! URL shortener auth: password verification, JWT access credentials and
//! single-use refresh credential rotation.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use password::CredentialVerifier;
pub use service::{AuthService, LoginInput, RefreshInput, RegisterInput};
pub use token::AccessTokenClaims;
