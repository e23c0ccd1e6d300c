//! JWT access token issuance/verification and opaque refresh token
//! generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use urlshort_core::models::user::{Identity, Role};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenClaims {
    /// Subject: user ID (UUID string).
    pub sub: String,
    /// Display name (the user's nickname).
    pub name: String,
    pub role: Role,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

impl AccessTokenClaims {
    /// Fresh claims for `identity`, valid for the configured lifetime.
    pub fn for_identity(identity: &Identity, config: &AuthConfig) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: identity.id.to_string(),
            name: identity.display_name.clone(),
            role: identity.role,
            iss: config.jwt_issuer.clone(),
            aud: config.jwt_audience.clone(),
            iat: now,
            exp: now + config.access_token_lifetime_secs as i64,
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn identity(&self) -> Result<Identity, AuthError> {
        let id = Uuid::parse_str(&self.sub)
            .map_err(|e| AuthError::TokenMalformed(format!("subject is not a UUID: {e}")))?;
        Ok(Identity {
            id,
            display_name: self.name.clone(),
            role: self.role,
        })
    }
}

/// Issue a signed HS512 JWT access token for `identity`.
pub fn issue_access_token(identity: &Identity, config: &AuthConfig) -> Result<String, AuthError> {
    sign_claims(&AccessTokenClaims::for_identity(identity, config), config)
}

/// Sign arbitrary claims with the configured secret.
pub fn sign_claims(claims: &AccessTokenClaims, config: &AuthConfig) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS512), claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify an HS512 JWT access token.
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS512);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_audience(&[&config.jwt_audience]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);
    validation.leeway = config.leeway_secs;

    jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::TokenInvalidSignature,
            _ => AuthError::TokenMalformed(e.to_string()),
        })
}

/// Validate a JWT access token (signature, expiry, issuer, audience) and
/// return the identity it carries.
///
/// Stateless; no database lookup is performed. Resource-serving
/// endpoints call this on every request.
pub fn validate_access_token(token: &str, config: &AuthConfig) -> Result<Identity, AuthError> {
    decode_access_token(token, config)?.identity()
}

/// Read the claims of an access token WITHOUT checking its signature or
/// expiry.
///
/// Only for holders of a token who do not have the signing key (clients
/// deriving the identity they just received). Never use it to authorize.
pub fn decode_claims_unverified(token: &str) -> Result<AccessTokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS512);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<AccessTokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::TokenMalformed(e.to_string()))
}

/// Generate a cryptographically random opaque refresh token
/// (32 bytes → base64url-encoded, no padding).
pub fn generate_refresh_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hash of a raw refresh token, hex-encoded.
///
/// This is the value stored as `SessionRecord::token_hash`.
pub fn hash_refresh_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time check of a presented refresh token against a stored hash.
pub fn verify_refresh_token(raw: &str, stored_hash: &str) -> bool {
    let presented = hash_refresh_token(raw);
    presented.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}
