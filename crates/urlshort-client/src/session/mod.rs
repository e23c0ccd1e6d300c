//! Where the caller's access/refresh pair and identity live.
//!
//! Every realization swaps the whole [`ClientSession`] at once, so a reader
//! sees either the old session or the new one, never a mix.

mod cookie;
mod file;
mod memory;

pub use cookie::{
    ACCESS_TOKEN_COOKIE, CookieSessionStore, REFRESH_TOKEN_COOKIE, SESSION_COOKIE_MAX_AGE_SECS,
    USER_ID_COOKIE,
};
pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use urlshort_auth::token::decode_claims_unverified;
use urlshort_core::models::token::TokenPair;
use urlshort_core::models::user::Identity;

use crate::error::{ClientError, ClientResult};

/// The caller's half of an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    pub identity: Identity,
    pub tokens: TokenPair,
}

impl ClientSession {
    /// Build a session from a freshly issued pair, deriving the identity
    /// from the access token's claims.
    ///
    /// The client holds no signing key, so the claims are read without
    /// verification; they came straight from the issuer's response.
    pub fn from_tokens(tokens: TokenPair) -> ClientResult<Self> {
        let identity = decode_claims_unverified(&tokens.access_token)
            .and_then(|claims| claims.identity())
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(Self { identity, tokens })
    }
}

/// Storage for the current [`ClientSession`].
///
/// Getters return `None` when no session is held; they never fail.
pub trait ClientSessionStore: Send + Sync {
    fn load(&self) -> Option<ClientSession>;

    /// Replace the session. The in-memory view is updated even when
    /// persisting it fails; the error only reports the persistence failure.
    fn save(&self, identity: Identity, tokens: TokenPair) -> ClientResult<()>;

    /// Forget the session. Idempotent.
    fn clear(&self);

    fn identity(&self) -> Option<Identity> {
        self.load().map(|s| s.identity)
    }

    fn access_token(&self) -> Option<String> {
        self.load().map(|s| s.tokens.access_token)
    }

    fn refresh_token(&self) -> Option<String> {
        self.load().map(|s| s.tokens.refresh_token)
    }
}
