//! Authentication service: login, refresh rotation, registration and
//! logout orchestration.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use urlshort_core::error::CoreError;
use urlshort_core::models::session::{SessionRecord, SwapOutcome};
use urlshort_core::models::token::TokenPair;
use urlshort_core::models::user::{CreateUser, Identity, Role, User};
use urlshort_core::repository::{SessionRepository, UserRepository};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password::CredentialVerifier;
use crate::token;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Input for the refresh token rotation flow.
#[derive(Debug)]
pub struct RefreshInput {
    pub user_id: Uuid,
    pub refresh_token: String,
}

/// Input for account registration.
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub nickname: String,
    pub role: Role,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the storage crate.
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    user_repo: U,
    session_repo: S,
    config: AuthConfig,
    verifier: CredentialVerifier,
    /// Verified against when the username is unknown so both failure paths
    /// cost one Argon2 evaluation.
    decoy_hash: String,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(user_repo: U, session_repo: S, config: AuthConfig) -> Result<Self, AuthError> {
        let verifier = CredentialVerifier::new(config.pepper.clone());
        let decoy_hash = verifier.hash(&token::generate_refresh_token())?;
        Ok(Self {
            user_repo,
            session_repo,
            config,
            verifier,
            decoy_hash,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    pub fn user_repo(&self) -> &U {
        &self.user_repo
    }

    pub fn session_repo(&self) -> &S {
        &self.session_repo
    }

    /// Authenticate with username + password and issue a token pair.
    ///
    /// Unknown username and wrong password both yield
    /// `AuthError::InvalidCredentials`.
    pub async fn login(&self, input: LoginInput) -> Result<TokenPair, AuthError> {
        // 1. Look up user.
        let user = match self.user_repo.get_by_username(&input.username).await {
            Ok(u) => Some(u),
            Err(CoreError::NotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        // 2. Verify password.
        let Some(user) = user else {
            let _ = self.verifier.verify(&input.password, &self.decoy_hash);
            warn!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };
        if !self.verifier.verify(&input.password, &user.password_hash) {
            warn!("login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        // 3. Issue tokens and replace any previous session.
        let pair = self.issue_pair(&user).await?;
        info!(user_id = %user.id, "user logged in");
        Ok(pair)
    }

    /// Rotate a refresh token: check it against the stored hash, then
    /// atomically replace the session record and issue a new pair.
    ///
    /// Each refresh token is single-use. The replace is keyed by the hash
    /// that was checked, so of several concurrent calls presenting the
    /// same value at most one can succeed.
    pub async fn refresh(&self, input: RefreshInput) -> Result<TokenPair, AuthError> {
        let user_id = input.user_id;

        // 1. Load the live session record.
        let Some(record) = self.session_repo.get(user_id).await? else {
            debug!(user_id = %user_id, "refresh without a session record");
            return Err(AuthError::RefreshInvalid);
        };

        // 2. A value that does not match was superseded or never issued.
        //    Either way the session ends and the user must log in again.
        if !token::verify_refresh_token(&input.refresh_token, &record.token_hash) {
            self.session_repo.delete(user_id).await?;
            warn!(user_id = %user_id, "refresh token mismatch, session revoked");
            return Err(AuthError::RefreshInvalid);
        }

        // 3. Check session expiry.
        if record.is_expired_at(Utc::now()) {
            self.session_repo.delete(user_id).await?;
            info!(user_id = %user_id, "refresh token expired, session removed");
            return Err(AuthError::RefreshExpired);
        }

        // 4. The user must still exist.
        let user = match self.user_repo.get_by_id(user_id).await {
            Ok(u) => u,
            Err(CoreError::NotFound { .. }) => {
                self.session_repo.delete(user_id).await?;
                return Err(AuthError::RefreshInvalid);
            }
            Err(e) => return Err(e.into()),
        };

        // 5. Swap in the rotated record, conditional on the checked hash.
        let access_token = token::issue_access_token(&user.identity(), &self.config)?;
        let refresh_token = token::generate_refresh_token();
        let replacement = SessionRecord::new(
            user.id,
            token::hash_refresh_token(&refresh_token),
            self.refresh_expiry(),
        );

        match self
            .session_repo
            .compare_and_swap(user.id, &record.token_hash, replacement)
            .await?
        {
            SwapOutcome::Swapped => {
                info!(user_id = %user.id, "refresh token rotated");
                Ok(TokenPair {
                    access_token,
                    refresh_token,
                })
            }
            SwapOutcome::Mismatch | SwapOutcome::Missing => {
                debug!(user_id = %user.id, "lost concurrent rotation");
                Err(AuthError::RefreshInvalid)
            }
        }
    }

    /// Create an account and log it in.
    pub async fn register(&self, input: RegisterInput) -> Result<TokenPair, AuthError> {
        let password_hash = self.verifier.hash(&input.password)?;
        let user = self
            .user_repo
            .create(CreateUser {
                username: input.username,
                nickname: input.nickname,
                password_hash,
                role: input.role,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "user registered");
        self.issue_pair(&user).await
    }

    /// Delete the user's session record (logout). Idempotent.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AuthError> {
        if self.session_repo.delete(user_id).await? {
            info!(user_id = %user_id, "user logged out");
        }
        Ok(())
    }

    /// Validate an access token and return its identity.
    pub fn validate(&self, access_token: &str) -> Result<Identity, AuthError> {
        token::validate_access_token(access_token, &self.config)
    }

    async fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let access_token = token::issue_access_token(&user.identity(), &self.config)?;
        let refresh_token = token::generate_refresh_token();
        self.session_repo
            .put(SessionRecord::new(
                user.id,
                token::hash_refresh_token(&refresh_token),
                self.refresh_expiry(),
            ))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn refresh_expiry(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.config.refresh_token_lifetime_secs as i64)
    }
}
