//! HTTP calls to the auth endpoints.

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use tracing::{debug, info};
use urlshort_core::models::token::{LoginRequest, RefreshRequest, RegisterRequest, TokenPair};
use urlshort_core::models::user::{Identity, Role};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::refresh::RefreshProcedure;
use crate::session::{ClientSession, ClientSessionStore};

/// Thin wrapper over `/login`, `/register`, `/refresh-token` and `/logout`.
#[derive(Debug, Clone)]
pub struct AuthApi {
    http: reqwest::Client,
    base_url: String,
}

impl AuthApi {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http, base_url }
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::new(config.http_client()?, config.base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<TokenPair> {
        let body = LoginRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        self.post_for_tokens("/login", &body).await
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        nickname: &str,
        account_type: Role,
    ) -> ClientResult<TokenPair> {
        let body = RegisterRequest {
            username: username.to_owned(),
            password: password.to_owned(),
            nickname: nickname.to_owned(),
            account_type,
        };
        self.post_for_tokens("/register", &body).await
    }

    /// Exchange a refresh token for a rotated pair. The presented token is
    /// spent whether or not this succeeds.
    pub async fn refresh_tokens(
        &self,
        user_id: &str,
        refresh_token: &str,
    ) -> ClientResult<TokenPair> {
        let body = RefreshRequest {
            user_id: user_id.to_owned(),
            refresh_token: refresh_token.to_owned(),
        };
        self.post_for_tokens("/refresh-token", &body).await
    }

    pub async fn logout(&self, access_token: &str) -> ClientResult<()> {
        let response = self
            .http
            .post(self.url("/logout"))
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await?;
        ensure_success(response).await.map(drop)
    }

    /// Log in and store the resulting session.
    pub async fn login_into(
        &self,
        store: &dyn ClientSessionStore,
        username: &str,
        password: &str,
    ) -> ClientResult<Identity> {
        let session = ClientSession::from_tokens(self.login(username, password).await?)?;
        let identity = session.identity.clone();
        store.save(session.identity, session.tokens)?;
        info!(user_id = %identity.id, "logged in");
        Ok(identity)
    }

    /// Revoke the server-side session and clear the local one. The local
    /// session is cleared even if the server call fails.
    pub async fn logout_from(&self, store: &dyn ClientSessionStore) -> ClientResult<()> {
        let Some(access_token) = store.access_token() else {
            return Ok(());
        };
        let result = self.logout(&access_token).await;
        store.clear();
        result
    }

    async fn post_for_tokens<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<TokenPair> {
        debug!(path, "requesting token pair");
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let tokens: TokenPair = ensure_success(response).await?.json().await?;
        if tokens.access_token.is_empty() || tokens.refresh_token.is_empty() {
            return Err(ClientError::Decode("empty token in response".into()));
        }
        Ok(tokens)
    }
}

impl RefreshProcedure for AuthApi {
    async fn refresh(&self, user_id: &str, refresh_token: &str) -> ClientResult<TokenPair> {
        self.refresh_tokens(user_id, refresh_token).await
    }
}

async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}
