//! The authenticated HTTP client.
//!
//! Every request carries the current access token as a bearer credential.
//! A `401` triggers at most one refresh-then-retry per request; the refresh
//! itself is shared with every other request that was rejected at the same
//! time (see [`RefreshCoordinator`]).

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{IntoUrl, Method, Request, RequestBuilder, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::AuthApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::refresh::{RefreshCoordinator, RefreshProcedure};
use crate::session::ClientSessionStore;

pub struct AuthHttpClient<R = AuthApi> {
    http: reqwest::Client,
    store: Arc<dyn ClientSessionStore>,
    coordinator: RefreshCoordinator<R>,
    timeout: Duration,
}

impl AuthHttpClient<AuthApi> {
    /// Wire up a client that refreshes against the same server it talks to.
    pub fn from_config(
        config: &ClientConfig,
        store: Arc<dyn ClientSessionStore>,
    ) -> ClientResult<Self> {
        let http = config.http_client()?;
        let api = Arc::new(AuthApi::new(http.clone(), config.base_url.clone()));
        Ok(Self::new(http, store, api, config.request_timeout))
    }
}

impl<R: RefreshProcedure + 'static> AuthHttpClient<R> {
    pub fn new(
        http: reqwest::Client,
        store: Arc<dyn ClientSessionStore>,
        refresher: Arc<R>,
        timeout: Duration,
    ) -> Self {
        let coordinator = RefreshCoordinator::new(Arc::clone(&store), refresher, timeout);
        Self {
            http,
            store,
            coordinator,
            timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn ClientSessionStore> {
        &self.store
    }

    pub fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
        self.http.request(method, url)
    }

    pub fn get(&self, url: impl IntoUrl) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: impl IntoUrl) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        self.execute(builder.build()?).await
    }

    pub async fn execute(&self, request: Request) -> ClientResult<Response> {
        self.execute_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Send `request`, recovering once from a rejected access token.
    ///
    /// Cancelling `cancel` abandons only this request: a refresh it is
    /// waiting on keeps running for everyone else. When the refresh fails
    /// the session is cleared and the original `401` is returned.
    pub async fn execute_with_cancel(
        &self,
        mut request: Request,
        cancel: &CancellationToken,
    ) -> ClientResult<Response> {
        // Streaming bodies cannot be cloned; such requests get no retry.
        let replay = request.try_clone();
        let sent = self.authorize(&mut request)?;
        let url = request.url().clone();

        let response = self.dispatch(request, cancel).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(mut replay) = replay else {
            debug!(%url, "unauthorized, request body not replayable");
            return Ok(response);
        };
        if self.store.refresh_token().is_none() {
            debug!(%url, "unauthorized, no refresh token held");
            return Ok(response);
        }

        debug!(%url, "access token rejected, refreshing");
        match self
            .guarded(cancel, self.coordinator.refresh(sent.as_deref()))
            .await
        {
            Ok(access_token) => {
                set_bearer(&mut replay, &access_token)?;
                self.dispatch(replay, cancel).await
            }
            Err(e @ (ClientError::Cancelled | ClientError::Timeout)) => Err(e),
            Err(e) => {
                warn!(%url, error = %e, "refresh failed, returning original response");
                Ok(response)
            }
        }
    }

    /// Attach the stored access token, returning the value that was sent.
    fn authorize(&self, request: &mut Request) -> ClientResult<Option<String>> {
        let token = self.store.access_token();
        if let Some(token) = &token {
            set_bearer(request, token)?;
        }
        Ok(token)
    }

    async fn dispatch(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> ClientResult<Response> {
        self.guarded(cancel, async { Ok(self.http.execute(request).await?) })
            .await
    }

    async fn guarded<T>(
        &self,
        cancel: &CancellationToken,
        fut: impl Future<Output = ClientResult<T>>,
    ) -> ClientResult<T> {
        tokio::select! {
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, fut) => {
                outcome.unwrap_or(Err(ClientError::Timeout))
            }
        }
    }
}

fn set_bearer(request: &mut Request, token: &str) -> ClientResult<()> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| ClientError::Decode(format!("access token is not a valid header: {e}")))?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}
