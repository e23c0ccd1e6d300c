//! Single-flight rotation of the client session.
//!
//! Many requests can discover an expired access token at the same moment.
//! [`RefreshCoordinator`] lets exactly one of them start a network refresh;
//! the rest await the same result. The refresh runs as its own task, so a
//! waiter that is cancelled or times out never cancels it for the others.

use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use urlshort_core::models::token::TokenPair;

use crate::error::{ClientError, ClientResult};
use crate::session::{ClientSession, ClientSessionStore};

/// Exchanges a refresh token for a rotated pair. [`crate::AuthApi`] does it
/// over HTTP; tests substitute their own.
pub trait RefreshProcedure: Send + Sync {
    fn refresh(
        &self,
        user_id: &str,
        refresh_token: &str,
    ) -> impl Future<Output = ClientResult<TokenPair>> + Send;
}

type Flight = Shared<BoxFuture<'static, Result<String, Arc<ClientError>>>>;

pub struct RefreshCoordinator<R> {
    store: Arc<dyn ClientSessionStore>,
    refresher: Arc<R>,
    timeout: Duration,
    in_flight: Arc<Mutex<Option<Flight>>>,
}

impl<R: RefreshProcedure + 'static> RefreshCoordinator<R> {
    pub fn new(store: Arc<dyn ClientSessionStore>, refresher: Arc<R>, timeout: Duration) -> Self {
        Self {
            store,
            refresher,
            timeout,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether a network refresh is currently outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Obtain an access token newer than `stale_access`, the token the
    /// caller's rejected request carried.
    ///
    /// Joins the outstanding refresh if there is one. Otherwise, if the
    /// session has already moved past `stale_access`, returns the current
    /// token without touching the network. Only when the session still
    /// holds `stale_access` is a new refresh started.
    pub async fn refresh(&self, stale_access: Option<&str>) -> ClientResult<String> {
        let flight = {
            let mut slot = self.in_flight.lock();
            if let Some(flight) = slot.clone() {
                debug!("joining in-flight token refresh");
                flight
            } else {
                let Some(session) = self.store.load() else {
                    return Err(ClientError::NoSession);
                };
                if stale_access != Some(session.tokens.access_token.as_str()) {
                    debug!("session already rotated");
                    return Ok(session.tokens.access_token);
                }
                let flight = self.launch(session);
                *slot = Some(flight.clone());
                flight
            }
        };

        flight
            .await
            .map_err(|e| ClientError::RefreshFailed(e.to_string()))
    }

    fn launch(&self, session: ClientSession) -> Flight {
        let store = Arc::clone(&self.store);
        let refresher = Arc::clone(&self.refresher);
        let slot = Arc::clone(&self.in_flight);
        let timeout = self.timeout;

        let task = tokio::spawn(async move {
            let ClientSession { identity, tokens } = session;
            let user_id = identity.id.to_string();

            let rotated = tokio::time::timeout(
                timeout,
                refresher.refresh(&user_id, &tokens.refresh_token),
            )
            .await
            .unwrap_or(Err(ClientError::Timeout));

            let outcome = match rotated {
                Ok(pair) => {
                    let access_token = pair.access_token.clone();
                    let session = match ClientSession::from_tokens(pair.clone()) {
                        Ok(session) => session,
                        Err(e) => {
                            warn!(
                                user_id = %user_id,
                                error = %e,
                                "rotated access token unreadable, keeping previous identity"
                            );
                            ClientSession {
                                identity,
                                tokens: pair,
                            }
                        }
                    };
                    if let Err(e) = store.save(session.identity, session.tokens) {
                        warn!(user_id = %user_id, error = %e, "rotated session not persisted");
                    }
                    info!(user_id = %user_id, "access token refreshed");
                    Ok(access_token)
                }
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "token refresh failed, clearing session");
                    store.clear();
                    Err(Arc::new(e))
                }
            };

            // The store reflects the outcome before the slot opens again.
            slot.lock().take();
            outcome
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(Arc::new(ClientError::RefreshFailed(format!(
                    "refresh task failed: {e}"
                ))))
            })
        }
        .boxed()
        .shared()
    }
}
