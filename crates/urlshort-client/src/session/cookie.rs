//! Opaque session store backed by protected cookies.
//!
//! A web front end holds the pair on behalf of a browser in three
//! host-only, `HttpOnly`, `Secure`, `SameSite=Strict` cookies scoped to
//! `/`. Script running in the page never sees the raw values; it only sees
//! the effect of the front end attaching them to outbound calls.
//!
//! One store lives for one inbound request: it is built from the request's
//! `Cookie` headers, and whatever it saves or clears is emitted as
//! `Set-Cookie` values for the response.

use cookie::{Cookie, CookieBuilder, SameSite};
use parking_lot::Mutex;
use reqwest::header::{COOKIE, HeaderMap};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use urlshort_core::models::token::TokenPair;
use urlshort_core::models::user::Identity;

use super::{ClientSession, ClientSessionStore};
use crate::error::ClientResult;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const USER_ID_COOKIE: &str = "user_id";

/// Cookie lifetime, matching the refresh token lifetime.
pub const SESSION_COOKIE_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

const COOKIE_NAMES: [&str; 3] = [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, USER_ID_COOKIE];

#[derive(Debug, Default)]
struct CookieState {
    current: Option<ClientSession>,
    /// `Set-Cookie` values produced since the store was built.
    pending: Vec<String>,
}

#[derive(Debug, Default)]
pub struct CookieSessionStore {
    state: Mutex<CookieState>,
}

impl CookieSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the store from every `Cookie` header of an inbound request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let joined = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");
        Self::from_cookie_header(&joined)
    }

    /// Build the store from a `Cookie` header value (`a=1; b=2`).
    ///
    /// A session is recognised only when all three cookies are present and
    /// the access token's subject matches the `user_id` cookie.
    pub fn from_cookie_header(header: &str) -> Self {
        let (mut access_token, mut refresh_token, mut user_id) = (None, None, None);
        for cookie in Cookie::split_parse(header).filter_map(Result::ok) {
            let value = cookie.value_trimmed();
            if value.is_empty() {
                continue;
            }
            let slot = match cookie.name() {
                ACCESS_TOKEN_COOKIE => &mut access_token,
                REFRESH_TOKEN_COOKIE => &mut refresh_token,
                USER_ID_COOKIE => &mut user_id,
                _ => continue,
            };
            *slot = Some(value.to_owned());
        }

        let current = match (access_token, refresh_token, user_id) {
            (Some(access_token), Some(refresh_token), Some(user_id)) => {
                ClientSession::from_tokens(TokenPair {
                    access_token,
                    refresh_token,
                })
                .ok()
                .filter(|s| s.identity.id.to_string() == user_id)
            }
            _ => None,
        };
        if current.is_none() {
            debug!("no usable session cookies");
        }

        Self {
            state: Mutex::new(CookieState {
                current,
                pending: Vec::new(),
            }),
        }
    }

    /// Drain the `Set-Cookie` values to attach to the outgoing response.
    pub fn take_set_cookies(&self) -> Vec<String> {
        std::mem::take(&mut self.state.lock().pending)
    }
}

impl ClientSessionStore for CookieSessionStore {
    fn load(&self) -> Option<ClientSession> {
        self.state.lock().current.clone()
    }

    fn save(&self, identity: Identity, tokens: TokenPair) -> ClientResult<()> {
        let mut state = self.state.lock();
        // Only the latest pair goes back to the browser.
        state.pending.clear();
        state.pending.extend([
            set_cookie(ACCESS_TOKEN_COOKIE, &tokens.access_token),
            set_cookie(REFRESH_TOKEN_COOKIE, &tokens.refresh_token),
            set_cookie(USER_ID_COOKIE, &identity.id.to_string()),
        ]);
        state.current = Some(ClientSession { identity, tokens });
        Ok(())
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.current = None;
        state.pending = COOKIE_NAMES.iter().map(|name| expire_cookie(name)).collect();
    }
}

/// Host-only (no `Domain`), `/`-scoped, unreadable from script.
fn protected<'c>(name: &'c str, value: &'c str) -> CookieBuilder<'c> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
}

fn set_cookie(name: &str, value: &str) -> String {
    let max_age = Duration::seconds(SESSION_COOKIE_MAX_AGE_SECS);
    protected(name, value)
        .max_age(max_age)
        .expires(OffsetDateTime::now_utc() + max_age)
        .build()
        .to_string()
}

fn expire_cookie(name: &str) -> String {
    protected(name, "").removal().build().to_string()
}
