//! The real client against the real server on a local listener.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use tokio::net::TcpListener;
use urlshort_auth::AuthConfig;
use urlshort_auth::token::{AccessTokenClaims, sign_claims};
use urlshort_client::session::MemorySessionStore;
use urlshort_client::{AuthApi, AuthHttpClient, ClientConfig, ClientSessionStore};
use urlshort_core::models::token::{IdentityResponse, TokenPair};
use urlshort_core::models::user::Role;
use urlshort_server::{AppState, create_router};

const SECRET: &str = "end-to-end-secret-end-to-end-secret!";

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SECRET.into(),
        ..Default::default()
    }
}

async fn spawn_server() -> String {
    let state = Arc::new(AppState::new(auth_config()).unwrap());
    state
        .bootstrap_admin("admin", "correct-secret")
        .await
        .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

/// Replace the stored access token with an expired but validly signed one.
fn expire_access_token(store: &MemorySessionStore) {
    let session = store.load().unwrap();
    let mut claims = AccessTokenClaims::for_identity(&session.identity, &auth_config());
    claims.iat = Utc::now().timestamp() - 3600;
    claims.exp = Utc::now().timestamp() - 1800;
    let expired = sign_claims(&claims, &auth_config()).unwrap();
    store
        .save(
            session.identity,
            TokenPair {
                access_token: expired,
                refresh_token: session.tokens.refresh_token,
            },
        )
        .unwrap();
}

#[tokio::test]
async fn expired_session_recovers_transparently() {
    let base = spawn_server().await;
    let config = ClientConfig {
        base_url: base.clone(),
        request_timeout: Duration::from_secs(5),
    };
    let store = Arc::new(MemorySessionStore::new());
    let api = AuthApi::from_config(&config).unwrap();

    let identity = api
        .login_into(store.as_ref(), "admin", "correct-secret")
        .await
        .unwrap();
    assert_eq!(identity.role, Role::Admin);

    expire_access_token(&store);
    let stale_refresh = store.refresh_token().unwrap();

    let client = AuthHttpClient::from_config(&config, store.clone()).unwrap();
    let response = client
        .send(client.get(format!("{base}/me")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let me: IdentityResponse = response.json().await.unwrap();
    assert_eq!(me.user_id, identity.id.to_string());
    assert_ne!(store.refresh_token().unwrap(), stale_refresh);
}

#[tokio::test]
async fn concurrent_expired_requests_all_succeed() {
    let base = spawn_server().await;
    let config = ClientConfig {
        base_url: base.clone(),
        request_timeout: Duration::from_secs(5),
    };
    let store = Arc::new(MemorySessionStore::new());
    AuthApi::from_config(&config)
        .unwrap()
        .login_into(store.as_ref(), "admin", "correct-secret")
        .await
        .unwrap();
    expire_access_token(&store);

    // A second server-side refresh with the spent token would fail and
    // clear the session, so every request succeeding implies one refresh.
    let client = Arc::new(AuthHttpClient::from_config(&config, store.clone()).unwrap());
    let calls = (0..6).map(|_| {
        let client = Arc::clone(&client);
        let url = format!("{base}/me");
        tokio::spawn(async move { client.send(client.get(url)).await })
    });

    for outcome in futures_util::future::join_all(calls).await {
        assert_eq!(outcome.unwrap().unwrap().status(), StatusCode::OK);
    }
    assert!(store.load().is_some());
}

#[tokio::test]
async fn revoked_session_surfaces_401_and_clears() {
    let base = spawn_server().await;
    let config = ClientConfig {
        base_url: base.clone(),
        request_timeout: Duration::from_secs(5),
    };
    let store = Arc::new(MemorySessionStore::new());
    let api = AuthApi::from_config(&config).unwrap();
    api.login_into(store.as_ref(), "admin", "correct-secret")
        .await
        .unwrap();

    // Revoke server-side while keeping the local copy.
    let local = store.load().unwrap();
    api.logout(&local.tokens.access_token).await.unwrap();
    expire_access_token(&store);

    let client = AuthHttpClient::from_config(&config, store.clone()).unwrap();
    let response = client
        .send(client.get(format!("{base}/me")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.load().is_none());
}
