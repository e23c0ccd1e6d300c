//! Integration tests for the authentication service.

use chrono::{Duration, Utc};
use futures_util::future::join_all;
use std::sync::Arc;
use urlshort_auth::config::AuthConfig;
use urlshort_auth::error::AuthError;
use urlshort_auth::service::{AuthService, LoginInput, RefreshInput, RegisterInput};
use urlshort_auth::token;
use urlshort_core::error::CoreError;
use urlshort_core::models::session::SessionRecord;
use urlshort_core::models::user::{CreateUser, Role};
use urlshort_core::repository::{SessionRepository, UserRepository};
use urlshort_db::{MemorySessionRepository, MemoryUserRepository};
use uuid::Uuid;

type Service = AuthService<MemoryUserRepository, MemorySessionRepository>;

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-secret-integration-secret-01".into(),
        jwt_issuer: "urlshort-test".into(),
        jwt_audience: "urlshort-test-clients".into(),
        ..Default::default()
    }
}

/// Build a service with one admin account (`admin` / `correct-secret`).
async fn setup() -> (Service, MemorySessionRepository, Uuid) {
    let users = MemoryUserRepository::new();
    let sessions = MemorySessionRepository::new();
    let svc = AuthService::new(users.clone(), sessions.clone(), test_config()).unwrap();

    let admin = users
        .create(CreateUser {
            username: "admin".into(),
            nickname: "Admin".into(),
            password_hash: svc.verifier().hash("correct-secret").unwrap(),
            role: Role::Admin,
        })
        .await
        .unwrap();

    (svc, sessions, admin.id)
}

fn admin_login() -> LoginInput {
    LoginInput {
        username: "admin".into(),
        password: "correct-secret".into(),
    }
}

#[tokio::test]
async fn login_happy_path() {
    let (svc, sessions, admin_id) = setup().await;

    let pair = svc.login(admin_login()).await.unwrap();
    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());

    // Claims match the stored identity.
    let claims = token::decode_access_token(&pair.access_token, svc.config()).unwrap();
    assert_eq!(claims.sub, admin_id.to_string());
    assert_eq!(claims.name, "Admin");
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.iss, "urlshort-test");

    // Only the hash is stored.
    let record = sessions.get(admin_id).await.unwrap().unwrap();
    assert_ne!(record.token_hash, pair.refresh_token);
    assert_eq!(record.token_hash, token::hash_refresh_token(&pair.refresh_token));
    assert!(record.expires_at > Utc::now() + Duration::days(6));
}

#[tokio::test]
async fn login_wrong_password_and_unknown_user_look_the_same() {
    let (svc, sessions, _) = setup().await;

    let wrong = svc
        .login(LoginInput {
            username: "admin".into(),
            password: "wrong-secret".into(),
        })
        .await
        .unwrap_err();
    let unknown = svc
        .login(LoginInput {
            username: "nobody".into(),
            password: "correct-secret".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert_eq!(wrong.to_string(), unknown.to_string());
    assert!(sessions.is_empty().await);
}

#[tokio::test]
async fn second_login_replaces_session() {
    let (svc, _, admin_id) = setup().await;

    let first = svc.login(admin_login()).await.unwrap();
    let _second = svc.login(admin_login()).await.unwrap();

    let err = svc
        .refresh(RefreshInput {
            user_id: admin_id,
            refresh_token: first.refresh_token,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshInvalid));
}

#[tokio::test]
async fn refresh_happy_path() {
    let (svc, _, admin_id) = setup().await;
    let login = svc.login(admin_login()).await.unwrap();

    let rotated = svc
        .refresh(RefreshInput {
            user_id: admin_id,
            refresh_token: login.refresh_token.clone(),
        })
        .await
        .unwrap();

    assert_ne!(rotated.refresh_token, login.refresh_token);
    let identity = svc.validate(&rotated.access_token).unwrap();
    assert_eq!(identity.id, admin_id);
    assert_eq!(identity.role, Role::Admin);
}

#[tokio::test]
async fn refresh_replay_fails() {
    let (svc, _, admin_id) = setup().await;
    let login = svc.login(admin_login()).await.unwrap();
    let old_token = login.refresh_token.clone();

    // First refresh succeeds.
    svc.refresh(RefreshInput {
        user_id: admin_id,
        refresh_token: old_token.clone(),
    })
    .await
    .unwrap();

    // Second use of same token fails (single-use).
    let err = svc
        .refresh(RefreshInput {
            user_id: admin_id,
            refresh_token: old_token,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshInvalid));
}

#[tokio::test]
async fn replayed_token_revokes_the_session() {
    let (svc, sessions, admin_id) = setup().await;
    let login = svc.login(admin_login()).await.unwrap();

    let rotated = svc
        .refresh(RefreshInput {
            user_id: admin_id,
            refresh_token: login.refresh_token.clone(),
        })
        .await
        .unwrap();
    let replay = svc
        .refresh(RefreshInput {
            user_id: admin_id,
            refresh_token: login.refresh_token,
        })
        .await;
    assert!(matches!(replay, Err(AuthError::RefreshInvalid)));
    assert!(sessions.get(admin_id).await.unwrap().is_none());

    // The rotated value died with the session.
    let err = svc
        .refresh(RefreshInput {
            user_id: admin_id,
            refresh_token: rotated.refresh_token,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshInvalid));

    // A fresh login starts a new session.
    svc.login(admin_login()).await.unwrap();
    assert!(sessions.get(admin_id).await.unwrap().is_some());
}

#[tokio::test]
async fn refresh_invalid_token_fails() {
    let (svc, sessions, admin_id) = setup().await;
    svc.login(admin_login()).await.unwrap();

    let err = svc
        .refresh(RefreshInput {
            user_id: admin_id,
            refresh_token: "totally-bogus-token".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshInvalid));
    assert!(sessions.get(admin_id).await.unwrap().is_none());
}

#[tokio::test]
async fn refresh_without_session_fails() {
    let (svc, _, admin_id) = setup().await;

    let err = svc
        .refresh(RefreshInput {
            user_id: admin_id,
            refresh_token: token::generate_refresh_token(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshInvalid));
}

#[tokio::test]
async fn refresh_expired_token_fails_and_removes_record() {
    let (svc, sessions, admin_id) = setup().await;

    let raw = token::generate_refresh_token();
    sessions
        .put(SessionRecord::new(
            admin_id,
            token::hash_refresh_token(&raw),
            Utc::now() - Duration::seconds(1),
        ))
        .await
        .unwrap();

    let err = svc
        .refresh(RefreshInput {
            user_id: admin_id,
            refresh_token: raw,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshExpired));
    assert!(sessions.get(admin_id).await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_refresh_with_same_value_has_one_winner() {
    let (svc, _, admin_id) = setup().await;
    let login = svc.login(admin_login()).await.unwrap();
    let svc = Arc::new(svc);

    let attempts = (0..8).map(|_| {
        let svc = svc.clone();
        let refresh_token = login.refresh_token.clone();
        tokio::spawn(async move {
            svc.refresh(RefreshInput {
                user_id: admin_id,
                refresh_token,
            })
            .await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert!(matches!(err, AuthError::RefreshInvalid), "got {err:?}");
    }
}

#[tokio::test]
async fn logout_invalidates_session() {
    let (svc, sessions, admin_id) = setup().await;
    let login = svc.login(admin_login()).await.unwrap();

    svc.logout(admin_id).await.unwrap();
    // Idempotent.
    svc.logout(admin_id).await.unwrap();
    assert!(sessions.is_empty().await);

    let err = svc
        .refresh(RefreshInput {
            user_id: admin_id,
            refresh_token: login.refresh_token,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshInvalid));
}

#[tokio::test]
async fn register_then_login() {
    let (svc, _, _) = setup().await;

    let pair = svc
        .register(RegisterInput {
            username: "bob".into(),
            password: "bobs-secret".into(),
            nickname: "Bob".into(),
            role: Role::Regular,
        })
        .await
        .unwrap();
    let identity = svc.validate(&pair.access_token).unwrap();
    assert_eq!(identity.display_name, "Bob");
    assert_eq!(identity.role, Role::Regular);

    svc.login(LoginInput {
        username: "bob".into(),
        password: "bobs-secret".into(),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn register_duplicate_username_fails() {
    let (svc, _, _) = setup().await;

    let err = svc
        .register(RegisterInput {
            username: "admin".into(),
            password: "whatever".into(),
            nickname: "Impostor".into(),
            role: Role::Admin,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Repository(CoreError::AlreadyExists { .. })
    ));
}

#[tokio::test]
async fn validate_rejects_tampered_token() {
    let (svc, _, _) = setup().await;
    let pair = svc.login(admin_login()).await.unwrap();

    let tampered = format!("{}x", pair.access_token);
    assert!(svc.validate(&tampered).is_err());
}
