//! Integration tests for the in-memory user repository.

use urlshort_core::error::CoreError;
use urlshort_core::models::user::{CreateUser, Role};
use urlshort_core::repository::UserRepository;
use urlshort_db::MemoryUserRepository;
use uuid::Uuid;

fn alice() -> CreateUser {
    CreateUser {
        username: "alice".into(),
        nickname: "Alice".into(),
        password_hash: "$argon2id$placeholder".into(),
        role: Role::Regular,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let repo = MemoryUserRepository::new();

    let user = repo.create(alice()).await.unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.nickname, "Alice");
    assert_eq!(user.role, Role::Regular);

    let by_id = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(by_id.username, "alice");

    let by_name = repo.get_by_username("alice").await.unwrap();
    assert_eq!(by_name.id, user.id);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let repo = MemoryUserRepository::new();
    repo.create(alice()).await.unwrap();

    let err = repo.create(alice()).await.unwrap_err();
    assert!(
        matches!(err, CoreError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let repo = MemoryUserRepository::new();

    assert!(matches!(
        repo.get_by_username("nobody").await,
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(
        repo.get_by_id(Uuid::new_v4()).await,
        Err(CoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn clones_share_state() {
    let repo = MemoryUserRepository::new();
    let other = repo.clone();
    let user = repo.create(alice()).await.unwrap();

    assert_eq!(other.get_by_id(user.id).await.unwrap().id, user.id);
}
