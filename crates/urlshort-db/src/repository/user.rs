//! In-memory implementation of [`UserRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use urlshort_core::error::CoreResult;
use urlshort_core::models::user::{CreateUser, User};
use urlshort_core::repository::UserRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Default)]
struct UserTable {
    rows: HashMap<Uuid, User>,
    /// Unique index on `username`.
    by_username: HashMap<String, Uuid>,
}

/// In-memory user table. Clones share the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, input: CreateUser) -> CoreResult<User> {
        let mut table = self.table.write().await;
        if table.by_username.contains_key(&input.username) {
            return Err(DbError::Duplicate {
                entity: "user".into(),
                field: "username".into(),
            }
            .into());
        }

        let user = User {
            id: Uuid::new_v4(),
            username: input.username,
            nickname: input.nickname,
            password_hash: input.password_hash,
            role: input.role,
            created_at: Utc::now(),
        };
        table.by_username.insert(user.username.clone(), user.id);
        table.rows.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<User> {
        let table = self.table.read().await;
        table.rows.get(&id).cloned().ok_or_else(|| {
            DbError::NotFound {
                entity: "user".into(),
                id: id.to_string(),
            }
            .into()
        })
    }

    async fn get_by_username(&self, username: &str) -> CoreResult<User> {
        let table = self.table.read().await;
        table
            .by_username
            .get(username)
            .and_then(|id| table.rows.get(id))
            .cloned()
            .ok_or_else(|| {
                DbError::NotFound {
                    entity: "user".into(),
                    id: format!("username={username}"),
                }
                .into()
            })
    }
}
