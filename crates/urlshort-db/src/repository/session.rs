//! In-memory implementation of [`SessionRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use urlshort_core::error::CoreResult;
use urlshort_core::models::session::{SessionRecord, SwapOutcome};
use urlshort_core::repository::SessionRepository;
use uuid::Uuid;

/// One record per user, keyed by user ID. Every mutation happens under the
/// write lock, which makes `compare_and_swap` atomic per user.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionRepository {
    records: Arc<RwLock<HashMap<Uuid, SessionRecord>>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl SessionRepository for MemorySessionRepository {
    async fn put(&self, record: SessionRecord) -> CoreResult<()> {
        self.records.write().await.insert(record.user_id, record);
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> CoreResult<Option<SessionRecord>> {
        Ok(self.records.read().await.get(&user_id).cloned())
    }

    async fn compare_and_swap(
        &self,
        user_id: Uuid,
        expected_hash: &str,
        replacement: SessionRecord,
    ) -> CoreResult<SwapOutcome> {
        let mut records = self.records.write().await;
        let outcome = match records.get_mut(&user_id) {
            None => SwapOutcome::Missing,
            Some(current) if current.token_hash != expected_hash => SwapOutcome::Mismatch,
            Some(current) => {
                *current = replacement;
                SwapOutcome::Swapped
            }
        };
        debug!(user_id = %user_id, ?outcome, "session compare-and-swap");
        Ok(outcome)
    }

    async fn delete(&self, user_id: Uuid) -> CoreResult<bool> {
        Ok(self.records.write().await.remove(&user_id).is_some())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> CoreResult<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now));
        Ok((before - records.len()) as u64)
    }
}
