//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The auth service is generic over
//! these traits so it never depends on a concrete storage crate.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::models::session::{SessionRecord, SwapOutcome};
use crate::models::user::{CreateUser, User};

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the username is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_by_username(&self, username: &str) -> impl Future<Output = CoreResult<User>> + Send;
}

/// Durable per-user refresh state. At most one record per user.
pub trait SessionRepository: Send + Sync {
    /// Insert or unconditionally replace the record for `record.user_id`.
    fn put(&self, record: SessionRecord) -> impl Future<Output = CoreResult<()>> + Send;
    fn get(&self, user_id: Uuid) -> impl Future<Output = CoreResult<Option<SessionRecord>>> + Send;
    /// Replace the record only if the stored hash still equals
    /// `expected_hash`. Must be atomic per user.
    fn compare_and_swap(
        &self,
        user_id: Uuid,
        expected_hash: &str,
        replacement: SessionRecord,
    ) -> impl Future<Output = CoreResult<SwapOutcome>> + Send;
    /// Remove the record. Returns whether one existed.
    fn delete(&self, user_id: Uuid) -> impl Future<Output = CoreResult<bool>> + Send;
    /// Remove every record whose expiry is at or before `now`.
    fn cleanup_expired(&self, now: DateTime<Utc>) -> impl Future<Output = CoreResult<u64>> + Send;
}
