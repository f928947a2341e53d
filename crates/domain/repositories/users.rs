use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::domain::entities::users::{InsertUserEntity, UserEntity};

#[automock]
#[async_trait]
pub trait UserRepository {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserEntity>>;

    /// Inserts the user, or only refreshes `last_seen` when the uid is
    /// already stored. The stored role is never overwritten.
    async fn insert_or_touch(&self, user: InsertUserEntity) -> Result<UserEntity>;

    async fn touch_last_seen(&self, uid: &str, at: DateTime<Utc>) -> Result<Option<UserEntity>>;

    /// Returns whether a user row was updated.
    async fn mark_profile_completed(&self, uid: &str) -> Result<bool>;
}
