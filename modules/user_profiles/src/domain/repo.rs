use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::UserProfile;

/// Port for the domain layer: persistence operations the manager needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    /// Load a profile by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserProfile>>;
    /// Load a profile by its (already normalized) email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserProfile>>;
    /// Check uniqueness by email.
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    /// Insert a fully-formed profile.
    ///
    /// Fails with [`EmailTaken`] when the store rejects a duplicate email.
    async fn insert(&self, u: UserProfile) -> anyhow::Result<()>;
    /// Update an existing profile (by primary key in `u.id`).
    async fn update(&self, u: UserProfile) -> anyhow::Result<()>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// Raised by repositories when the unique email constraint fires.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("email '{email}' is already registered")]
pub struct EmailTaken {
    pub email: String,
}
