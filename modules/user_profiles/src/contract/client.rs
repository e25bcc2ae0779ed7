use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{FlagsPatch, UserProfile};

/// Public API for user profiles that other crates can use.
///
/// Failures are `anyhow::Error` values wrapping a
/// [`UserProfilesError`](crate::contract::error::UserProfilesError).
#[async_trait]
pub trait UserProfilesApi: Send + Sync {
    /// Create a user; `None` leaves the account without a usable password.
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: Option<&str>,
    ) -> anyhow::Result<UserProfile>;

    /// Create a user with staff and superuser flags set.
    async fn create_superuser(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> anyhow::Result<UserProfile>;

    async fn get_user(&self, id: Uuid) -> anyhow::Result<UserProfile>;

    /// Natural-key lookup.
    async fn get_by_email(&self, email: &str) -> anyhow::Result<UserProfile>;

    async fn authenticate(&self, email: &str, password: &str) -> anyhow::Result<UserProfile>;

    async fn set_password(&self, id: Uuid, password: Option<&str>) -> anyhow::Result<UserProfile>;

    async fn update_flags(&self, id: Uuid, patch: FlagsPatch) -> anyhow::Result<UserProfile>;

    async fn delete_user(&self, id: Uuid) -> anyhow::Result<()>;
}
