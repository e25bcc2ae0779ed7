use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::UserProfilesApi,
    error::UserProfilesError,
    model::{FlagsPatch, UserProfile},
};
use crate::domain::{error::DomainError, service::UserProfileManager};

/// In-process implementation of `UserProfilesApi` that delegates to the manager
pub struct UserProfilesLocalClient {
    manager: Arc<UserProfileManager>,
}

impl UserProfilesLocalClient {
    pub fn new(manager: Arc<UserProfileManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl UserProfilesApi for UserProfilesLocalClient {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: Option<&str>,
    ) -> anyhow::Result<UserProfile> {
        self.manager
            .create_user(email, name, password)
            .await
            .map_err(to_anyhow)
    }

    async fn create_superuser(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> anyhow::Result<UserProfile> {
        self.manager
            .create_superuser(email, name, password)
            .await
            .map_err(to_anyhow)
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<UserProfile> {
        self.manager.get_user(id).await.map_err(to_anyhow)
    }

    async fn get_by_email(&self, email: &str) -> anyhow::Result<UserProfile> {
        self.manager.get_by_email(email).await.map_err(to_anyhow)
    }

    async fn authenticate(&self, email: &str, password: &str) -> anyhow::Result<UserProfile> {
        self.manager
            .authenticate(email, password)
            .await
            .map_err(to_anyhow)
    }

    async fn set_password(&self, id: Uuid, password: Option<&str>) -> anyhow::Result<UserProfile> {
        self.manager
            .set_password(id, password)
            .await
            .map_err(to_anyhow)
    }

    async fn update_flags(&self, id: Uuid, patch: FlagsPatch) -> anyhow::Result<UserProfile> {
        self.manager
            .update_flags(id, patch)
            .await
            .map_err(to_anyhow)
    }

    async fn delete_user(&self, id: Uuid) -> anyhow::Result<()> {
        self.manager.delete_user(id).await.map_err(to_anyhow)
    }
}

/// Map domain errors to contract errors wrapped in anyhow
fn to_anyhow(e: DomainError) -> anyhow::Error {
    anyhow::Error::new(UserProfilesError::from(e))
}
