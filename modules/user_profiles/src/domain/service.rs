use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::UserProfilesConfig;
use crate::contract::model::{FlagsPatch, PasswordHash, UserProfile};
use crate::domain::email::normalize_email;
use crate::domain::error::DomainError;
use crate::domain::password::PasswordHasher;
use crate::domain::repo::{EmailTaken, UserProfileRepository};

/// Validated construction and lifecycle of user profiles.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct UserProfileManager {
    repo: Arc<dyn UserProfileRepository>,
    hasher: PasswordHasher,
    config: ManagerConfig,
}

/// Configuration for the manager
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub max_field_length: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_field_length: 255,
        }
    }
}

impl UserProfileManager {
    /// Create a manager with dependencies.
    pub fn new(
        repo: Arc<dyn UserProfileRepository>,
        hasher: PasswordHasher,
        config: ManagerConfig,
    ) -> Self {
        Self {
            repo,
            hasher,
            config,
        }
    }

    /// Build a manager from the module configuration section.
    pub fn from_config(
        repo: Arc<dyn UserProfileRepository>,
        cfg: &UserProfilesConfig,
    ) -> Result<Self, DomainError> {
        let hasher = PasswordHasher::new(&cfg.password_hasher)?;
        let config = ManagerConfig {
            max_field_length: cfg.max_field_length,
        };
        Ok(Self::new(repo, hasher, config))
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    #[instrument(
        name = "user_profiles.manager.create_user",
        skip(self, password),
        fields(email = %email, name = %name)
    )]
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: Option<&str>,
    ) -> Result<UserProfile, DomainError> {
        info!("Creating user profile");

        if email.trim().is_empty() {
            return Err(DomainError::validation(
                "email",
                "user must have an email address",
            ));
        }
        let email = normalize_email(email);
        self.validate_field("email", &email)?;
        self.validate_field("name", name)?;

        if self
            .repo
            .email_exists(&email)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?
        {
            return Err(DomainError::email_already_exists(email));
        }

        let password_hash = self.derive_hash(password).await?;
        let now = Utc::now();
        let user = UserProfile {
            id: Uuid::new_v4(),
            email,
            name: name.to_string(),
            password_hash,
            last_login: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: now,
            updated_at: now,
        };

        self.repo
            .insert(user.clone())
            .await
            .map_err(map_write_error)?;

        info!(user_id = %user.id, "Created user profile");
        Ok(user)
    }

    #[instrument(
        name = "user_profiles.manager.create_superuser",
        skip(self, password),
        fields(email = %email)
    )]
    pub async fn create_superuser(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<UserProfile, DomainError> {
        let mut user = self.create_user(email, name, Some(password)).await?;

        user.is_superuser = true;
        user.is_staff = true;
        user.updated_at = Utc::now();
        self.repo
            .update(user.clone())
            .await
            .map_err(map_write_error)?;

        info!(user_id = %user.id, "Promoted new profile to superuser");
        Ok(user)
    }

    #[instrument(name = "user_profiles.manager.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<UserProfile, DomainError> {
        debug!("Getting user profile by id");
        self.load(id).await
    }

    #[instrument(name = "user_profiles.manager.get_by_email", skip(self), fields(email = %email))]
    pub async fn get_by_email(&self, email: &str) -> Result<UserProfile, DomainError> {
        let email = normalize_email(email);
        self.repo
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?
            .ok_or_else(|| DomainError::email_not_found(email))
    }

    /// Verify credentials for an active account and record the login.
    ///
    /// Unknown email, wrong password, unusable password and inactive
    /// account all yield [`DomainError::InvalidCredentials`].
    #[instrument(
        name = "user_profiles.manager.authenticate",
        skip(self, password),
        fields(email = %email)
    )]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, DomainError> {
        let email = normalize_email(email);
        let found = self
            .repo
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;

        let Some(mut user) = found else {
            // Spend the same hashing work as a real check.
            let _ = self.derive_hash(Some(password)).await;
            debug!("Authentication failed: unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !self.verify(password, &user.password_hash).await? {
            debug!(user_id = %user.id, "Authentication failed: password mismatch");
            return Err(DomainError::InvalidCredentials);
        }
        if !user.is_active {
            debug!(user_id = %user.id, "Authentication failed: inactive account");
            return Err(DomainError::InvalidCredentials);
        }

        if self.hasher.needs_rehash(&user.password_hash) {
            debug!(user_id = %user.id, "Upgrading stored password hash");
            user.password_hash = self.derive_hash(Some(password)).await?;
        }
        user.last_login = Some(Utc::now());
        self.repo
            .update(user.clone())
            .await
            .map_err(map_write_error)?;

        info!(user_id = %user.id, "User authenticated");
        Ok(user)
    }

    /// Replace the credential; `None` makes the password unusable.
    #[instrument(
        name = "user_profiles.manager.set_password",
        skip(self, password),
        fields(user_id = %id)
    )]
    pub async fn set_password(
        &self,
        id: Uuid,
        password: Option<&str>,
    ) -> Result<UserProfile, DomainError> {
        let mut user = self.load(id).await?;

        user.password_hash = self.derive_hash(password).await?;
        user.updated_at = Utc::now();
        self.repo
            .update(user.clone())
            .await
            .map_err(map_write_error)?;

        info!("Password changed");
        Ok(user)
    }

    #[instrument(name = "user_profiles.manager.update_flags", skip(self), fields(user_id = %id))]
    pub async fn update_flags(
        &self,
        id: Uuid,
        patch: FlagsPatch,
    ) -> Result<UserProfile, DomainError> {
        let mut user = self.load(id).await?;
        if patch.is_empty() {
            debug!("Empty flags patch, nothing to persist");
            return Ok(user);
        }

        if let Some(active) = patch.is_active {
            user.is_active = active;
        }
        if let Some(staff) = patch.is_staff {
            user.is_staff = staff;
        }
        if let Some(superuser) = patch.is_superuser {
            user.is_superuser = superuser;
        }
        if user.is_superuser && !user.is_staff {
            warn!("Superuser without staff flag cannot reach the admin panel");
        }
        user.updated_at = Utc::now();

        self.repo
            .update(user.clone())
            .await
            .map_err(map_write_error)?;

        info!(
            is_active = user.is_active,
            is_staff = user.is_staff,
            is_superuser = user.is_superuser,
            "Updated flags"
        );
        Ok(user)
    }

    #[instrument(name = "user_profiles.manager.delete_user", skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting user profile");

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;
        if !deleted {
            return Err(DomainError::user_not_found(id));
        }

        info!("Deleted user profile");
        Ok(())
    }

    // --- helpers ---

    async fn load(&self, id: Uuid) -> Result<UserProfile, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    fn validate_field(&self, field: &str, value: &str) -> Result<(), DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::validation(field, "must not be empty"));
        }
        let len = value.chars().count();
        if len > self.config.max_field_length {
            return Err(DomainError::validation(
                field,
                format!(
                    "too long: {len} characters (max: {})",
                    self.config.max_field_length
                ),
            ));
        }
        Ok(())
    }

    /// Argon2 is CPU bound; keep it off the async workers.
    async fn derive_hash(&self, password: Option<&str>) -> Result<PasswordHash, DomainError> {
        let Some(raw) = password else {
            return Ok(PasswordHasher::unusable());
        };
        let hasher = self.hasher.clone();
        let raw = raw.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&raw))
            .await
            .map_err(|e| DomainError::password_hashing(e.to_string()))?
    }

    async fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, DomainError> {
        let hasher = self.hasher.clone();
        let raw = password.to_owned();
        let hash = hash.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&raw, &hash))
            .await
            .map_err(|e| DomainError::password_hashing(e.to_string()))
    }
}

fn map_write_error(e: anyhow::Error) -> DomainError {
    match e.downcast_ref::<EmailTaken>() {
        Some(taken) => DomainError::email_already_exists(taken.email.clone()),
        None => DomainError::database(format!("{e:#}")),
    }
}
