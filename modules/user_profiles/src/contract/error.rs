use thiserror::Error;

use crate::domain::error::DomainError;

/// Errors that are safe to expose to other crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserProfilesError {
    #[error("User profile not found: {key}")]
    NotFound { key: String },

    #[error("User profile with email '{email}' already exists")]
    Conflict { email: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Internal error")]
    Internal,
}

impl UserProfilesError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn conflict(email: impl Into<String>) -> Self {
        Self::Conflict {
            email: email.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<DomainError> for UserProfilesError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UserNotFound { id } => Self::not_found(id.to_string()),
            DomainError::EmailNotFound { email } => Self::not_found(email),
            DomainError::EmailAlreadyExists { email } => Self::conflict(email),
            DomainError::Validation { field, message } => {
                Self::validation(format!("{field}: {message}"))
            }
            DomainError::InvalidCredentials => Self::InvalidCredentials,
            DomainError::PasswordHashing { .. } | DomainError::Database { .. } => Self::internal(),
        }
    }
}
