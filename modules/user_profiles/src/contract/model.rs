use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Prefix marking a stored password that can never verify.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Stored credential material in PHC string form.
///
/// Values are produced only by the password hasher (or restored from
/// storage by the repository adapter); there is no public constructor
/// that accepts arbitrary text.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub(crate) fn from_stored(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns false for unusable markers.
    pub fn is_usable(&self) -> bool {
        !self.0.starts_with(UNUSABLE_PASSWORD_PREFIX)
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_usable() {
            f.write_str("PasswordHash(<redacted>)")
        } else {
            f.write_str("PasswordHash(<unusable>)")
        }
    }
}

/// One authenticated system user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub(crate) password_hash: PasswordHash,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Field used as the login identifier.
    pub const USERNAME_FIELD: &'static str = "email";
    /// Fields required at creation time besides the login field and the credential.
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["name"];

    pub fn get_full_name(&self) -> &str {
        &self.name
    }

    pub fn get_short_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Administrative flag toggles; `None` leaves a flag unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagsPatch {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl FlagsPatch {
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.is_staff.is_none() && self.is_superuser.is_none()
    }
}

#[cfg(test)]
pub(crate) fn sample_profile(email: &str, name: &str) -> UserProfile {
    let now = Utc::now();
    UserProfile {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: name.to_string(),
        password_hash: PasswordHash::from_stored("!sample".to_string()),
        last_login: None,
        is_active: true,
        is_staff: false,
        is_superuser: false,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_email() {
        let user = sample_profile("alice@example.com", "Alice");
        assert_eq!(user.to_string(), "alice@example.com");
    }

    #[test]
    fn full_and_short_name_are_name() {
        let user = sample_profile("bob@example.com", "Bob Builder");
        assert_eq!(user.get_full_name(), "Bob Builder");
        assert_eq!(user.get_short_name(), "Bob Builder");
    }

    #[test]
    fn identity_fields() {
        assert_eq!(UserProfile::USERNAME_FIELD, "email");
        assert_eq!(UserProfile::REQUIRED_FIELDS, &["name"]);
    }

    #[test]
    fn password_hash_debug_is_redacted() {
        let usable = PasswordHash::from_stored("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".into());
        assert_eq!(format!("{usable:?}"), "PasswordHash(<redacted>)");
        assert!(usable.is_usable());

        let unusable = PasswordHash::from_stored("!abc".into());
        assert_eq!(format!("{unusable:?}"), "PasswordHash(<unusable>)");
        assert!(!unusable.is_usable());
    }

    #[test]
    fn empty_flags_patch() {
        assert!(FlagsPatch::default().is_empty());
        let patch = FlagsPatch {
            is_staff: Some(true),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
