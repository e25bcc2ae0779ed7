//! Capability traits implemented by [`UserProfile`].
//!
//! Credential handling and role flags are two independent capabilities;
//! the record composes both instead of inheriting them from a base type.

use crate::contract::model::{PasswordHash, UserProfile};

/// Checks a plaintext password against stored credential material.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, raw: &str, hash: &PasswordHash) -> bool;
}

/// Credential fields plus the login identity.
pub trait Authenticatable {
    /// Value of the login field.
    fn username(&self) -> &str;

    fn password_hash(&self) -> &PasswordHash;

    fn is_active(&self) -> bool;

    fn has_usable_password(&self) -> bool {
        self.password_hash().is_usable()
    }

    /// Does not look at `is_active`; login gating belongs to the caller.
    fn check_password(&self, raw: &str, verifier: &dyn CredentialVerifier) -> bool {
        self.has_usable_password() && verifier.verify(raw, self.password_hash())
    }
}

/// Role flags and permission checks.
pub trait PermissionHolder {
    fn is_staff(&self) -> bool;

    fn is_superuser(&self) -> bool;

    /// Whether the holder may use permissions at all.
    fn is_permission_active(&self) -> bool;

    /// Active superusers hold every permission. No per-permission grants
    /// are stored, so everyone else holds none.
    fn has_perm(&self, _perm: &str) -> bool {
        self.is_permission_active() && self.is_superuser()
    }

    fn has_perms(&self, perms: &[&str]) -> bool {
        perms.iter().all(|p| self.has_perm(p))
    }

    fn has_module_perms(&self, _module: &str) -> bool {
        self.is_permission_active() && self.is_superuser()
    }
}

impl Authenticatable for UserProfile {
    fn username(&self) -> &str {
        &self.email
    }

    fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl PermissionHolder for UserProfile {
    fn is_staff(&self) -> bool {
        self.is_staff
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    fn is_permission_active(&self) -> bool {
        self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::sample_profile;

    struct EqualsVerifier;

    impl CredentialVerifier for EqualsVerifier {
        fn verify(&self, raw: &str, hash: &PasswordHash) -> bool {
            hash.as_str() == format!("plain:{raw}")
        }
    }

    #[test]
    fn username_is_email() {
        let user = sample_profile("carol@example.com", "Carol");
        assert_eq!(user.username(), "carol@example.com");
    }

    #[test]
    fn unusable_password_never_checks() {
        let user = sample_profile("dave@example.com", "Dave");
        assert!(!user.has_usable_password());
        assert!(!user.check_password("sample", &EqualsVerifier));
    }

    #[test]
    fn check_password_delegates_to_verifier() {
        let mut user = sample_profile("erin@example.com", "Erin");
        user.password_hash = PasswordHash::from_stored("plain:secret".into());
        assert!(user.check_password("secret", &EqualsVerifier));
        assert!(!user.check_password("wrong", &EqualsVerifier));

        user.is_active = false;
        assert!(user.check_password("secret", &EqualsVerifier));
    }

    #[test]
    fn superuser_permissions() {
        let mut user = sample_profile("root@example.com", "Root");
        assert!(!user.has_perm("profiles.delete"));
        assert!(!user.has_module_perms("profiles"));

        user.is_superuser = true;
        assert!(user.has_perm("profiles.delete"));
        assert!(user.has_perms(&["profiles.add", "profiles.delete"]));
        assert!(user.has_module_perms("profiles"));

        user.is_active = false;
        assert!(!user.has_perm("profiles.delete"));
        assert!(!user.has_module_perms("profiles"));
    }

    #[test]
    fn staff_alone_grants_no_permissions() {
        let mut user = sample_profile("staff@example.com", "Staff");
        user.is_staff = true;
        assert!(user.is_staff());
        assert!(!user.has_perm("profiles.view"));
    }
}
