use uuid::Uuid;

use user_profiles::config::{PasswordHasherConfig, UserProfilesConfig};
use user_profiles::contract::{error::UserProfilesError, model::*};
use user_profiles::domain::email::normalize_email;
use user_profiles::domain::error::DomainError;
use user_profiles::domain::service::ManagerConfig;
// Note: internal module imports are only for testing

#[test]
fn test_contract_errors() {
    let error = UserProfilesError::not_found("someone@example.com");
    match error {
        UserProfilesError::NotFound { key } => assert_eq!(key, "someone@example.com"),
        _ => panic!("Expected NotFound error"),
    }

    let error = UserProfilesError::conflict("taken@example.com");
    match error {
        UserProfilesError::Conflict { email } => assert_eq!(email, "taken@example.com"),
        _ => panic!("Expected Conflict error"),
    }

    let error = UserProfilesError::validation("email: must not be empty");
    assert_eq!(
        error.to_string(),
        "Validation error: email: must not be empty"
    );

    assert_eq!(UserProfilesError::internal(), UserProfilesError::Internal);
}

#[test]
fn test_domain_errors_map_to_contract() {
    let id = Uuid::new_v4();
    assert_eq!(
        UserProfilesError::from(DomainError::user_not_found(id)),
        UserProfilesError::not_found(id.to_string())
    );
    assert_eq!(
        UserProfilesError::from(DomainError::email_not_found("a@b.c")),
        UserProfilesError::not_found("a@b.c")
    );
    assert_eq!(
        UserProfilesError::from(DomainError::email_already_exists("a@b.c")),
        UserProfilesError::conflict("a@b.c")
    );
    assert_eq!(
        UserProfilesError::from(DomainError::validation("email", "required")),
        UserProfilesError::validation("email: required")
    );
    assert_eq!(
        UserProfilesError::from(DomainError::InvalidCredentials),
        UserProfilesError::InvalidCredentials
    );
    // Internal details never cross the contract boundary.
    assert_eq!(
        UserProfilesError::from(DomainError::database("connection reset")),
        UserProfilesError::Internal
    );
    assert_eq!(
        UserProfilesError::from(DomainError::password_hashing("bad params")),
        UserProfilesError::Internal
    );
}

#[test]
fn test_domain_error_messages() {
    let error = DomainError::validation("email", "user must have an email address");
    assert!(error.is_validation());
    assert_eq!(
        error.to_string(),
        "Validation failed: email: user must have an email address"
    );

    let error = DomainError::email_already_exists("dup@example.com");
    assert!(!error.is_validation());
    assert_eq!(
        error.to_string(),
        "User profile with email 'dup@example.com' already exists"
    );
}

#[test]
fn test_flags_patch_default() {
    let patch = FlagsPatch::default();
    assert_eq!(patch.is_active, None);
    assert_eq!(patch.is_staff, None);
    assert_eq!(patch.is_superuser, None);
    assert!(patch.is_empty());
}

#[test]
fn test_identity_constants() {
    assert_eq!(UserProfile::USERNAME_FIELD, "email");
    assert_eq!(UserProfile::REQUIRED_FIELDS, &["name"]);
}

#[test]
fn test_normalize_email() {
    assert_eq!(normalize_email("Foo@BAR.example"), "Foo@bar.example");
    assert_eq!(normalize_email("plain"), "plain");
}

#[test]
fn test_manager_config_default() {
    let config = ManagerConfig::default();
    assert_eq!(config.max_field_length, 255);
}

#[test]
fn test_user_profiles_config() {
    let config = UserProfilesConfig::default();
    assert_eq!(config.max_field_length, 255);
    assert_eq!(config.password_hasher, PasswordHasherConfig::default());
    assert_eq!(config.password_hasher.memory_kib, 19 * 1024);
    assert_eq!(config.password_hasher.iterations, 2);
    assert_eq!(config.password_hasher.parallelism, 1);

    let json_config = r#"{"max_field_length": 120, "password_hasher": {"iterations": 3}}"#;
    let config: UserProfilesConfig = serde_json::from_str(json_config).expect("Should deserialize");
    assert_eq!(config.max_field_length, 120);
    assert_eq!(config.password_hasher.iterations, 3);
    assert_eq!(config.password_hasher.memory_kib, 19 * 1024);

    let unknown = r#"{"max_field_len": 120}"#;
    assert!(serde_json::from_str::<UserProfilesConfig>(unknown).is_err());
}
