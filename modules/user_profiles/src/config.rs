use serde::{Deserialize, Serialize};

/// Configuration for the user_profiles module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserProfilesConfig {
    /// Upper bound for `email` and `name`; matches the column width.
    #[serde(default = "default_max_field_length")]
    pub max_field_length: usize,
    #[serde(default)]
    pub password_hasher: PasswordHasherConfig,
}

impl Default for UserProfilesConfig {
    fn default() -> Self {
        Self {
            max_field_length: default_max_field_length(),
            password_hasher: PasswordHasherConfig::default(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PasswordHasherConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordHasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_max_field_length() -> usize {
    255
}

fn default_memory_kib() -> u32 {
    argon2::Params::DEFAULT_M_COST
}

fn default_iterations() -> u32 {
    argon2::Params::DEFAULT_T_COST
}

fn default_parallelism() -> u32 {
    argon2::Params::DEFAULT_P_COST
}
