//! One-way adaptive password hashing (Argon2id, PHC string format).

use std::fmt;

use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::{OsRng, RngCore};

use crate::config::PasswordHasherConfig;
use crate::contract::capabilities::CredentialVerifier;
use crate::contract::model::{PasswordHash, UNUSABLE_PASSWORD_PREFIX};
use crate::domain::error::DomainError;

const UNUSABLE_SUFFIX_LEN: usize = 40;
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Argon2id hasher with fixed cost parameters. Cheap to clone.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    params: Params,
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}

impl PasswordHasher {
    pub fn new(cfg: &PasswordHasherConfig) -> Result<Self, DomainError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| DomainError::password_hashing(format!("invalid argon2 parameters: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone());
        Ok(Self { argon2, params })
    }

    /// Derive a salted hash; every call uses a fresh random salt.
    pub fn hash(&self, raw: &str) -> Result<PasswordHash, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| DomainError::password_hashing(e.to_string()))?;
        Ok(PasswordHash::from_stored(phc.to_string()))
    }

    /// A marker that no password verifies against.
    pub fn unusable() -> PasswordHash {
        let mut bytes = [0u8; UNUSABLE_SUFFIX_LEN];
        OsRng.fill_bytes(&mut bytes);
        let mut encoded = String::with_capacity(UNUSABLE_SUFFIX_LEN + 1);
        encoded.push(UNUSABLE_PASSWORD_PREFIX);
        encoded.extend(
            bytes
                .iter()
                .map(|b| ALPHANUMERIC[*b as usize % ALPHANUMERIC.len()] as char),
        );
        PasswordHash::from_stored(encoded)
    }

    pub fn verify(&self, raw: &str, hash: &PasswordHash) -> bool {
        if !hash.is_usable() {
            return false;
        }
        match PhcString::new(hash.as_str()) {
            Ok(parsed) => self.argon2.verify_password(raw.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    /// True when a usable hash was produced with another algorithm or
    /// other cost parameters than this hasher's.
    pub fn needs_rehash(&self, hash: &PasswordHash) -> bool {
        if !hash.is_usable() {
            return false;
        }
        let Ok(parsed) = PhcString::new(hash.as_str()) else {
            return true;
        };
        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }
        match Params::try_from(&parsed) {
            Ok(p) => {
                p.m_cost() != self.params.m_cost()
                    || p.t_cost() != self.params.t_cost()
                    || p.p_cost() != self.params.p_cost()
            }
            Err(_) => true,
        }
    }
}

impl CredentialVerifier for PasswordHasher {
    fn verify(&self, raw: &str, hash: &PasswordHash) -> bool {
        PasswordHasher::verify(self, raw, hash)
    }
}
