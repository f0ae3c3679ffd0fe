/// Credential hashing and verification using Argon2id
///
/// Hashes are stored in PHC string format, which embeds the algorithm,
/// parameters and a 16-byte random salt. Verification reads the parameters
/// back from the stored hash, so changing [`PasswordConfig`] never
/// invalidates existing credentials.
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Password hashing and verification errors
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Memory cost in KB (default: 65536 = 64 MB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 3)
    pub time_cost: u32,
    /// Parallelism (lanes, default: 4)
    pub parallelism: u32,
    /// Output length in bytes (default: 32)
    pub output_len: Option<usize>,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MB
            time_cost: 3,
            parallelism: 4,
            output_len: Some(32),
        }
    }
}

impl PasswordConfig {
    /// Cheap parameters for tests and local tooling
    pub fn light() -> Self {
        Self {
            memory_cost: 8192,
            time_cost: 1,
            parallelism: 1,
            output_len: Some(32),
        }
    }

    fn to_params(&self) -> Result<Params, PasswordError> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            self.output_len,
        )
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }
}

/// One-way credential hasher
#[derive(Debug, Clone, Default)]
pub struct CredentialHasher {
    config: PasswordConfig,
}

impl CredentialHasher {
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PasswordConfig {
        &self.config
    }

    /// Hash a plaintext password into a PHC string
    ///
    /// Hashing the same input twice yields different strings because the
    /// salt is random; both verify against the original input.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = self.config.to_params()?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(password_hash.to_string())
    }

    /// Check a plaintext password against a stored hash
    ///
    /// Returns `Ok(false)` on mismatch. A string that is not a PHC hash is
    /// an error, never a match.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(PasswordConfig::light())
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hasher = hasher();
        let hash = hasher.hash("helloworld").expect("Failed to hash password");

        assert!(hasher.verify("helloworld", &hash).expect("Verification failed"));
        assert!(!hasher.verify("wrongpass", &hash).expect("Verification failed"));
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = hasher().hash("helloworld").unwrap();

        assert_ne!(hash, "helloworld");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_same_password_produces_different_hashes() {
        let hasher = hasher();

        let hash1 = hasher.hash("SamePassword123").unwrap();
        let hash2 = hasher.hash("SamePassword123").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("SamePassword123", &hash1).unwrap());
        assert!(hasher.verify("SamePassword123", &hash2).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = hasher().verify("password", "invalid-hash-format");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_plaintext_stored_value_never_matches() {
        let result = hasher().verify("helloworld", "helloworld");
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_config_is_encoded_in_hash() {
        let config = PasswordConfig {
            memory_cost: 16384,
            time_cost: 2,
            parallelism: 2,
            output_len: Some(32),
        };
        let hash = CredentialHasher::new(config).hash("TestPassword123").unwrap();

        assert!(hash.contains("m=16384"));
        assert!(hash.contains("t=2"));
        assert!(hash.contains("p=2"));

        // Verification uses the parameters stored in the hash
        assert!(hasher().verify("TestPassword123", &hash).unwrap());
    }

    #[test]
    fn test_invalid_params_fail_hashing() {
        let config = PasswordConfig {
            memory_cost: 1,
            ..PasswordConfig::light()
        };
        let result = CredentialHasher::new(config).hash("helloworld");
        assert!(matches!(result, Err(PasswordError::HashingFailed(_))));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(8))]

            #[test]
            fn hash_verifies_only_its_own_plaintext(
                password in "[ -~]{1,32}",
                other in "[ -~]{1,32}",
            ) {
                let hasher = hasher();
                let hash = hasher.hash(&password).unwrap();

                prop_assert_ne!(&hash, &password);
                prop_assert!(hasher.verify(&password, &hash).unwrap());
                prop_assert_eq!(hasher.verify(&other, &hash).unwrap(), other == password);
            }
        }
    }
}
