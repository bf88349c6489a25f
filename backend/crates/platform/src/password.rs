//! Credential Hashing and Verification
//!
//! Argon2id wrapper for password storage:
//! - Memory-hard hashing (OWASP recommended parameters)
//! - Work factor selected per runtime environment
//! - Zeroization of plaintext buffers
//! - Constant-time comparison via the algorithm's own verify
//!
//! Verification honors the parameters embedded in the PHC digest, so
//! digests produced under one work factor verify under any hasher.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::Zeroizing;

/// Hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

/// Cost profile for the adaptive hash
///
/// Production pays the full OWASP-recommended cost; development trades
/// strength for fast local iteration and test runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkFactor {
    /// m=19456 KiB, t=2, p=1 (OWASP minimum for Argon2id)
    #[default]
    Production,
    /// m=8192 KiB, t=1, p=1
    Development,
}

impl WorkFactor {
    fn params(&self) -> Params {
        let (m_cost, t_cost) = match self {
            WorkFactor::Production => (19456, 2),
            WorkFactor::Development => (8192, 1),
        };
        // Params::new only fails on out-of-range values; both profiles are
        // within Argon2's documented bounds.
        Params::new(m_cost, t_cost, 1, None).unwrap_or_default()
    }
}

/// Adaptive one-way hasher for stored credentials
///
/// ## Examples
/// ```rust
/// use platform::password::{CredentialHasher, WorkFactor};
///
/// let hasher = CredentialHasher::new(WorkFactor::Development);
/// let digest = hasher.hash("correct horse battery staple").unwrap();
/// assert!(hasher.verify("correct horse battery staple", &digest));
/// assert!(!hasher.verify("wrong password", &digest));
/// ```
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Create a hasher with the given work factor
    pub fn new(work_factor: WorkFactor) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, argon2::Version::V0x13, work_factor.params()),
        }
    }

    /// Hash a plaintext credential into a PHC-format digest
    ///
    /// A fresh random 128-bit salt is generated per call, so hashing the
    /// same plaintext twice yields different digests.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        let buf = Zeroizing::new(plaintext.as_bytes().to_vec());
        let salt = SaltString::generate(OsRng);

        self.argon2
            .hash_password(&buf, &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))
    }

    /// Verify a plaintext credential against a stored digest
    ///
    /// Returns `false` (never errors) for malformed digests. The comparison
    /// is the algorithm's constant-time verify; parameters come from the
    /// digest itself.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(h) => h,
            Err(_) => return false,
        };

        let buf = Zeroizing::new(plaintext.as_bytes().to_vec());
        Argon2::default().verify_password(&buf, &parsed).is_ok()
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(WorkFactor::default())
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_hasher() -> CredentialHasher {
        CredentialHasher::new(WorkFactor::Development)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = dev_hasher();
        let digest = hasher.hash("TestPassword123!").unwrap();

        assert!(hasher.verify("TestPassword123!", &digest));
        assert!(!hasher.verify("WrongPassword123!", &digest));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = dev_hasher();
        let a = hasher.hash("same input").unwrap();
        let b = hasher.hash("same input").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same input", &a));
        assert!(hasher.verify("same input", &b));
    }

    #[test]
    fn test_verify_malformed_digest_is_false() {
        let hasher = dev_hasher();
        assert!(!hasher.verify("anything", "not_a_phc_string"));
        assert!(!hasher.verify("anything", ""));
        assert!(!hasher.verify("anything", "$argon2id$v=19$garbage"));
    }

    #[test]
    fn test_work_factors_interoperate() {
        // A digest from one profile verifies under a hasher built with the
        // other, because params live in the digest.
        let dev = CredentialHasher::new(WorkFactor::Development);
        let prod = CredentialHasher::new(WorkFactor::Production);

        let digest = dev.hash("shared secret").unwrap();
        assert!(prod.verify("shared secret", &digest));
    }

    #[test]
    fn test_unicode_plaintext() {
        let hasher = dev_hasher();
        let digest = hasher.hash("パスワード安全です!").unwrap();
        assert!(hasher.verify("パスワード安全です!", &digest));
        assert!(!hasher.verify("パスワード安全です", &digest));
    }

    #[test]
    fn test_debug_does_not_leak() {
        let out = format!("{:?}", dev_hasher());
        assert!(out.starts_with("CredentialHasher"));
    }
}
