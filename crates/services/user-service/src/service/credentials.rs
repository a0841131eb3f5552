//! Credential service - random password issuance and digests.
//!
//! Hashing itself lives in the domain `Password` value object; this trait
//! is the seam the user and auth services are injected with.

use common::AppResult;
use domain::Password;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait CredentialService: Send + Sync {
    /// Fresh alphanumeric password of the fixed generated length
    fn generate_random_password(&self) -> String;

    /// One-way digest of the plaintext, suitable for storage
    fn digest(&self, plaintext: &str) -> AppResult<String>;

    /// Check a plaintext against a stored digest
    fn verify(&self, plaintext: &str, digest: &str) -> bool;

    /// Whether a stored digest predates the current scheme
    fn needs_rehash(&self, digest: &str) -> bool;

    /// Spend the cost of a verification when there is no stored digest,
    /// so unknown emails take as long as wrong passwords.
    fn verify_dummy(&self, plaintext: &str);
}

/// Argon2id-backed credential service.
pub struct CredentialManager {
    dummy: Password,
}

impl CredentialManager {
    pub fn new() -> AppResult<Self> {
        let dummy = Password::new(&domain::generate_random_password())?;
        Ok(Self { dummy })
    }
}

impl CredentialService for CredentialManager {
    fn generate_random_password(&self) -> String {
        domain::generate_random_password()
    }

    fn digest(&self, plaintext: &str) -> AppResult<String> {
        Ok(Password::new(plaintext)?.into_string())
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        Password::from_hash(digest).verify(plaintext)
    }

    fn needs_rehash(&self, digest: &str) -> bool {
        Password::from_hash(digest).is_legacy()
    }

    fn verify_dummy(&self, plaintext: &str) {
        let _ = self.dummy.verify(plaintext);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{legacy_digest, GENERATED_PASSWORD_LENGTH};

    #[test]
    fn test_generated_password_shape() {
        let service = CredentialManager::new().unwrap();
        let password = service.generate_random_password();
        assert_eq!(password.len(), GENERATED_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_digest_verifies_and_differs_from_input() {
        let service = CredentialManager::new().unwrap();
        let digest = service.digest("hunter2").unwrap();

        assert_ne!(digest, "hunter2");
        assert!(service.verify("hunter2", &digest));
        assert!(!service.verify("hunter3", &digest));
        assert!(!service.needs_rehash(&digest));
    }

    #[test]
    fn test_legacy_digest_needs_rehash() {
        let service = CredentialManager::new().unwrap();
        let digest = legacy_digest("hunter2");

        assert!(service.verify("hunter2", &digest));
        assert!(service.needs_rehash(&digest));
    }

    #[test]
    fn test_empty_plaintext_rejected() {
        let service = CredentialManager::new().unwrap();
        assert!(service.digest("").is_err());
    }
}
