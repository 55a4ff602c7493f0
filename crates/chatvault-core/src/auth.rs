//! Shared-secret access gateway.
//!
//! The configured key is hashed once at construction. Presented keys are
//! hashed the same way and compared with [`subtle::ConstantTimeEq`], so the
//! comparison time depends on neither the matching prefix nor the length of
//! the presented key.

use chatvault_types::error::AuthError;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Verifies the single service-wide API key.
pub struct ApiKeyGate {
    expected_hash: [u8; 32],
}

impl ApiKeyGate {
    pub fn new(api_key: &SecretString) -> Self {
        Self {
            expected_hash: hash_key(api_key.expose_secret()),
        }
    }

    /// Check a presented credential. `None` means the caller sent none.
    pub fn verify(&self, presented: Option<&str>) -> Result<(), AuthError> {
        let presented = presented.ok_or(AuthError::Missing)?;
        let provided_hash = hash_key(presented);
        if bool::from(self.expected_hash[..].ct_eq(&provided_hash[..])) {
            Ok(())
        } else {
            Err(AuthError::Invalid)
        }
    }
}

impl std::fmt::Debug for ApiKeyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyGate").finish_non_exhaustive()
    }
}

fn hash_key(key: &str) -> [u8; 32] {
    let digest = Sha256::digest(key.as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
