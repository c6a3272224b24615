//! Shared-password gate checked before any action runs

use constant_time_eq::constant_time_eq_32;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{LikecastError, Result};

/// Gate protecting the whole tool with one shared password
pub struct PasswordGate {
    expected: Option<Zeroizing<[u8; 32]>>,
}

impl PasswordGate {
    /// `None` leaves the gate open
    pub fn new(expected: Option<SecretString>) -> Self {
        Self {
            expected: expected.map(|password| digest(password.expose_secret())),
        }
    }

    pub fn is_open(&self) -> bool {
        self.expected.is_none()
    }

    /// Check an attempt against the expected password
    ///
    /// Digests are compared in constant time.
    pub fn check(&self, attempt: Option<&str>) -> Result<()> {
        let Some(expected) = &self.expected else {
            return Ok(());
        };

        let Some(attempt) = attempt else {
            return Err(LikecastError::Gate("Password required".to_string()));
        };

        let actual = digest(attempt);

        if constant_time_eq_32(expected, &actual) {
            tracing::debug!("Password gate passed");
            Ok(())
        } else {
            tracing::warn!("Password gate rejected an attempt");
            Err(LikecastError::Gate("Password incorrect".to_string()))
        }
    }
}

fn digest(value: &str) -> Zeroizing<[u8; 32]> {
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&Sha256::digest(value.as_bytes()));
    out
}
