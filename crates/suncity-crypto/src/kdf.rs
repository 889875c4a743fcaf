//! PBKDF2-HMAC-SHA256 password key derivation for wallet envelopes.
//!
//! One PBKDF2 run yields 64 bytes: the first 32 are the AES-256 key,
//! the last 32 feed the stored password check (`SHA-256` of them). The
//! check therefore costs a full slow derivation to test offline, the
//! same as trying the key itself.

use hmac::Hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use suncity_types::{Result, SuncityError};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::hash::sha256;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Byte length of a freshly generated salt.
pub const SALT_LEN: usize = 16;

// ---------------------------------------------------------------------------
// DerivedKey
// ---------------------------------------------------------------------------

/// Output of [`derive_password_key`]. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    encryption_key: [u8; 32],
    verifier: [u8; 32],
}

impl DerivedKey {
    /// The 256-bit AES key.
    pub fn encryption_key(&self) -> &[u8; 32] {
        &self.encryption_key
    }

    /// Value persisted next to the ciphertext to reject wrong passwords
    /// before attempting decryption.
    pub fn password_check(&self) -> [u8; 32] {
        sha256(&self.verifier)
    }

    /// Compares `expected` with [`password_check`](Self::password_check)
    /// without early exit.
    pub fn matches_check(&self, expected: &[u8]) -> bool {
        let actual = self.password_check();
        if expected.len() != actual.len() {
            return false;
        }
        actual
            .iter()
            .zip(expected)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

// DerivedKey does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Generates a random 128-bit salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derives the envelope key material from `password` and `salt`.
///
/// # Errors
///
/// - [`SuncityError::InvalidParameter`] if `iterations` is zero or the
///   salt is empty.
/// - [`SuncityError::CryptoError`] if PBKDF2 fails.
pub fn derive_password_key(password: &[u8], salt: &[u8], iterations: u32) -> Result<DerivedKey> {
    if iterations == 0 {
        return Err(SuncityError::InvalidParameter {
            reason: "PBKDF2 iterations must be greater than 0".into(),
        });
    }
    if salt.is_empty() {
        return Err(SuncityError::InvalidParameter {
            reason: "PBKDF2 salt must not be empty".into(),
        });
    }

    let mut output = [0u8; 64];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, iterations, &mut output).map_err(|e| {
        SuncityError::CryptoError {
            reason: format!("PBKDF2-HMAC-SHA256 failed: {e}"),
        }
    })?;

    let mut key = DerivedKey {
        encryption_key: [0u8; 32],
        verifier: [0u8; 32],
    };
    key.encryption_key.copy_from_slice(&output[..32]);
    key.verifier.copy_from_slice(&output[32..]);
    output.zeroize();

    Ok(key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
