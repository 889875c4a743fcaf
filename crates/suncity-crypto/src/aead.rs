//! AES-256-GCM authenticated encryption with 128-bit IVs.
//!
//! Wallet envelopes are sealed with AES-256-GCM using a 16-byte random
//! IV (GHASH-derived counter block). IVs come from OS entropy and
//! **must never be reused** with the same key.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use rand::rngs::OsRng;
use rand::RngCore;
use suncity_types::{Result, SuncityError};

/// AES-256-GCM parameterized with a 16-byte nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Byte length of the IV.
pub const IV_LEN: usize = 16;

/// Byte length of the appended authentication tag.
pub const TAG_LEN: usize = 16;

/// Generates a fresh random 128-bit IV.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypts `plaintext` with AES-256-GCM.
///
/// The returned ciphertext has the 16-byte tag appended
/// (length = plaintext length + [`TAG_LEN`]).
///
/// # Errors
///
/// Returns [`SuncityError::CryptoError`] if the cipher rejects the input.
pub fn encrypt_aes256gcm(key: &[u8; 32], iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm16::new(GenericArray::from_slice(key));
    cipher
        .encrypt(GenericArray::from_slice(iv), plaintext)
        .map_err(|e| SuncityError::CryptoError {
            reason: format!("AES-256-GCM encryption failed: {e}"),
        })
}

/// Decrypts and authenticates `ciphertext` with AES-256-GCM.
///
/// # Errors
///
/// Returns [`SuncityError::CryptoError`] if tag verification fails
/// (wrong key, wrong IV or tampered ciphertext). Nothing is returned
/// on failure, not even a partial plaintext.
pub fn decrypt_aes256gcm(key: &[u8; 32], iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < TAG_LEN {
        return Err(SuncityError::CryptoError {
            reason: format!(
                "ciphertext too short: {} bytes, need at least {TAG_LEN}",
                ciphertext.len()
            ),
        });
    }

    let cipher = Aes256Gcm16::new(GenericArray::from_slice(key));
    cipher
        .decrypt(GenericArray::from_slice(iv), ciphertext)
        .map_err(|e| SuncityError::CryptoError {
            reason: format!("AES-256-GCM decryption failed: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() -> std::result::Result<(), SuncityError> {
        let key = [0x42u8; 32];
        let iv = generate_iv();
        let ct = encrypt_aes256gcm(&key, &iv, b"secret mnemonic")?;
        assert_eq!(ct.len(), b"secret mnemonic".len() + TAG_LEN);
        assert_eq!(decrypt_aes256gcm(&key, &iv, &ct)?, b"secret mnemonic");
        Ok(())
    }

    #[test]
    fn wrong_key_fails() -> std::result::Result<(), SuncityError> {
        let iv = [7u8; IV_LEN];
        let ct = encrypt_aes256gcm(&[1u8; 32], &iv, b"data")?;
        assert!(decrypt_aes256gcm(&[2u8; 32], &iv, &ct).is_err());
        Ok(())
    }

    #[test]
    fn tampered_ciphertext_fails() -> std::result::Result<(), SuncityError> {
        let key = [9u8; 32];
        let iv = [3u8; IV_LEN];
        let mut ct = encrypt_aes256gcm(&key, &iv, b"data")?;
        ct[0] ^= 0x01;
        assert!(decrypt_aes256gcm(&key, &iv, &ct).is_err());
        Ok(())
    }

    #[test]
    fn short_ciphertext_rejected() {
        assert!(decrypt_aes256gcm(&[0u8; 32], &[0u8; IV_LEN], &[0u8; 4]).is_err());
    }

    #[test]
    fn ivs_are_random() {
        assert_ne!(generate_iv(), generate_iv());
    }
}
