//! Password-sealed wallet envelope.
//!
//! # Format (v1)
//!
//! ```json
//! {
//!   "version": 1,
//!   "encrypted": {
//!     "ciphertext": "<hex, AES-256-GCM output incl. 16-byte tag>",
//!     "iv": "<hex 16 bytes>",
//!     "salt": "<hex 16 bytes>",
//!     "passwordCheck": "<hex 32 bytes>",
//!     "iterations": 100000
//!   },
//!   "publicKey": "<hex 33 bytes, compressed>",
//!   "address": "sunc1...",
//!   "createdAt": "2026-10-16T09:30:00Z",
//!   "imported": false
//! }
//! ```
//!
//! The ciphertext holds the JSON of a [`WalletSecret`]
//! (`{"mnemonic": ..., "privateKey": ...}`). Wrong passwords and
//! tampered ciphertexts both surface as
//! [`SuncityError::InvalidPassword`]. No plaintext secret material is
//! written to disk.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use suncity_crypto::aead::{decrypt_aes256gcm, encrypt_aes256gcm, generate_iv, IV_LEN};
use suncity_crypto::kdf::{derive_password_key, generate_salt};
use suncity_types::{Address, Result, SuncityError};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Current envelope format version.
pub const ENVELOPE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Plaintext
// ---------------------------------------------------------------------------

/// The secret half of a wallet. Zeroized on drop.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct WalletSecret {
    mnemonic: String,
    /// Hex of the 32-byte private key.
    private_key: String,
}

impl WalletSecret {
    pub fn new(mnemonic: &str, private_key: &[u8; 32]) -> Self {
        Self {
            mnemonic: mnemonic.to_string(),
            private_key: hex::encode(private_key),
        }
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Decodes the stored private key.
    pub fn private_key_bytes(&self) -> Result<[u8; 32]> {
        let mut bytes = hex::decode(&self.private_key).map_err(|_| SuncityError::InvalidPrivateKey {
            reason: "stored private key is not hex".into(),
        })?;
        let result = <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| SuncityError::InvalidPrivateKey {
            reason: format!("stored private key is {} bytes, expected 32", bytes.len()),
        });
        bytes.zeroize();
        result
    }
}

// WalletSecret does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Sealed payload
// ---------------------------------------------------------------------------

/// Ciphertext and the parameters needed to reopen it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPayload {
    pub ciphertext: String,
    pub iv: String,
    pub salt: String,
    pub password_check: String,
    pub iterations: u32,
}

/// The persisted wallet record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedWallet {
    pub version: u32,
    pub encrypted: EncryptedPayload,
    /// Compressed public key, hex.
    pub public_key: String,
    pub address: Address,
    pub created_at: DateTime<Utc>,
    /// Whether the mnemonic was imported rather than generated here.
    #[serde(default)]
    pub imported: bool,
}

impl EncryptedWallet {
    /// Checks the version and the shape of every hex field.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::StorageError`] naming the first bad field.
    pub fn check_format(&self) -> Result<()> {
        if self.version != ENVELOPE_VERSION {
            return Err(SuncityError::StorageError {
                reason: format!(
                    "unsupported wallet version {} (expected {ENVELOPE_VERSION})",
                    self.version
                ),
            });
        }
        let payload = &self.encrypted;
        hex_field(&payload.ciphertext, "ciphertext")?;
        hex_fixed::<IV_LEN>(&payload.iv, "iv")?;
        hex_field(&payload.salt, "salt")?;
        hex_fixed::<32>(&payload.password_check, "passwordCheck")?;
        hex_fixed::<33>(&self.public_key, "publicKey")?;
        if payload.iterations == 0 {
            return Err(SuncityError::StorageError {
                reason: "iterations must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Seal / open
// ---------------------------------------------------------------------------

/// Serializes `plaintext` to JSON and seals it under `password`.
///
/// # Process
///
/// 1. Fresh 16-byte salt and 16-byte IV.
/// 2. PBKDF2-HMAC-SHA256(password, salt, iterations) → key + check.
/// 3. AES-256-GCM over the JSON bytes.
pub fn seal<T: Serialize>(plaintext: &T, password: &str, iterations: u32) -> Result<EncryptedPayload> {
    let salt = generate_salt();
    let iv = generate_iv();
    let key = derive_password_key(password.as_bytes(), &salt, iterations)?;

    let mut json = serde_json::to_vec(plaintext).map_err(|e| SuncityError::SerializationError {
        reason: format!("failed to serialize wallet secret: {e}"),
    })?;
    let ciphertext = encrypt_aes256gcm(key.encryption_key(), &iv, &json);
    json.zeroize();

    Ok(EncryptedPayload {
        ciphertext: hex::encode(ciphertext?),
        iv: hex::encode(iv),
        salt: hex::encode(salt),
        password_check: hex::encode(key.password_check()),
        iterations,
    })
}

/// Reopens a payload sealed by [`seal`].
///
/// # Errors
///
/// - [`SuncityError::InvalidPassword`] for a wrong password, a tampered
///   ciphertext, or a plaintext that does not parse as `T`.
/// - [`SuncityError::StorageError`] if a stored field is malformed.
pub fn open<T: DeserializeOwned>(payload: &EncryptedPayload, password: &str) -> Result<T> {
    let salt = hex_field(&payload.salt, "salt")?;
    let iv = hex_fixed::<IV_LEN>(&payload.iv, "iv")?;
    let check = hex_fixed::<32>(&payload.password_check, "passwordCheck")?;
    let ciphertext = hex_field(&payload.ciphertext, "ciphertext")?;

    let key = derive_password_key(password.as_bytes(), &salt, payload.iterations)?;
    if !key.matches_check(&check) {
        warn!("password check failed");
        return Err(SuncityError::InvalidPassword);
    }

    let mut plaintext = decrypt_aes256gcm(key.encryption_key(), &iv, &ciphertext).map_err(|_| {
        warn!("envelope authentication failed");
        SuncityError::InvalidPassword
    })?;
    let parsed = serde_json::from_slice(&plaintext).map_err(|_| SuncityError::InvalidPassword);
    plaintext.zeroize();
    parsed
}

/// Runs the slow password check alone, without decrypting.
pub fn verify_password(payload: &EncryptedPayload, password: &str) -> Result<bool> {
    let salt = hex_field(&payload.salt, "salt")?;
    let check = hex_fixed::<32>(&payload.password_check, "passwordCheck")?;
    let key = derive_password_key(password.as_bytes(), &salt, payload.iterations)?;
    Ok(key.matches_check(&check))
}

// ---------------------------------------------------------------------------
// Hex helpers
// ---------------------------------------------------------------------------

fn hex_field(value: &str, field: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(value).map_err(|e| SuncityError::StorageError {
        reason: format!("invalid {field} hex: {e}"),
    })?;
    if bytes.is_empty() {
        return Err(SuncityError::StorageError {
            reason: format!("{field} must not be empty"),
        });
    }
    Ok(bytes)
}

fn hex_fixed<const N: usize>(value: &str, field: &str) -> Result<[u8; N]> {
    let bytes = hex_field(value, field)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| SuncityError::StorageError {
        reason: format!("{field} must be {N} bytes, got {}", bytes.len()),
    })
}
