//! Core shared types for the Suncity wallet core.
//!
//! This crate defines the error taxonomy, the bech32 [`Address`] newtype
//! and the chain / wallet configuration shared by every other crate in
//! the workspace. It has no cryptographic dependencies of its own.

pub mod config;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A bech32 account address such as `sunc1...`.
///
/// Instances are produced by the address codec in `suncity-crypto`, which
/// is the only component able to check the checksum and prefix. This type
/// only carries the already-validated lowercase string.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wraps an address string that has already passed codec validation.
    pub fn new_unchecked(encoded: String) -> Self {
        Self(encoded)
    }

    /// Returns the encoded address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the address, returning the encoded string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Error sub-kinds
// ---------------------------------------------------------------------------

/// Reasons a word sequence fails to decode as a mnemonic.
#[derive(Clone, Debug, Error, Eq, PartialEq, Serialize, Deserialize)]
pub enum MnemonicError {
    /// A word is not part of the 2048-word dictionary.
    #[error("word '{word}' at position {position} is not in the wordlist")]
    InvalidWord {
        /// The offending word (normalized).
        word: String,
        /// Zero-based position of the word in the sequence.
        position: usize,
    },

    /// The sequence length is not one of 12, 15, 18, 21 or 24.
    #[error("invalid word count: {count} (expected 12, 15, 18, 21 or 24)")]
    InvalidWordCount {
        /// Number of words that were supplied.
        count: usize,
    },

    /// The embedded checksum bits disagree with SHA-256 of the entropy.
    #[error("mnemonic checksum mismatch")]
    InvalidChecksum,

    /// A word appears more than once while the strict policy is enabled.
    #[error("duplicate word '{word}' is not allowed")]
    DuplicateWord {
        /// The repeated word.
        word: String,
    },
}

/// Structural failures of a bech32 string.
#[derive(Clone, Debug, Error, Eq, PartialEq, Serialize, Deserialize)]
pub enum Bech32Error {
    /// The six trailing checksum symbols do not verify.
    #[error("bech32 checksum mismatch")]
    InvalidChecksum,

    /// A character outside the bech32 alphabet (or a non-printable prefix
    /// character) was found.
    #[error("invalid bech32 character '{ch}'")]
    InvalidCharset {
        /// The offending character.
        ch: char,
    },

    /// Total length is outside the accepted bounds.
    #[error("invalid bech32 length {len} (expected {min}..={max})")]
    InvalidLength {
        /// Observed length.
        len: usize,
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// Upper- and lowercase characters are mixed.
    #[error("bech32 string mixes upper and lower case")]
    MixedCase,

    /// No `1` separator, or nothing on one side of it.
    #[error("missing bech32 separator")]
    MissingSeparator,

    /// The human-readable prefix is not the one expected.
    #[error("unexpected prefix '{found}' (expected '{expected}')")]
    InvalidPrefix {
        /// Prefix required by the codec.
        expected: String,
        /// Prefix found in the string.
        found: String,
    },

    /// Non-zero or over-long padding when regrouping 5-bit symbols.
    #[error("invalid bech32 padding")]
    InvalidPadding,
}

// ---------------------------------------------------------------------------
// SuncityError
// ---------------------------------------------------------------------------

/// Unified error type for the Suncity wallet core.
#[derive(Debug, Error)]
pub enum SuncityError {
    /// A caller-supplied option is outside its allowed domain
    /// (e.g. an unsupported entropy strength).
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Human-readable description of the bad parameter.
        reason: String,
    },

    /// Mnemonic decoding failed.
    #[error("invalid mnemonic: {0}")]
    Mnemonic(#[from] MnemonicError),

    /// Private key scalar is zero, not below the curve order, or has the
    /// wrong length.
    #[error("invalid private key: {reason}")]
    InvalidPrivateKey {
        /// Human-readable description of the failure.
        reason: String,
    },

    /// Public key bytes are malformed or the point is not on the curve.
    #[error("invalid public key: {reason}")]
    InvalidPublicKey {
        /// Human-readable description of the failure.
        reason: String,
    },

    /// A DER signature or (r, s) pair could not be parsed.
    #[error("invalid signature: {reason}")]
    InvalidSignature {
        /// Human-readable description of the failure.
        reason: String,
    },

    /// The deterministic nonce loop exhausted its retry budget.
    #[error("signing failed after {attempts} nonce attempts")]
    SigningFailure {
        /// Number of attempts made.
        attempts: u32,
    },

    /// Wrong password or tampered ciphertext. The two cases are
    /// deliberately indistinguishable.
    #[error("invalid password")]
    InvalidPassword,

    /// Bech32 structural or checksum failure.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] Bech32Error),

    /// A transaction failed field validation before signing.
    #[error("invalid transaction: {reason}")]
    InvalidTransaction {
        /// Human-readable description of the failure.
        reason: String,
    },

    /// An operation needs an unlocked session.
    #[error("wallet is locked")]
    WalletLocked,

    /// The unlocked session outlived its timeout and was discarded.
    #[error("wallet session expired")]
    SessionExpired,

    /// No wallet envelope has been persisted yet.
    #[error("no wallet found")]
    WalletNotFound,

    /// A wallet envelope already exists and would be overwritten.
    #[error("a wallet already exists")]
    WalletExists,

    /// A low-level cryptographic primitive failed.
    #[error("crypto error: {reason}")]
    CryptoError {
        /// Human-readable description of the cryptographic failure.
        reason: String,
    },

    /// Reading or writing the persisted envelope failed.
    #[error("storage error: {reason}")]
    StorageError {
        /// Human-readable description of the storage failure.
        reason: String,
    },

    /// JSON or CBOR (de)serialization failed.
    #[error("serialization error: {reason}")]
    SerializationError {
        /// Human-readable description of the failure.
        reason: String,
    },

    /// A configuration value is invalid or missing.
    #[error("config error: {reason}")]
    ConfigError {
        /// Human-readable description of the configuration problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

/// Convenience result type using [`SuncityError`].
pub type Result<T> = std::result::Result<T, SuncityError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
