//! Cryptographic primitives for the Suncity wallet core.
//!
//! This crate is the only place in the workspace that touches key
//! material directly. Higher layers (`suncity-tx`, `suncity-wallet`)
//! call into it through typed values and never handle raw curve math.
//!
//! # Modules
//!
//! - [`mnemonic`]: BIP-39 entropy, phrases, validation and seeds
//! - [`wordlist`]: the 2048-word English dictionary
//! - [`secp256k1`]: curve arithmetic, keys, deterministic ECDSA, recovery
//! - [`hd`]: BIP-32 derivation along `m/44'/118'/0'/0/0`
//! - [`bech32`]: checksummed base-32 codec
//! - [`address`]: chain-prefixed account addresses
//! - [`kdf`]: PBKDF2-HMAC-SHA256 password key and password check
//! - [`aead`]: AES-256-GCM sealing of wallet secrets
//! - [`hash`]: SHA-256, HASH160 and HMAC helpers

pub mod address;
pub mod aead;
pub mod bech32;
pub mod hash;
pub mod hd;
pub mod kdf;
pub mod mnemonic;
pub mod secp256k1;
pub mod wordlist;
