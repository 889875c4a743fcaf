//! BIP39 entropy, mnemonic encoding/decoding and seed derivation.
//!
//! Supports every BIP39 strength:
//!
//! | entropy bits | checksum bits | words |
//! |--------------|---------------|-------|
//! | 128          | 4             | 12    |
//! | 160          | 5             | 15    |
//! | 192          | 6             | 18    |
//! | 224          | 7             | 21    |
//! | 256          | 8             | 24    |
//!
//! 1. **Generation**: entropy from the OS CSPRNG → SHA-256 checksum
//!    (`ENT / 32` bits) → `ENT + CS` bits split into 11-bit indices.
//! 2. **Decoding**: words → indices → bits, recompute and compare the
//!    checksum. Failures are reported as typed [`MnemonicError`]s.
//! 3. **Seed derivation**: PBKDF2-HMAC-SHA512, 2048 rounds,
//!    salt = `"mnemonic" + passphrase`, both NFKD-normalized.
//!
//! Reference: <https://github.com/bitcoin/bips/blob/master/bip-0039.mediawiki>

use hmac::Hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};
use suncity_types::{MnemonicError, Result, SuncityError};
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::wordlist::{index_to_word, word_to_index, words_with_prefix};

/// Entropy strengths accepted by [`generate_entropy`], in bits.
pub const SUPPORTED_STRENGTHS: [u32; 5] = [128, 160, 192, 224, 256];

/// PBKDF2 rounds fixed by BIP39.
const SEED_ROUNDS: u32 = 2048;

/// Default number of entries returned by [`suggest_words`] callers.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Entropy
// ---------------------------------------------------------------------------

/// Raw mnemonic entropy (16 to 32 bytes). Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Entropy(Vec<u8>);

impl Entropy {
    /// Returns the entropy bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Entropy size in bits.
    pub fn bits(&self) -> u32 {
        (self.0.len() * 8) as u32
    }
}

// ---------------------------------------------------------------------------
// Mnemonic
// ---------------------------------------------------------------------------

/// A checksummed BIP39 phrase in normalized form (lowercase, single
/// spaces). Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic(String);

impl Mnemonic {
    /// Normalizes and fully validates `phrase` under `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::Mnemonic`] describing the first failure.
    pub fn parse(phrase: &str, policy: MnemonicPolicy) -> Result<Self> {
        let normalized = normalize_mnemonic(phrase);
        // Decoding performs every structural and checksum check.
        mnemonic_to_entropy_with_policy(&normalized, policy)?;
        Ok(Self(normalized))
    }

    /// Returns the mnemonic phrase as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the individual words.
    pub fn words(&self) -> Vec<&str> {
        self.0.split_whitespace().collect()
    }

    /// Returns the number of words in the mnemonic.
    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

// Mnemonic does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// A 64-byte seed derived from a mnemonic via PBKDF2-HMAC-SHA512.
///
/// Input to BIP32 key derivation; never persisted. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 64]);

impl Seed {
    /// Fixed byte length of a BIP39 seed.
    pub const LEN: usize = 64;

    /// Creates a [`Seed`] from a raw 64-byte array (test vectors).
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 64-byte seed.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Policy / reports
// ---------------------------------------------------------------------------

/// Extra decoding rules layered over standard BIP39.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MnemonicPolicy {
    /// Reject phrases in which any word appears more than once.
    pub reject_duplicates: bool,
}

impl MnemonicPolicy {
    /// Policy that forbids repeated words.
    pub fn strict() -> Self {
        Self {
            reject_duplicates: true,
        }
    }
}

/// Output of [`mnemonic_to_entropy`]: the entropy plus the trailing
/// checksum bits (right-aligned).
pub struct DecodedMnemonic {
    pub entropy: Entropy,
    pub checksum: u8,
}

/// Result of [`validate_mnemonic`]. Never an error.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MnemonicValidation {
    pub valid: bool,
    pub word_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MnemonicError>,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generates `strength_bits / 8` bytes of entropy from the OS CSPRNG.
///
/// # Errors
///
/// Returns [`SuncityError::InvalidParameter`] unless `strength_bits` is
/// one of [`SUPPORTED_STRENGTHS`].
pub fn generate_entropy(strength_bits: u32) -> Result<Entropy> {
    if !SUPPORTED_STRENGTHS.contains(&strength_bits) {
        return Err(SuncityError::InvalidParameter {
            reason: format!(
                "entropy strength {strength_bits} must be one of 128, 160, 192, 224, 256"
            ),
        });
    }

    let mut bytes = vec![0u8; (strength_bits / 8) as usize];
    OsRng.fill_bytes(&mut bytes);
    Ok(Entropy(bytes))
}

/// Generates a fresh mnemonic of the given strength.
pub fn generate_mnemonic(strength_bits: u32) -> Result<Mnemonic> {
    let entropy = generate_entropy(strength_bits)?;
    entropy_to_mnemonic(entropy.as_bytes())
}

/// Encodes raw entropy as a BIP39 mnemonic.
///
/// # Process
///
/// 1. `CS = ENT / 32` checksum bits taken from the top of `SHA-256(entropy)`.
/// 2. Concatenate entropy bits and checksum bits, MSB first.
/// 3. Split into 11-bit groups; each group indexes the wordlist.
///
/// # Errors
///
/// Returns [`SuncityError::InvalidParameter`] if `entropy` is not 16, 20,
/// 24, 28 or 32 bytes long.
pub fn entropy_to_mnemonic(entropy: &[u8]) -> Result<Mnemonic> {
    let ent_bits = entropy.len() * 8;
    if !SUPPORTED_STRENGTHS.contains(&(ent_bits as u32)) {
        return Err(SuncityError::InvalidParameter {
            reason: format!(
                "entropy must be 16, 20, 24, 28 or 32 bytes, got {}",
                entropy.len()
            ),
        });
    }
    let cs_bits = ent_bits / 32;
    let word_count = (ent_bits + cs_bits) / 11;

    // Step 1: checksum bits, right-aligned in one byte.
    let checksum = Sha256::digest(entropy)[0] >> (8 - cs_bits);

    // Step 2: bit sequence.
    let mut bits = Vec::with_capacity(ent_bits + cs_bits);
    for byte in entropy {
        for j in (0..8).rev() {
            bits.push((byte >> j) & 1);
        }
    }
    for j in (0..cs_bits).rev() {
        bits.push((checksum >> j) & 1);
    }

    // Step 3: 11-bit groups → words.
    let mut words = Vec::with_capacity(word_count);
    for chunk in bits.chunks_exact(11) {
        let idx = chunk
            .iter()
            .fold(0u16, |acc, bit| (acc << 1) | u16::from(*bit));
        let word = index_to_word(idx).ok_or_else(|| SuncityError::CryptoError {
            reason: format!("BIP39 word index {idx} out of range"),
        })?;
        words.push(word);
    }

    bits.zeroize();
    Ok(Mnemonic(words.join(" ")))
}

// ---------------------------------------------------------------------------
// Decoding / validation
// ---------------------------------------------------------------------------

/// Decodes a mnemonic under the default (canonical BIP39) policy.
pub fn mnemonic_to_entropy(mnemonic: &str) -> Result<DecodedMnemonic> {
    mnemonic_to_entropy_with_policy(mnemonic, MnemonicPolicy::default())
}

/// Decodes a mnemonic back into its entropy and checksum.
///
/// Input is normalized with [`normalize_mnemonic`] first.
///
/// # Checks performed (in order)
///
/// 1. Word count is 12, 15, 18, 21 or 24.
/// 2. Every word is in the wordlist.
/// 3. No repeated word, if `policy.reject_duplicates`.
/// 4. The embedded checksum matches `SHA-256(entropy)`.
///
/// # Errors
///
/// Returns [`SuncityError::Mnemonic`] with the matching [`MnemonicError`].
pub fn mnemonic_to_entropy_with_policy(
    mnemonic: &str,
    policy: MnemonicPolicy,
) -> Result<DecodedMnemonic> {
    let mut normalized = normalize_mnemonic(mnemonic);
    let result = decode_normalized(&normalized, policy);
    normalized.zeroize();
    result
}

fn decode_normalized(normalized: &str, policy: MnemonicPolicy) -> Result<DecodedMnemonic> {
    let words: Vec<&str> = normalized.split_whitespace().collect();

    // Check 1: word count.
    let strength = strength_for_word_count(words.len()).ok_or(MnemonicError::InvalidWordCount {
        count: words.len(),
    })?;
    let ent_bits = strength as usize;
    let cs_bits = ent_bits / 32;

    // Check 2: dictionary membership.
    let mut indices = Vec::with_capacity(words.len());
    for (position, word) in words.iter().enumerate() {
        let idx = word_to_index(word).ok_or_else(|| MnemonicError::InvalidWord {
            word: (*word).to_string(),
            position,
        })?;
        indices.push(idx);
    }

    // Check 3: optional duplicate rule.
    if policy.reject_duplicates {
        let mut seen = [false; 2048];
        for (idx, word) in indices.iter().zip(&words) {
            let slot = &mut seen[usize::from(*idx)];
            if *slot {
                indices.zeroize();
                return Err(MnemonicError::DuplicateWord {
                    word: (*word).to_string(),
                }
                .into());
            }
            *slot = true;
        }
    }

    // Rebuild entropy and the provided checksum from 11-bit indices.
    let mut bits = Vec::with_capacity(words.len() * 11);
    for idx in &indices {
        for j in (0..11).rev() {
            bits.push(((idx >> j) & 1) as u8);
        }
    }
    indices.zeroize();

    let mut entropy = vec![0u8; ent_bits / 8];
    for (i, bit) in bits[..ent_bits].iter().enumerate() {
        if *bit == 1 {
            entropy[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    let provided = bits[ent_bits..]
        .iter()
        .fold(0u8, |acc, bit| (acc << 1) | bit);
    bits.zeroize();

    // Check 4: checksum.
    let expected = Sha256::digest(&entropy)[0] >> (8 - cs_bits);
    if provided != expected {
        entropy.zeroize();
        return Err(MnemonicError::InvalidChecksum.into());
    }

    Ok(DecodedMnemonic {
        entropy: Entropy(entropy),
        checksum: provided,
    })
}

/// Validates a mnemonic under the default policy, reporting the reason
/// for any failure instead of returning an error.
pub fn validate_mnemonic(mnemonic: &str) -> MnemonicValidation {
    validate_mnemonic_with_policy(mnemonic, MnemonicPolicy::default())
}

/// Like [`validate_mnemonic`] with an explicit policy.
pub fn validate_mnemonic_with_policy(mnemonic: &str, policy: MnemonicPolicy) -> MnemonicValidation {
    let word_count = mnemonic.split_whitespace().count();
    match mnemonic_to_entropy_with_policy(mnemonic, policy) {
        Ok(_) => MnemonicValidation {
            valid: true,
            word_count,
            error: None,
        },
        Err(SuncityError::Mnemonic(e)) => MnemonicValidation {
            valid: false,
            word_count,
            error: Some(e),
        },
        // Decoding only produces mnemonic errors; anything else would be a
        // checksum-level failure of the input.
        Err(_) => MnemonicValidation {
            valid: false,
            word_count,
            error: Some(MnemonicError::InvalidChecksum),
        },
    }
}

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// Derives the 64-byte BIP39 seed.
///
/// - **Password**: `NFKD(mnemonic)`.
/// - **Salt**: `NFKD("mnemonic" + passphrase)`.
/// - **Algorithm**: PBKDF2-HMAC-SHA512, 2048 rounds, 64-byte output.
///
/// The phrase is used as given; callers that accept user input should
/// go through [`Mnemonic::parse`] first.
///
/// # Errors
///
/// Returns [`SuncityError::CryptoError`] if PBKDF2 computation fails.
pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> Result<Seed> {
    let mut password: String = mnemonic.nfkd().collect();
    let mut salt: String = format!("mnemonic{passphrase}").nfkd().collect();

    let mut output = [0u8; 64];
    let result = pbkdf2::pbkdf2::<Hmac<Sha512>>(
        password.as_bytes(),
        salt.as_bytes(),
        SEED_ROUNDS,
        &mut output,
    )
    .map_err(|e| SuncityError::CryptoError {
        reason: format!("PBKDF2-HMAC-SHA512 failed: {e}"),
    });

    password.zeroize();
    salt.zeroize();
    result?;

    Ok(Seed(output))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Trims, lowercases and collapses whitespace runs to single spaces.
pub fn normalize_mnemonic(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the entropy strength encoded by a phrase of `count` words.
pub fn strength_for_word_count(count: usize) -> Option<u32> {
    match count {
        12 => Some(128),
        15 => Some(160),
        18 => Some(192),
        21 => Some(224),
        24 => Some(256),
        _ => None,
    }
}

/// Whether `word` (case-insensitive) is a dictionary word.
pub fn is_valid_word(word: &str) -> bool {
    word_to_index(&word.trim().to_lowercase()).is_some()
}

/// Up to `limit` dictionary words starting with `prefix` (case-insensitive).
pub fn suggest_words(prefix: &str, limit: usize) -> Vec<&'static str> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Vec::new();
    }
    words_with_prefix(&prefix)
        .iter()
        .take(limit)
        .copied()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
