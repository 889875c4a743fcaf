//! BIP-32 hierarchical deterministic derivation over secp256k1.
//!
//! Accounts live at `m/44'/118'/0'/0/0` (the Cosmos coin type). Unlike
//! SLIP-0010 Ed25519, secp256k1 supports both hardened and normal child
//! derivation, so both are accepted here.
//!
//! # Process (BIP-32)
//!
//! 1. Master key: `I = HMAC-SHA512(key="Bitcoin seed", data=seed)`,
//!    `IL` is the master scalar and `IR` the chain code.
//! 2. For each index `i`:
//!    - hardened: `data = 0x00 ‖ ser256(k) ‖ ser32(i)`
//!    - normal:   `data = serP(k·G) ‖ ser32(i)`
//!    - `I = HMAC-SHA512(chain_code, data)`, child scalar `IL + k mod n`.
//! 3. An `IL >= n` or a zero child scalar is reported as an error; the
//!    probability is below 2^-127.
//!
//! Reference: <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki>

use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use suncity_types::{Result, SuncityError};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::hash::hmac_sha512;
use crate::mnemonic::{mnemonic_to_seed, Seed};
use crate::secp256k1::{KeyPair, PrivateKey, Secp256k1};

/// Hardened index offset (`2^31`).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// HMAC key for master key generation.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

// ---------------------------------------------------------------------------
// ChildIndex / DerivationPath
// ---------------------------------------------------------------------------

/// One path component.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChildIndex {
    Normal(u32),
    Hardened(u32),
}

impl ChildIndex {
    /// Index as serialized into the HMAC input.
    pub fn to_u32(self) -> u32 {
        match self {
            Self::Normal(i) => i,
            Self::Hardened(i) => i | HARDENED_OFFSET,
        }
    }

    pub fn is_hardened(self) -> bool {
        matches!(self, Self::Hardened(_))
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal(i) => write!(f, "{i}"),
            Self::Hardened(i) => write!(f, "{i}'"),
        }
    }
}

/// A parsed `m/...` derivation path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DerivationPath(Vec<ChildIndex>);

impl DerivationPath {
    /// Parses `m/44'/118'/0'/0/0`-style paths.
    ///
    /// Hardened components may use `'` or `h`. A bare `m` is the master
    /// key itself.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::InvalidParameter`] if the path does not
    /// start with `m`, has an empty component, a non-numeric index, or
    /// an index `>= 2^31`.
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |reason: String| SuncityError::InvalidParameter { reason };
        let trimmed = path.trim();

        if trimmed == "m" {
            return Ok(Self(Vec::new()));
        }
        let components = trimmed
            .strip_prefix("m/")
            .ok_or_else(|| invalid(format!("derivation path must start with 'm/', got '{trimmed}'")))?;

        let mut indices = Vec::new();
        for part in components.split('/') {
            if part.is_empty() {
                return Err(invalid("empty component in derivation path".into()));
            }
            let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
                Some(digits) => (digits, true),
                None => (part, false),
            };
            let index: u32 = digits
                .parse()
                .map_err(|e| invalid(format!("invalid index '{digits}' in path: {e}")))?;
            if index >= HARDENED_OFFSET {
                return Err(invalid(format!(
                    "index {index} exceeds maximum ({})",
                    HARDENED_OFFSET - 1
                )));
            }
            indices.push(if hardened {
                ChildIndex::Hardened(index)
            } else {
                ChildIndex::Normal(index)
            });
        }
        Ok(Self(indices))
    }

    pub fn indices(&self) -> &[ChildIndex] {
        &self.0
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ExtendedPrivateKey
// ---------------------------------------------------------------------------

/// A private scalar with its chain code.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ExtendedPrivateKey {
    key: [u8; 32],
    chain_code: [u8; 32],
    depth: u8,
}

impl ExtendedPrivateKey {
    /// Master key from a raw seed (16 to 64 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::InvalidParameter`] for a seed outside
    /// 16..=64 bytes and [`SuncityError::CryptoError`] if `IL` is not a
    /// valid scalar.
    pub fn master(ec: &Secp256k1, seed: &[u8]) -> Result<Self> {
        if !(16..=64).contains(&seed.len()) {
            return Err(SuncityError::InvalidParameter {
                reason: format!("seed must be 16..=64 bytes, got {}", seed.len()),
            });
        }
        let mut i = hmac_sha512(MASTER_HMAC_KEY, seed)?;
        let result = Self::from_hmac_output(ec, &i, 0);
        i.zeroize();
        result
    }

    fn from_hmac_output(ec: &Secp256k1, i: &[u8; 64], depth: u8) -> Result<Self> {
        if !ec.is_valid_private_key(&i[..32]) {
            return Err(SuncityError::CryptoError {
                reason: "derived key is outside [1, n-1]".into(),
            });
        }
        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&i[..32]);
        chain_code.copy_from_slice(&i[32..]);
        Ok(Self { key, chain_code, depth })
    }

    /// Derives one child.
    pub fn derive_child(&self, ec: &Secp256k1, index: ChildIndex) -> Result<Self> {
        let mut data = Vec::with_capacity(37);
        if index.is_hardened() {
            data.push(0x00);
            data.extend_from_slice(&self.key);
        } else {
            let parent = ec.private_key_from_bytes(&self.key)?;
            data.extend_from_slice(&ec.public_key(&parent)?.to_compressed());
        }
        data.extend_from_slice(&index.to_u32().to_be_bytes());

        let mut i = hmac_sha512(&self.chain_code, &data)?;
        data.zeroize();

        let tweak = BigUint::from_bytes_be(&i[..32]);
        if tweak >= *ec.order() {
            i.zeroize();
            return Err(SuncityError::CryptoError {
                reason: format!("child {index} is invalid (IL >= n)"),
            });
        }
        let child = (tweak + BigUint::from_bytes_be(&self.key)) % ec.order();
        if child.is_zero() {
            i.zeroize();
            return Err(SuncityError::CryptoError {
                reason: format!("child {index} is invalid (zero key)"),
            });
        }

        let child_bytes = child.to_bytes_be();
        let mut key = [0u8; 32];
        key[32 - child_bytes.len()..].copy_from_slice(&child_bytes);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        i.zeroize();

        Ok(Self {
            key,
            chain_code,
            depth: self.depth.saturating_add(1),
        })
    }

    /// Derives along every component of `path`.
    pub fn derive_path(&self, ec: &Secp256k1, path: &DerivationPath) -> Result<Self> {
        let mut current = Self {
            key: self.key,
            chain_code: self.chain_code,
            depth: self.depth,
        };
        for &index in path.indices() {
            current = current.derive_child(ec, index)?;
        }
        Ok(current)
    }

    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// The private key as a validated [`PrivateKey`].
    pub fn to_private_key(&self, ec: &Secp256k1) -> Result<PrivateKey> {
        ec.private_key_from_bytes(&self.key)
    }
}

impl fmt::Debug for ExtendedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedPrivateKey")
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derives the private key at `path` from a BIP-39 seed.
pub fn derive_private_key(ec: &Secp256k1, seed: &Seed, path: &str) -> Result<PrivateKey> {
    let path = DerivationPath::parse(path)?;
    ExtendedPrivateKey::master(ec, seed.as_bytes())?
        .derive_path(ec, &path)?
        .to_private_key(ec)
}

/// Derives the key pair at `path` from a BIP-39 seed.
pub fn derive_keypair(ec: &Secp256k1, seed: &Seed, path: &str) -> Result<KeyPair> {
    let private = derive_private_key(ec, seed, path)?;
    ec.keypair_from_private(private)
}

/// Mnemonic → seed → key pair at `path`, with an empty BIP-39 passphrase.
///
/// The mnemonic is not validated here; callers validate before deriving.
pub fn derive_keypair_from_mnemonic(ec: &Secp256k1, mnemonic: &str, path: &str) -> Result<KeyPair> {
    let seed = mnemonic_to_seed(mnemonic, "")?;
    derive_keypair(ec, &seed, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector1_master(ec: &Secp256k1) -> std::result::Result<ExtendedPrivateKey, SuncityError> {
        let seed: Vec<u8> = (0u8..16).collect();
        ExtendedPrivateKey::master(ec, &seed)
    }

    #[test]
    fn parse_mixed_path() -> std::result::Result<(), SuncityError> {
        let path = DerivationPath::parse("m/44'/118'/0'/0/0")?;
        assert_eq!(
            path.indices(),
            &[
                ChildIndex::Hardened(44),
                ChildIndex::Hardened(118),
                ChildIndex::Hardened(0),
                ChildIndex::Normal(0),
                ChildIndex::Normal(0),
            ]
        );
        assert_eq!(path.to_string(), "m/44'/118'/0'/0/0");
        assert_eq!(DerivationPath::parse("m/1h/2")?.to_string(), "m/1'/2");
        assert!(DerivationPath::parse("m")?.indices().is_empty());
        Ok(())
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(DerivationPath::parse("44'/0'").is_err());
        assert!(DerivationPath::parse("m/").is_err());
        assert!(DerivationPath::parse("m/1//2").is_err());
        assert!(DerivationPath::parse("m/x").is_err());
        assert!(DerivationPath::parse("m/2147483648").is_err());
    }

    // BIP-32 test vector 1, seed 000102030405060708090a0b0c0d0e0f.

    #[test]
    fn bip32_vector1_master() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let m = vector1_master(&ec)?;
        assert_eq!(
            hex::encode(m.private_key_bytes()),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(m.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        Ok(())
    }

    #[test]
    fn bip32_vector1_children() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let m = vector1_master(&ec)?;

        let m0h = m.derive_path(&ec, &DerivationPath::parse("m/0'")?)?;
        assert_eq!(
            hex::encode(m0h.private_key_bytes()),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(
            hex::encode(m0h.chain_code()),
            "47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141"
        );

        let m0h1 = m0h.derive_child(&ec, ChildIndex::Normal(1))?;
        assert_eq!(
            hex::encode(m0h1.private_key_bytes()),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );

        let deep = m.derive_path(&ec, &DerivationPath::parse("m/0'/1/2'/2/1000000000")?)?;
        assert_eq!(
            hex::encode(deep.private_key_bytes()),
            "471b76e389e528d6de6d816857e012c5455051cad6660850e58372a6c3e6e7c8"
        );
        assert_eq!(deep.depth(), 5);
        Ok(())
    }

    #[test]
    fn cosmos_path_from_test_mnemonic() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let kp = derive_keypair_from_mnemonic(&ec, phrase, "m/44'/118'/0'/0/0")?;
        assert_eq!(
            hex::encode(kp.private_key().as_bytes()),
            "c4a48e2fce1481cd3294b4490f6678090ea98d3d0e5cd984558ab0968741b104"
        );
        assert_eq!(
            kp.public_key().to_hex(),
            "024f4e2ad99c34d60b9ba6283c9431a8418af8673212961f97a77b6377fcd05b62"
        );
        Ok(())
    }

    #[test]
    fn seed_length_bounds() {
        let ec = Secp256k1::new();
        assert!(ExtendedPrivateKey::master(&ec, &[0u8; 15]).is_err());
        assert!(ExtendedPrivateKey::master(&ec, &[0u8; 65]).is_err());
    }

    #[test]
    fn debug_hides_key_material() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let m = vector1_master(&ec)?;
        let rendered = format!("{m:?}");
        assert!(!rendered.contains("e8f32e72"));
        Ok(())
    }
}
