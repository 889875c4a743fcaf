//! Private keys, public keys and SEC1 encodings.

use std::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::RngCore;
use suncity_types::{Result, SuncityError};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{to_fixed_32, AffinePoint, Point, Secp256k1};

const TAG_EVEN: u8 = 0x02;
const TAG_ODD: u8 = 0x03;
const TAG_UNCOMPRESSED: u8 = 0x04;

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A secp256k1 secret scalar in `[1, n-1]`, stored big-endian.
///
/// Only obtainable through [`Secp256k1`] constructors, which enforce
/// the range. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Fixed byte length of a private key.
    pub const LEN: usize = 32;

    /// Returns the raw 32-byte scalar.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub(crate) fn scalar(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

// PrivateKey does not implement Clone to prevent leakage.

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A validated, finite secp256k1 point.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey {
    point: AffinePoint,
}

impl PublicKey {
    /// Length of the compressed SEC1 encoding.
    pub const COMPRESSED_LEN: usize = 33;
    /// Length of the uncompressed SEC1 encoding.
    pub const UNCOMPRESSED_LEN: usize = 65;

    pub(crate) fn from_point(point: AffinePoint) -> Self {
        Self { point }
    }

    /// The underlying affine point.
    pub fn point(&self) -> &AffinePoint {
        &self.point
    }

    /// `0x02/0x03 ‖ x`, tag chosen by the parity of `y`.
    pub fn to_compressed(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out[0] = if self.point.y.is_odd() { TAG_ODD } else { TAG_EVEN };
        out[1..].copy_from_slice(&to_fixed_32(&self.point.x));
        out
    }

    /// `0x04 ‖ x ‖ y`.
    pub fn to_uncompressed(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0] = TAG_UNCOMPRESSED;
        out[1..33].copy_from_slice(&to_fixed_32(&self.point.x));
        out[33..].copy_from_slice(&to_fixed_32(&self.point.y));
        out
    }

    /// Lowercase hex of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// A private key together with its public key.
pub struct KeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl KeyPair {
    /// The secret half.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// The public half.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public.to_hex())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Key operations
// ---------------------------------------------------------------------------

impl Secp256k1 {
    /// Whether `bytes` is a 32-byte scalar in `[1, n-1]`.
    pub fn is_valid_private_key(&self, bytes: &[u8]) -> bool {
        if bytes.len() != PrivateKey::LEN {
            return false;
        }
        let k = BigUint::from_bytes_be(bytes);
        !k.is_zero() && k < self.n
    }

    /// Wraps `bytes` as a private key after checking its range.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::InvalidPrivateKey`] if `bytes` is not 32
    /// bytes long, is zero, or is `>= n`.
    pub fn private_key_from_bytes(&self, bytes: &[u8]) -> Result<PrivateKey> {
        if bytes.len() != PrivateKey::LEN {
            return Err(SuncityError::InvalidPrivateKey {
                reason: format!("expected 32 bytes, got {}", bytes.len()),
            });
        }
        if !self.is_valid_private_key(bytes) {
            return Err(SuncityError::InvalidPrivateKey {
                reason: "scalar must be in [1, n-1]".into(),
            });
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(bytes);
        Ok(PrivateKey(out))
    }

    /// Samples a private key uniformly from `[1, n-1]` by rejection.
    pub fn generate_private_key(&self) -> PrivateKey {
        let mut candidate = [0u8; 32];
        loop {
            OsRng.fill_bytes(&mut candidate);
            if self.is_valid_private_key(&candidate) {
                return PrivateKey(candidate);
            }
        }
    }

    /// Computes `k · G`.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::InvalidPrivateKey`] if the product is the
    /// point at infinity, which cannot happen for an in-range key.
    pub fn public_key(&self, private: &PrivateKey) -> Result<PublicKey> {
        match self.mul_generator(&private.scalar()) {
            Point::Affine(point) => Ok(PublicKey { point }),
            Point::Infinity => Err(SuncityError::InvalidPrivateKey {
                reason: "scalar multiple of G is the point at infinity".into(),
            }),
        }
    }

    /// Derives the SEC1 public key bytes for a raw private key.
    ///
    /// Returns 33 bytes when `compressed`, 65 otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::InvalidPrivateKey`] if the scalar is out of
    /// range.
    pub fn derive_public_key(&self, private_key: &[u8], compressed: bool) -> Result<Vec<u8>> {
        let private = self.private_key_from_bytes(private_key)?;
        let public = self.public_key(&private)?;
        Ok(if compressed {
            public.to_compressed().to_vec()
        } else {
            public.to_uncompressed().to_vec()
        })
    }

    /// Builds a key pair from an existing private key.
    pub fn keypair_from_private(&self, private: PrivateKey) -> Result<KeyPair> {
        let public = self.public_key(&private)?;
        Ok(KeyPair { private, public })
    }

    /// Generates a fresh random key pair.
    pub fn generate_keypair(&self) -> Result<KeyPair> {
        let private = self.generate_private_key();
        self.keypair_from_private(private)
    }

    /// Parses a compressed (33-byte) or uncompressed (65-byte) SEC1 key.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::InvalidPublicKey`] for a bad length, an
    /// unknown tag, a coordinate `>= p`, or a point off the curve.
    pub fn parse_public_key(&self, bytes: &[u8]) -> Result<PublicKey> {
        let point = match (bytes.len(), bytes.first()) {
            (PublicKey::COMPRESSED_LEN, Some(&tag)) if tag == TAG_EVEN || tag == TAG_ODD => {
                let x = BigUint::from_bytes_be(&bytes[1..]);
                self.lift_x(&x, tag == TAG_ODD)
                    .ok_or_else(|| SuncityError::InvalidPublicKey {
                        reason: "x coordinate is not on the curve".into(),
                    })?
            }
            (PublicKey::UNCOMPRESSED_LEN, Some(&TAG_UNCOMPRESSED)) => {
                let point = AffinePoint {
                    x: BigUint::from_bytes_be(&bytes[1..33]),
                    y: BigUint::from_bytes_be(&bytes[33..]),
                };
                if !self.is_on_curve(&point) {
                    return Err(SuncityError::InvalidPublicKey {
                        reason: "point is not on the curve".into(),
                    });
                }
                point
            }
            (len, tag) => {
                return Err(SuncityError::InvalidPublicKey {
                    reason: format!(
                        "unsupported encoding: {len} bytes with tag {:#04x}",
                        tag.copied().unwrap_or_default()
                    ),
                })
            }
        };
        Ok(PublicKey { point })
    }

    /// Whether `bytes` parses as a valid public key.
    pub fn is_valid_public_key(&self, bytes: &[u8]) -> bool {
        self.parse_public_key(bytes).is_ok()
    }

    /// Re-encodes any SEC1 public key in compressed form.
    pub fn compress_public_key(&self, bytes: &[u8]) -> Result<[u8; 33]> {
        Ok(self.parse_public_key(bytes)?.to_compressed())
    }

    /// Re-encodes any SEC1 public key in uncompressed form.
    pub fn decompress_public_key(&self, bytes: &[u8]) -> Result<[u8; 65]> {
        Ok(self.parse_public_key(bytes)?.to_uncompressed())
    }
}
