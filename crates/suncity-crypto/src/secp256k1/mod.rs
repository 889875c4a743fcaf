//! secp256k1 over arbitrary-precision integers.
//!
//! The curve is `y² = x³ + 7` over `F_p`, with generator `G` of prime
//! order `n`. Points are kept in affine coordinates; every intermediate
//! value is a [`BigUint`] reduced into `[0, p)` or `[0, n)`, so nothing
//! can overflow a fixed-width integer.
//!
//! A [`Secp256k1`] value holds the curve constants and is constructed
//! explicitly by its owner; there is no process-wide instance.
//!
//! # Submodules
//!
//! - `point`: affine addition, doubling, scalar multiplication, decompression
//! - `keys`: [`PrivateKey`], [`PublicKey`], [`KeyPair`], SEC1 encodings
//! - `ecdsa`: deterministic-nonce signing and verification
//! - `der`: DER signature encoding
//! - `recovery`: public key recovery from `(r, s, recovery_id)`

mod der;
mod ecdsa;
mod keys;
mod point;
mod recovery;

pub use der::{decode_der, encode_der};
pub use ecdsa::{RecoverableSignature, SignOptions, MAX_SIGNING_ATTEMPTS};
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use point::{AffinePoint, Point};

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

const P_BYTES: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xfc, 0x2f,
];

const N_BYTES: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

const GX_BYTES: [u8; 32] = [
    0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b, 0x07,
    0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17, 0x98,
];

const GY_BYTES: [u8; 32] = [
    0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65, 0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11, 0x08, 0xa8,
    0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19, 0x9c, 0x47, 0xd0, 0x8f, 0xfb, 0x10, 0xd4, 0xb8,
];

/// Curve constant `b` in `y² = x³ + b`.
const CURVE_B: u32 = 7;

// ---------------------------------------------------------------------------
// Secp256k1
// ---------------------------------------------------------------------------

/// Immutable secp256k1 domain parameters plus the operations over them.
#[derive(Clone, Debug)]
pub struct Secp256k1 {
    p: BigUint,
    n: BigUint,
    half_n: BigUint,
    b: BigUint,
    g: AffinePoint,
    /// `(p + 1) / 4`, the square-root exponent (valid since `p ≡ 3 mod 4`).
    sqrt_exp: BigUint,
}

impl Secp256k1 {
    /// Builds the curve constants.
    pub fn new() -> Self {
        let p = BigUint::from_bytes_be(&P_BYTES);
        let n = BigUint::from_bytes_be(&N_BYTES);
        let half_n = &n >> 1usize;
        let sqrt_exp = (&p + BigUint::one()) >> 2usize;
        Self {
            g: AffinePoint {
                x: BigUint::from_bytes_be(&GX_BYTES),
                y: BigUint::from_bytes_be(&GY_BYTES),
            },
            b: BigUint::from(CURVE_B),
            p,
            n,
            half_n,
            sqrt_exp,
        }
    }

    /// Field prime `p`.
    pub fn field_prime(&self) -> &BigUint {
        &self.p
    }

    /// Group order `n`.
    pub fn order(&self) -> &BigUint {
        &self.n
    }

    /// Generator point `G`.
    pub fn generator(&self) -> &AffinePoint {
        &self.g
    }
}

impl Default for Secp256k1 {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Integer helpers
// ---------------------------------------------------------------------------

/// Modular inverse via the extended Euclidean algorithm.
///
/// Returns `None` when `a ≡ 0 (mod m)` or `gcd(a, m) != 1`.
pub(crate) fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let a = a % m;
    if a.is_zero() {
        return None;
    }

    let modulus = BigInt::from(m.clone());
    let (mut old_r, mut r) = (BigInt::from(a), modulus.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return None;
    }
    old_s.mod_floor(&modulus).to_biguint()
}

/// Big-endian 32-byte encoding of a value known to be `< 2^256`.
pub(crate) fn to_fixed_32(value: &BigUint) -> [u8; 32] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    let start = 32usize.saturating_sub(bytes.len());
    let skip = bytes.len().saturating_sub(32);
    out[start..].copy_from_slice(&bytes[skip..]);
    out
}
