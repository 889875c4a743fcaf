//! Deterministic-nonce ECDSA signing and verification.
//!
//! Nonces follow RFC 6979 (HMAC-SHA256). Attempt 0 is plain RFC 6979;
//! each retry feeds the attempt counter as 32 bytes of additional data,
//! so a retry produces an unrelated nonce while staying deterministic.
//! Retries happen only when `r` or `s` comes out zero and are capped at
//! [`MAX_SIGNING_ATTEMPTS`].

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use suncity_types::{Result, SuncityError};
use tracing::{debug, error};
use zeroize::Zeroize;

use super::{decode_der, encode_der, mod_inverse, to_fixed_32, Point, PrivateKey, PublicKey, Secp256k1};
use crate::hash::hmac_sha256;

/// Upper bound on nonce attempts before signing gives up.
pub const MAX_SIGNING_ATTEMPTS: u32 = 256;

/// HMAC-DRBG candidates drawn per attempt before the attempt is abandoned.
const MAX_NONCE_CANDIDATES: u32 = 16;

/// Signing options.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignOptions {
    /// Normalize `s` into the lower half of the order.
    pub canonical: bool,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self { canonical: true }
    }
}

/// An `(r, s)` signature with the id needed to recover the signer's key.
///
/// Bit 0 of `recovery_id` is the parity of `R.y`; bit 1 is set when
/// `R.x` was reduced modulo `n`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecoverableSignature {
    pub r: BigUint,
    pub s: BigUint,
    pub recovery_id: u8,
}

impl RecoverableSignature {
    /// DER encoding of `(r, s)`.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::InvalidSignature`] if `r` or `s` does not
    /// fit in 32 bytes.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        encode_der(&self.r, &self.s)
    }

    /// 64-byte `r ‖ s` encoding.
    pub fn to_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&to_fixed_32(&self.r));
        out[32..].copy_from_slice(&to_fixed_32(&self.s));
        out
    }
}

impl Secp256k1 {
    /// Interprets a 32-byte digest as an integer reduced modulo `n`.
    pub(crate) fn hash_to_scalar(&self, hash: &[u8]) -> BigUint {
        BigUint::from_bytes_be(hash) % &self.n
    }

    /// RFC 6979 §3.2 nonce for `(hash, private_key, attempt)`.
    fn deterministic_nonce(&self, hash: &[u8; 32], private_key: &[u8; 32], attempt: u32) -> Result<BigUint> {
        let h1 = to_fixed_32(&self.hash_to_scalar(hash));
        let mut extra = [0u8; 32];
        extra[28..].copy_from_slice(&attempt.to_be_bytes());
        let extra: &[u8] = if attempt == 0 { &[] } else { &extra };

        let mut v = [0x01u8; 32];
        let mut k = [0x00u8; 32];

        k = hmac_sha256(&k, &[&v, &[0x00], private_key, &h1, extra])?;
        v = hmac_sha256(&k, &[&v])?;
        k = hmac_sha256(&k, &[&v, &[0x01], private_key, &h1, extra])?;
        v = hmac_sha256(&k, &[&v])?;

        for _ in 0..MAX_NONCE_CANDIDATES {
            v = hmac_sha256(&k, &[&v])?;
            let candidate = BigUint::from_bytes_be(&v);
            if !candidate.is_zero() && candidate < self.n {
                k.zeroize();
                v.zeroize();
                return Ok(candidate);
            }
            k = hmac_sha256(&k, &[&v, &[0x00]])?;
            v = hmac_sha256(&k, &[&v])?;
        }

        k.zeroize();
        v.zeroize();
        Err(SuncityError::CryptoError {
            reason: "no nonce candidate in range".into(),
        })
    }

    /// Core signing loop shared by [`sign`](Self::sign) and
    /// [`sign_recoverable`](Self::sign_recoverable).
    fn sign_raw(&self, hash: &[u8; 32], key: &PrivateKey, options: SignOptions) -> Result<RecoverableSignature> {
        let d = key.scalar();
        let e = self.hash_to_scalar(hash);

        for attempt in 0..MAX_SIGNING_ATTEMPTS {
            let k = self.deterministic_nonce(hash, key.as_bytes(), attempt)?;

            let big_r = match self.mul_generator(&k) {
                Point::Affine(point) => point,
                Point::Infinity => continue,
            };
            let r = &big_r.x % &self.n;
            if r.is_zero() {
                debug!(attempt, "nonce produced r = 0, retrying");
                continue;
            }

            let Some(k_inv) = mod_inverse(&k, &self.n) else {
                continue;
            };
            let s = (k_inv * ((&e + &r * &d) % &self.n)) % &self.n;
            if s.is_zero() {
                debug!(attempt, "nonce produced s = 0, retrying");
                continue;
            }

            let mut recovery_id = u8::from(big_r.y.is_odd()) | (u8::from(big_r.x >= self.n) << 1);
            let s = if options.canonical && s > self.half_n {
                // Negating s corresponds to negating R, flipping its y parity.
                recovery_id ^= 1;
                &self.n - s
            } else {
                s
            };

            return Ok(RecoverableSignature { r, s, recovery_id });
        }

        error!(
            attempts = MAX_SIGNING_ATTEMPTS,
            "ECDSA nonce budget exhausted; this indicates a broken hash or curve implementation"
        );
        Err(SuncityError::SigningFailure {
            attempts: MAX_SIGNING_ATTEMPTS,
        })
    }

    /// Signs a 32-byte digest, returning a canonical (low-s) DER signature.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::SigningFailure`] if the nonce retry budget
    /// is exhausted.
    pub fn sign(&self, hash: &[u8; 32], key: &PrivateKey) -> Result<Vec<u8>> {
        self.sign_with(hash, key, SignOptions::default())
    }

    /// Like [`sign`](Self::sign) with explicit options.
    pub fn sign_with(&self, hash: &[u8; 32], key: &PrivateKey, options: SignOptions) -> Result<Vec<u8>> {
        self.sign_raw(hash, key, options)?.to_der()
    }

    /// Signs a digest and returns `(r, s, recovery_id)`.
    ///
    /// The signature is canonical (low-s).
    pub fn sign_recoverable(&self, hash: &[u8; 32], key: &PrivateKey) -> Result<RecoverableSignature> {
        self.sign_raw(hash, key, SignOptions::default())
    }

    /// Verifies a DER signature over `hash` for a SEC1-encoded public key.
    ///
    /// Never fails: malformed signatures, digests or keys yield `false`.
    pub fn verify(&self, signature: &[u8], hash: &[u8], public_key: &[u8]) -> bool {
        if hash.len() != 32 {
            return false;
        }
        let Ok((r, s)) = decode_der(signature) else {
            return false;
        };
        let Ok(public_key) = self.parse_public_key(public_key) else {
            return false;
        };
        self.verify_rs(&r, &s, hash, &public_key)
    }

    /// Verifies `(r, s)` over `hash` for an already-parsed key.
    ///
    /// Accepts both low-s and high-s forms.
    pub fn verify_rs(&self, r: &BigUint, s: &BigUint, hash: &[u8], public_key: &PublicKey) -> bool {
        if r.is_zero() || s.is_zero() || *r >= self.n || *s >= self.n {
            return false;
        }
        let Some(w) = mod_inverse(s, &self.n) else {
            return false;
        };

        let e = self.hash_to_scalar(hash);
        let u1 = (&e * &w) % &self.n;
        let u2 = (r * &w) % &self.n;

        let q = Point::Affine(public_key.point().clone());
        let sum = self.add(&self.mul_generator(&u1), &self.mul(&q, &u2));
        match sum {
            Point::Affine(point) => &point.x % &self.n == *r,
            Point::Infinity => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    fn key(ec: &Secp256k1, last: u8) -> std::result::Result<PrivateKey, SuncityError> {
        let mut bytes = [0u8; 32];
        bytes[31] = last;
        ec.private_key_from_bytes(&bytes)
    }

    #[test]
    fn sign_then_verify() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let kp = ec.generate_keypair()?;
        let hash = sha256(b"suncity transfer");
        let sig = ec.sign(&hash, kp.private_key())?;
        assert!(ec.verify(&sig, &hash, &kp.public_key().to_compressed()));
        assert!(ec.verify(&sig, &hash, &kp.public_key().to_uncompressed()));
        Ok(())
    }

    #[test]
    fn signing_is_deterministic() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let k = key(&ec, 7)?;
        let hash = sha256(b"same message");
        assert_eq!(ec.sign(&hash, &k)?, ec.sign(&hash, &k)?);
        Ok(())
    }

    #[test]
    fn retry_attempts_use_distinct_nonces() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let k = key(&ec, 7)?;
        let hash = sha256(b"nonce");
        let first = ec.deterministic_nonce(&hash, k.as_bytes(), 0)?;
        let second = ec.deterministic_nonce(&hash, k.as_bytes(), 1)?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn canonical_signatures_are_low_s() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let k = key(&ec, 42)?;
        for i in 0u8..8 {
            let hash = sha256(&[i]);
            let sig = ec.sign_recoverable(&hash, &k)?;
            assert!(sig.s <= ec.half_n);
        }
        Ok(())
    }

    #[test]
    fn non_canonical_option_keeps_raw_s() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let k = key(&ec, 42)?;
        // At least one of a handful of digests yields a high raw s.
        let mut saw_high = false;
        for i in 0u8..16 {
            let hash = sha256(&[i]);
            let raw = ec.sign_raw(&hash, &k, SignOptions { canonical: false })?;
            let low = ec.sign_raw(&hash, &k, SignOptions::default())?;
            assert_eq!(raw.r, low.r);
            if raw.s > ec.half_n {
                saw_high = true;
                assert_eq!(&raw.s + &low.s, ec.n.clone());
            }
            let pk = ec.public_key(&k)?;
            assert!(ec.verify_rs(&raw.r, &raw.s, &hash, &pk));
        }
        assert!(saw_high);
        Ok(())
    }

    #[test]
    fn wrong_key_or_message_fails() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let signer = ec.generate_keypair()?;
        let other = ec.generate_keypair()?;
        let hash = sha256(b"message");
        let sig = ec.sign(&hash, signer.private_key())?;
        assert!(!ec.verify(&sig, &hash, &other.public_key().to_compressed()));
        assert!(!ec.verify(&sig, &sha256(b"other"), &signer.public_key().to_compressed()));
        Ok(())
    }

    #[test]
    fn malformed_inputs_yield_false() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let kp = ec.generate_keypair()?;
        let pk = kp.public_key().to_compressed();
        let hash = sha256(b"x");

        let zero_r = encode_der(&BigUint::zero(), &BigUint::from(1u32))?;
        let zero_s = encode_der(&BigUint::from(1u32), &BigUint::zero())?;
        let big_r = encode_der(ec.order(), &BigUint::from(1u32))?;
        assert!(!ec.verify(&zero_r, &hash, &pk));
        assert!(!ec.verify(&zero_s, &hash, &pk));
        assert!(!ec.verify(&big_r, &hash, &pk));
        assert!(!ec.verify(&[0xde, 0xad], &hash, &pk));

        let sig = ec.sign(&hash, kp.private_key())?;
        assert!(!ec.verify(&sig, &hash, &pk[..32]));
        assert!(!ec.verify(&sig, &hash, &[]));
        assert!(!ec.verify(&sig, &hash[..31], &pk));
        Ok(())
    }
}
