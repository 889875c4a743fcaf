//! Public key recovery from a recoverable signature.

use num_bigint::BigUint;
use num_traits::Zero;
use suncity_types::{Result, SuncityError};

use super::{mod_inverse, Point, PublicKey, Secp256k1};

impl Secp256k1 {
    /// Recovers the signer's public key from `(r, s, recovery_id)` over a
    /// 32-byte digest.
    ///
    /// Computes `Q = r⁻¹ (s·R − e·G)` where `R` is reconstructed from `r`
    /// and the two bits of `recovery_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::InvalidSignature`] if `recovery_id > 3`,
    /// `r` or `s` is out of range, `R` does not exist, or the result is
    /// the point at infinity.
    pub fn recover_public_key(
        &self,
        hash: &[u8; 32],
        r: &BigUint,
        s: &BigUint,
        recovery_id: u8,
    ) -> Result<PublicKey> {
        let invalid = |reason: &str| SuncityError::InvalidSignature {
            reason: reason.to_string(),
        };

        if recovery_id > 3 {
            return Err(invalid("recovery id must be 0..=3"));
        }
        if r.is_zero() || s.is_zero() || *r >= self.n || *s >= self.n {
            return Err(invalid("r and s must be in [1, n-1]"));
        }

        let x = if recovery_id & 2 != 0 { r + &self.n } else { r.clone() };
        let big_r = self
            .lift_x(&x, recovery_id & 1 == 1)
            .ok_or_else(|| invalid("no curve point for r"))?;

        let r_inv = mod_inverse(r, &self.n).ok_or_else(|| invalid("r is not invertible"))?;
        let e = self.hash_to_scalar(hash);
        let neg_e = (&self.n - e) % &self.n;

        let u1 = (&neg_e * &r_inv) % &self.n;
        let u2 = (s * &r_inv) % &self.n;

        let q = self.add(&self.mul_generator(&u1), &self.mul(&Point::Affine(big_r), &u2));
        match q {
            Point::Affine(point) => Ok(PublicKey::from_point(point)),
            Point::Infinity => Err(invalid("recovered point is at infinity")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    #[test]
    fn recovers_signer() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        for i in 0u8..4 {
            let kp = ec.generate_keypair()?;
            let hash = sha256(&[i, 0xaa]);
            let sig = ec.sign_recoverable(&hash, kp.private_key())?;
            let recovered = ec.recover_public_key(&hash, &sig.r, &sig.s, sig.recovery_id)?;
            assert_eq!(&recovered, kp.public_key());
        }
        Ok(())
    }

    #[test]
    fn wrong_recovery_id_gives_other_key() -> std::result::Result<(), SuncityError> {
        let ec = Secp256k1::new();
        let kp = ec.generate_keypair()?;
        let hash = sha256(b"recover");
        let sig = ec.sign_recoverable(&hash, kp.private_key())?;
        let flipped = ec.recover_public_key(&hash, &sig.r, &sig.s, sig.recovery_id ^ 1)?;
        assert_ne!(&flipped, kp.public_key());
        Ok(())
    }

    #[test]
    fn rejects_bad_inputs() {
        let ec = Secp256k1::new();
        let hash = sha256(b"x");
        let one = BigUint::from(1u32);
        assert!(ec.recover_public_key(&hash, &one, &one, 4).is_err());
        assert!(ec.recover_public_key(&hash, &BigUint::zero(), &one, 0).is_err());
        assert!(ec.recover_public_key(&hash, &one, ec.order(), 0).is_err());
    }
}
