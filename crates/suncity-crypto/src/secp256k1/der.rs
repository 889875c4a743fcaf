//! Strict DER encoding of `(r, s)` ECDSA signatures.
//!
//! `SEQUENCE { INTEGER r, INTEGER s }`, each integer minimal-length
//! big-endian with a `0x00` prefix when the top bit would otherwise be
//! set. Decoding rejects anything non-minimal, negative or trailing.

use num_bigint::BigUint;
use suncity_types::{Result, SuncityError};

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;

/// Largest DER signature for 256-bit integers: 2 + 2 × (2 + 33).
const MAX_DER_LEN: usize = 72;

/// Widest `r` or `s` accepted for encoding.
const MAX_SCALAR_LEN: usize = 32;

fn encode_integer(value: &BigUint, out: &mut Vec<u8>) {
    let mut bytes = value.to_bytes_be();
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0x00);
    }
    out.push(TAG_INTEGER);
    out.push(bytes.len() as u8);
    out.extend_from_slice(&bytes);
}

/// Encodes `(r, s)` as a DER sequence.
///
/// # Errors
///
/// Returns [`SuncityError::InvalidSignature`] if `r` or `s` is wider
/// than 32 bytes.
pub fn encode_der(r: &BigUint, s: &BigUint) -> Result<Vec<u8>> {
    for (name, value) in [("r", r), ("s", s)] {
        if value.bits() > (MAX_SCALAR_LEN * 8) as u64 {
            return Err(SuncityError::InvalidSignature {
                reason: format!("{name} is wider than {MAX_SCALAR_LEN} bytes"),
            });
        }
    }

    let mut body = Vec::with_capacity(MAX_DER_LEN);
    encode_integer(r, &mut body);
    encode_integer(s, &mut body);

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(TAG_SEQUENCE);
    out.push(body.len() as u8);
    out.extend_from_slice(&body);
    Ok(out)
}

fn invalid(reason: &str) -> SuncityError {
    SuncityError::InvalidSignature {
        reason: reason.to_string(),
    }
}

/// Reads one INTEGER starting at `pos`, returning it and the next offset.
fn decode_integer(input: &[u8], pos: usize) -> Result<(BigUint, usize)> {
    if input.get(pos) != Some(&TAG_INTEGER) {
        return Err(invalid("expected INTEGER tag"));
    }
    let len = usize::from(*input.get(pos + 1).ok_or_else(|| invalid("truncated INTEGER"))?);
    if len == 0 || len > 33 {
        return Err(invalid("INTEGER length out of range"));
    }
    let start = pos + 2;
    let bytes = input
        .get(start..start + len)
        .ok_or_else(|| invalid("truncated INTEGER"))?;

    if bytes[0] & 0x80 != 0 {
        return Err(invalid("negative INTEGER"));
    }
    if len > 1 && bytes[0] == 0x00 && bytes[1] & 0x80 == 0 {
        return Err(invalid("non-minimal INTEGER encoding"));
    }

    Ok((BigUint::from_bytes_be(bytes), start + len))
}

/// Decodes a DER signature into `(r, s)`.
///
/// Range checks against the curve order are left to the caller.
///
/// # Errors
///
/// Returns [`SuncityError::InvalidSignature`] for any structural defect.
pub fn decode_der(input: &[u8]) -> Result<(BigUint, BigUint)> {
    if input.len() < 8 || input.len() > MAX_DER_LEN {
        return Err(invalid("DER signature length out of range"));
    }
    if input[0] != TAG_SEQUENCE {
        return Err(invalid("expected SEQUENCE tag"));
    }
    if usize::from(input[1]) != input.len() - 2 {
        return Err(invalid("SEQUENCE length mismatch"));
    }

    let (r, next) = decode_integer(input, 2)?;
    let (s, end) = decode_integer(input, next)?;
    if end != input.len() {
        return Err(invalid("trailing bytes after signature"));
    }
    Ok((r, s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_bit_values_get_zero_prefix() -> std::result::Result<(), SuncityError> {
        let r = BigUint::from(0x80u32);
        let s = BigUint::from(0x01u32);
        let der = encode_der(&r, &s)?;
        assert_eq!(der, vec![0x30, 0x07, 0x02, 0x02, 0x00, 0x80, 0x02, 0x01, 0x01]);
        assert_eq!(decode_der(&der)?, (r, s));
        Ok(())
    }

    #[test]
    fn zero_encodes_as_single_byte() -> std::result::Result<(), SuncityError> {
        let der = encode_der(&BigUint::from(0u32), &BigUint::from(0u32))?;
        assert_eq!(der, vec![0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00]);
        let (r, s) = decode_der(&der)?;
        assert_eq!(r, BigUint::from(0u32));
        assert_eq!(s, BigUint::from(0u32));
        Ok(())
    }

    #[test]
    fn non_minimal_rejected() {
        let der = [0x30, 0x08, 0x02, 0x02, 0x00, 0x01, 0x02, 0x02, 0x00, 0x01];
        assert!(decode_der(&der).is_err());
    }

    #[test]
    fn negative_rejected() {
        let der = [0x30, 0x06, 0x02, 0x01, 0x80, 0x02, 0x01, 0x01];
        assert!(decode_der(&der).is_err());
    }

    #[test]
    fn length_mismatch_and_trailing_rejected() -> std::result::Result<(), SuncityError> {
        let good = encode_der(&BigUint::from(5u32), &BigUint::from(6u32))?;
        let mut trailing = good.clone();
        trailing.push(0x00);
        assert!(decode_der(&trailing).is_err());

        let mut wrong_len = good;
        wrong_len[1] += 1;
        assert!(decode_der(&wrong_len).is_err());

        assert!(decode_der(&[]).is_err());
        assert!(decode_der(&[0x30]).is_err());
        Ok(())
    }

    #[test]
    fn oversized_scalars_rejected() -> std::result::Result<(), SuncityError> {
        let max = BigUint::from_bytes_be(&[0xff; 32]);
        let der = encode_der(&max, &max)?;
        assert_eq!(der.len(), MAX_DER_LEN);
        assert_eq!(decode_der(&der)?, (max.clone(), max.clone()));

        let wide = BigUint::from_bytes_be(&[0x01; 33]);
        assert!(matches!(
            encode_der(&wide, &BigUint::from(1u32)),
            Err(SuncityError::InvalidSignature { .. })
        ));
        assert!(matches!(
            encode_der(&BigUint::from(1u32), &(max + 1u32)),
            Err(SuncityError::InvalidSignature { .. })
        ));
        Ok(())
    }
}
