//! Bech32 (BIP173) encoding and decoding.
//!
//! Strings have the shape `hrp + "1" + data + checksum`, where every data
//! and checksum symbol is one of the 32 characters of [`CHARSET`]. The
//! six checksum symbols are the BCH code computed over the expanded
//! prefix and the 5-bit data, XORed with 1.
//!
//! Total length is bounded to `MIN_LENGTH..=MAX_LENGTH`, the range used
//! for account addresses on this chain.

use suncity_types::{Bech32Error, Result};

/// The 32-symbol data alphabet.
pub const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Shortest accepted bech32 string.
pub const MIN_LENGTH: usize = 39;

/// Longest accepted bech32 string.
pub const MAX_LENGTH: usize = 83;

/// Number of checksum symbols.
pub const CHECKSUM_LEN: usize = 6;

const SEPARATOR: char = '1';

/// BCH generator coefficients.
const GENERATOR: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];

// ---------------------------------------------------------------------------
// Checksum
// ---------------------------------------------------------------------------

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for v in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ u32::from(*v);
        for (i, g) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }
    chk
}

/// High bits of every prefix byte, a zero separator, then the low bits.
fn expand_hrp(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 2 + 1);
    out.extend(bytes.iter().map(|b| b >> 5));
    out.push(0);
    out.extend(bytes.iter().map(|b| b & 0x1f));
    out
}

fn create_checksum(hrp: &str, data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut values = expand_hrp(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let pm = polymod(&values) ^ 1;

    let mut out = [0u8; CHECKSUM_LEN];
    for (i, symbol) in out.iter_mut().enumerate() {
        *symbol = ((pm >> (5 * (5 - i))) & 0x1f) as u8;
    }
    out
}

fn verify_checksum(hrp: &str, data: &[u8]) -> bool {
    let mut values = expand_hrp(hrp);
    values.extend_from_slice(data);
    polymod(&values) == 1
}

// ---------------------------------------------------------------------------
// Bit regrouping
// ---------------------------------------------------------------------------

/// Regroups `data` from `from`-bit to `to`-bit values.
///
/// With `pad`, a trailing partial group is zero-filled. Without it, any
/// leftover must be shorter than `from` bits and all zero.
///
/// # Errors
///
/// Returns [`Bech32Error::InvalidPadding`] on an input value wider than
/// `from` bits or on illegal trailing bits.
pub fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max_value: u32 = (1 << to) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for value in data {
        let v = u32::from(*value);
        if v >> from != 0 {
            return Err(Bech32Error::InvalidPadding.into());
        }
        acc = (acc << from) | v;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max_value) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max_value) != 0 {
        return Err(Bech32Error::InvalidPadding.into());
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

fn check_hrp(hrp: &str) -> Result<()> {
    if hrp.is_empty() {
        return Err(Bech32Error::MissingSeparator.into());
    }
    if let Some(ch) = hrp
        .chars()
        .find(|c| !(c.is_ascii() && (33..=126).contains(&(*c as u32))) || c.is_ascii_uppercase())
    {
        return Err(Bech32Error::InvalidCharset { ch }.into());
    }
    Ok(())
}

fn check_length(len: usize) -> Result<()> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&len) {
        return Err(Bech32Error::InvalidLength {
            len,
            min: MIN_LENGTH,
            max: MAX_LENGTH,
        }
        .into());
    }
    Ok(())
}

/// Encodes `payload` bytes under the lowercase prefix `hrp`.
///
/// # Errors
///
/// - [`Bech32Error::InvalidCharset`] if `hrp` contains an uppercase or
///   non-printable character.
/// - [`Bech32Error::InvalidLength`] if the result falls outside
///   `MIN_LENGTH..=MAX_LENGTH`.
pub fn encode(hrp: &str, payload: &[u8]) -> Result<String> {
    check_hrp(hrp)?;

    let mut data = convert_bits(payload, 8, 5, true)?;
    let checksum = create_checksum(hrp, &data);
    data.extend_from_slice(&checksum);

    check_length(hrp.len() + 1 + data.len())?;

    let mut out = String::with_capacity(hrp.len() + 1 + data.len());
    out.push_str(hrp);
    out.push(SEPARATOR);
    out.extend(data.iter().map(|v| char::from(CHARSET[usize::from(*v)])));
    Ok(out)
}

/// Decodes a bech32 string into its lowercase prefix and payload bytes.
///
/// # Checks performed (in order)
///
/// 1. Length within `MIN_LENGTH..=MAX_LENGTH`.
/// 2. Printable ASCII only, not mixed case.
/// 3. Separator present with a non-empty prefix and room for the checksum.
/// 4. Every data symbol in [`CHARSET`].
/// 5. Checksum verifies.
/// 6. 5-to-8-bit regrouping leaves no illegal padding.
///
/// # Errors
///
/// Returns [`suncity_types::SuncityError::InvalidAddress`] carrying the
/// matching [`Bech32Error`].
pub fn decode(encoded: &str) -> Result<(String, Vec<u8>)> {
    // Check 1: length (in characters, so multi-byte input cannot slip past).
    check_length(encoded.chars().count())?;

    // Check 2: character class and case.
    if let Some(ch) = encoded
        .chars()
        .find(|c| !(c.is_ascii() && (33..=126).contains(&(*c as u32))))
    {
        return Err(Bech32Error::InvalidCharset { ch }.into());
    }
    let has_lower = encoded.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = encoded.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(Bech32Error::MixedCase.into());
    }
    let lowered = encoded.to_ascii_lowercase();

    // Check 3: separator.
    let sep = lowered.rfind(SEPARATOR).ok_or(Bech32Error::MissingSeparator)?;
    if sep == 0 {
        return Err(Bech32Error::MissingSeparator.into());
    }
    let (hrp, rest) = lowered.split_at(sep);
    let data_part = &rest[1..];
    if data_part.len() < CHECKSUM_LEN {
        return Err(Bech32Error::InvalidLength {
            len: encoded.chars().count(),
            min: MIN_LENGTH,
            max: MAX_LENGTH,
        }
        .into());
    }

    // Check 4: charset.
    let mut values = Vec::with_capacity(data_part.len());
    for ch in data_part.chars() {
        let v = CHARSET
            .iter()
            .position(|c| char::from(*c) == ch)
            .ok_or(Bech32Error::InvalidCharset { ch })?;
        values.push(v as u8);
    }

    // Check 5: checksum.
    if !verify_checksum(hrp, &values) {
        return Err(Bech32Error::InvalidChecksum.into());
    }

    // Check 6: regroup payload.
    values.truncate(values.len() - CHECKSUM_LEN);
    let payload = convert_bits(&values, 5, 8, false)?;

    Ok((hrp.to_string(), payload))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use suncity_types::SuncityError;

    fn bech32_kind(result: Result<(String, Vec<u8>)>) -> Option<Bech32Error> {
        match result {
            Err(SuncityError::InvalidAddress(kind)) => Some(kind),
            _ => None,
        }
    }

    #[test]
    fn bip173_reference_checksum() {
        // Valid BIP173 string; its witness-version symbol leaves the data
        // unaligned, so regrouping to bytes is what fails.
        assert_eq!(
            bech32_kind(decode("BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4")),
            Some(Bech32Error::InvalidPadding)
        );
        assert_eq!(
            bech32_kind(decode("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5")),
            Some(Bech32Error::InvalidChecksum)
        );
    }

    #[test]
    fn roundtrip_20_bytes() -> std::result::Result<(), SuncityError> {
        let payload: Vec<u8> = (0u8..20).collect();
        let encoded = encode("sunc", &payload)?;
        assert_eq!(encoded.len(), 4 + 1 + 32 + CHECKSUM_LEN);
        let (hrp, decoded) = decode(&encoded)?;
        assert_eq!(hrp, "sunc");
        assert_eq!(decoded, payload);
        Ok(())
    }

    #[test]
    fn uppercase_input_accepted() -> std::result::Result<(), SuncityError> {
        let encoded = encode("sunc", &[0xAB; 20])?;
        let (_, decoded) = decode(&encoded.to_ascii_uppercase())?;
        assert_eq!(decoded, vec![0xAB; 20]);
        Ok(())
    }

    #[test]
    fn mixed_case_rejected() -> std::result::Result<(), SuncityError> {
        let encoded = encode("sunc", &[0x01; 20])?;
        let mut mixed = encoded.clone();
        mixed.replace_range(0..1, "S");
        assert_eq!(bech32_kind(decode(&mixed)), Some(Bech32Error::MixedCase));
        Ok(())
    }

    #[test]
    fn checksum_flip_detected() -> std::result::Result<(), SuncityError> {
        let encoded = encode("sunc", &[0x5A; 20])?;
        let last = encoded.len() - 1;
        let flipped_char = if encoded.ends_with('q') { "p" } else { "q" };
        let mut tampered = encoded.clone();
        tampered.replace_range(last.., flipped_char);
        assert_eq!(
            bech32_kind(decode(&tampered)),
            Some(Bech32Error::InvalidChecksum)
        );
        Ok(())
    }

    #[test]
    fn invalid_charset_detected() -> std::result::Result<(), SuncityError> {
        let encoded = encode("sunc", &[0x00; 20])?;
        // 'b' is not in the data alphabet.
        let tampered = encoded.replacen('q', "b", 1);
        assert_eq!(
            bech32_kind(decode(&tampered)),
            Some(Bech32Error::InvalidCharset { ch: 'b' })
        );
        Ok(())
    }

    #[test]
    fn length_bounds_enforced() {
        assert!(matches!(
            bech32_kind(decode("sunc1qqqqqq")),
            Some(Bech32Error::InvalidLength { len: 11, .. })
        ));
        let too_long = format!("sunc1{}", "q".repeat(MAX_LENGTH));
        assert!(matches!(
            bech32_kind(decode(&too_long)),
            Some(Bech32Error::InvalidLength { .. })
        ));
        assert!(matches!(
            encode("sunc", &[0u8; 4]),
            Err(SuncityError::InvalidAddress(Bech32Error::InvalidLength { .. }))
        ));
    }

    #[test]
    fn short_data_part_reports_length() {
        let short = format!("{}1qqqq", "a".repeat(34));
        assert_eq!(
            bech32_kind(decode(&short)),
            Some(Bech32Error::InvalidLength {
                len: 39,
                min: MIN_LENGTH,
                max: MAX_LENGTH,
            })
        );
    }

    #[test]
    fn missing_separator_detected() {
        let no_sep = "q".repeat(45);
        assert_eq!(
            bech32_kind(decode(&no_sep)),
            Some(Bech32Error::MissingSeparator)
        );
    }

    #[test]
    fn uppercase_prefix_rejected_on_encode() {
        assert!(matches!(
            encode("SUNC", &[0u8; 20]),
            Err(SuncityError::InvalidAddress(Bech32Error::InvalidCharset { ch: 'S' }))
        ));
    }

    #[test]
    fn convert_bits_rejects_nonzero_padding() {
        // Two 5-bit groups = 10 bits → one byte plus 2 leftover bits that must be zero.
        assert!(convert_bits(&[0x1f, 0x1f], 5, 8, false).is_err());
        assert!(convert_bits(&[0x1f, 0x1c], 5, 8, false).is_ok());
    }
}
