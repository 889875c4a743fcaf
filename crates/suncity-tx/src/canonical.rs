//! Deterministic CBOR encoding (RFC 8949 §4.2.1) of transaction parts.
//!
//! Everything that is hashed or signed goes through this module. The
//! encoding guarantees:
//!
//! - **Sorted keys**: map keys ordered by their encoded byte form, which
//!   for text keys means shorter first, then bytewise.
//! - **Definite lengths** for every map, array and string.
//! - **Preferred integers**: shortest encoding.
//! - **No floats**: float values are rejected outright.
//! - **No duplicate keys**.
//!
//! The sign doc is assembled explicitly so that its byte fields are CBOR
//! byte strings rather than arrays of integers. The canonical key order
//! for a [`SignDoc`] map (4 entries) is:
//!
//! | # | Key               | Encoded key prefix |
//! |---|-------------------|--------------------|
//! | 1 | `"chainId"`       | `0x67`             |
//! | 2 | `"bodyBytes"`     | `0x69`             |
//! | 3 | `"accountNumber"` | `0x6D` (`'a' 'c'`) |
//! | 4 | `"authInfoBytes"` | `0x6D` (`'a' 'u'`) |

use ciborium::Value;
use serde::Serialize;
use suncity_types::{Result, SuncityError};

use crate::transaction::{AuthInfo, SignDoc, SignedTx, TxBody};

fn encode_err(e: impl std::fmt::Display) -> SuncityError {
    SuncityError::SerializationError {
        reason: format!("CBOR serialization failed: {e}"),
    }
}

/// Encodes a single value with ciborium.
fn write_value(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(encode_err)?;
    Ok(buf)
}

/// Rewrites `value` into canonical form, recursively.
///
/// # Errors
///
/// Returns [`SuncityError::SerializationError`] on floats, tags or
/// duplicate map keys.
pub fn canonicalize(value: Value) -> Result<Value> {
    match value {
        Value::Float(_) => Err(SuncityError::SerializationError {
            reason: "floating-point values are not allowed in canonical documents".into(),
        }),
        Value::Tag(tag, _) => Err(SuncityError::SerializationError {
            reason: format!("CBOR tag {tag} is not allowed in canonical documents"),
        }),
        Value::Array(items) => Ok(Value::Array(
            items.into_iter().map(canonicalize).collect::<Result<_>>()?,
        )),
        Value::Map(entries) => {
            let mut keyed = Vec::with_capacity(entries.len());
            for (key, val) in entries {
                let key = canonicalize(key)?;
                let encoded = write_value(&key)?;
                keyed.push((encoded, key, canonicalize(val)?));
            }
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            if keyed.windows(2).any(|pair| pair[0].0 == pair[1].0) {
                return Err(SuncityError::SerializationError {
                    reason: "duplicate key in canonical map".into(),
                });
            }
            Ok(Value::Map(keyed.into_iter().map(|(_, k, v)| (k, v)).collect()))
        }
        other => Ok(other),
    }
}

/// Serializes any serde value to canonical CBOR bytes.
pub fn to_canonical_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let raw = Value::serialized(value).map_err(encode_err)?;
    write_value(&canonicalize(raw)?)
}

/// Canonical bytes of a transaction body.
pub fn encode_body(body: &TxBody) -> Result<Vec<u8>> {
    to_canonical_cbor(body)
}

/// Canonical bytes of auth info.
pub fn encode_auth_info(auth_info: &AuthInfo) -> Result<Vec<u8>> {
    to_canonical_cbor(auth_info)
}

/// The exact bytes that are hashed and signed for `doc`.
pub fn encode_sign_doc(doc: &SignDoc) -> Result<Vec<u8>> {
    let map = Value::Map(vec![
        (Value::Text("bodyBytes".into()), Value::Bytes(doc.body_bytes.clone())),
        (
            Value::Text("authInfoBytes".into()),
            Value::Bytes(doc.auth_info_bytes.clone()),
        ),
        (Value::Text("chainId".into()), Value::Text(doc.chain_id.clone())),
        (
            Value::Text("accountNumber".into()),
            Value::Integer(doc.account_number.into()),
        ),
    ]);
    write_value(&canonicalize(map)?)
}

/// Canonical bytes of a signed transaction, as broadcast.
pub fn encode_signed_tx(tx: &SignedTx) -> Result<Vec<u8>> {
    to_canonical_cbor(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_keys(value: &Value) -> Vec<String> {
        match value {
            Value::Map(entries) => entries
                .iter()
                .filter_map(|(k, _)| k.as_text().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn keys_sorted_length_first() -> std::result::Result<(), SuncityError> {
        let map = Value::Map(vec![
            (Value::Text("zz".into()), Value::Integer(1.into())),
            (Value::Text("aaa".into()), Value::Integer(2.into())),
            (Value::Text("b".into()), Value::Integer(3.into())),
            (Value::Text("ab".into()), Value::Integer(4.into())),
        ]);
        let sorted = canonicalize(map)?;
        assert_eq!(text_keys(&sorted), vec!["b", "ab", "zz", "aaa"]);
        Ok(())
    }

    #[test]
    fn sign_doc_key_order() -> std::result::Result<(), SuncityError> {
        let doc = SignDoc {
            body_bytes: vec![1, 2],
            auth_info_bytes: vec![3],
            chain_id: "rsuncitychain".into(),
            account_number: 9,
        };
        let bytes = encode_sign_doc(&doc)?;
        let decoded: Value = ciborium::from_reader(bytes.as_slice()).map_err(encode_err)?;
        assert_eq!(
            text_keys(&decoded),
            vec!["chainId", "bodyBytes", "accountNumber", "authInfoBytes"]
        );
        // Map header: 4 entries.
        assert_eq!(bytes[0], 0xa4);
        Ok(())
    }

    #[test]
    fn nested_maps_are_sorted() -> std::result::Result<(), SuncityError> {
        let inner = Value::Map(vec![
            (Value::Text("long".into()), Value::Null),
            (Value::Text("s".into()), Value::Null),
        ]);
        let outer = Value::Array(vec![inner]);
        match canonicalize(outer)? {
            Value::Array(items) => assert_eq!(text_keys(&items[0]), vec!["s", "long"]),
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn floats_and_duplicates_rejected() {
        assert!(canonicalize(Value::Float(1.5)).is_err());
        let dup = Value::Map(vec![
            (Value::Text("a".into()), Value::Null),
            (Value::Text("a".into()), Value::Bool(true)),
        ]);
        assert!(canonicalize(dup).is_err());
    }

    #[test]
    fn encoding_is_deterministic_across_field_order() -> std::result::Result<(), SuncityError> {
        #[derive(Serialize)]
        struct Forward {
            alpha: u8,
            be: u8,
        }
        #[derive(Serialize)]
        struct Backward {
            be: u8,
            alpha: u8,
        }
        let a = to_canonical_cbor(&Forward { alpha: 1, be: 2 })?;
        let b = to_canonical_cbor(&Backward { be: 2, alpha: 1 })?;
        assert_eq!(a, b);
        Ok(())
    }
}
