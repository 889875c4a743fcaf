//! Transaction documents: body, auth info, sign doc and signed form.
//!
//! Lifecycle: [`UnsignedTx`] → (sign) → [`SignedTx`] → broadcast by an
//! external collaborator. Binary fields serialize as lowercase hex.

use serde::{Deserialize, Serialize};

use crate::message::{as_string, Coin, TxMessage};

/// Type URL of a secp256k1 public key in signer infos.
pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";

/// Longest memo accepted, in characters.
pub const MAX_MEMO_CHARS: usize = 256;

/// Hex (de)serialization of byte vectors.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        hex::decode(raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Fee
// ---------------------------------------------------------------------------

/// Fee paid for a transaction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    pub amount: Vec<Coin>,
    #[serde(with = "as_string")]
    pub gas_limit: u64,
    /// Fee payer address; empty means the first signer.
    #[serde(default)]
    pub payer: String,
    /// Fee granter address; empty means none.
    #[serde(default)]
    pub granter: String,
}

impl Fee {
    pub fn new(amount: Coin, gas_limit: u64) -> Self {
        Self {
            amount: vec![amount],
            gas_limit,
            payer: String::new(),
            granter: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Body / auth info
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxBody {
    pub messages: Vec<TxMessage>,
    #[serde(default)]
    pub memo: String,
    #[serde(default, with = "as_string")]
    pub timeout_height: u64,
}

/// The only supported signing mode.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum SignMode {
    #[default]
    #[serde(rename = "SIGN_MODE_DIRECT")]
    Direct,
}

/// A typed public key, as listed in signer infos.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxPublicKey {
    pub type_url: String,
    /// Compressed SEC1 key, hex.
    pub key: String,
}

impl TxPublicKey {
    /// Wraps a compressed secp256k1 key.
    pub fn secp256k1(compressed: &[u8]) -> Self {
        Self {
            type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
            key: hex::encode(compressed),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerInfo {
    pub public_key: TxPublicKey,
    #[serde(with = "as_string")]
    pub sequence: u64,
    #[serde(default)]
    pub sign_mode: SignMode,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    #[serde(default)]
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Fee,
}

// ---------------------------------------------------------------------------
// Unsigned / signed
// ---------------------------------------------------------------------------

/// A transaction awaiting signatures.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
}

impl UnsignedTx {
    /// Builds a transaction with no signer infos yet.
    pub fn new(messages: Vec<TxMessage>, fee: Fee, memo: impl Into<String>) -> Self {
        Self {
            body: TxBody {
                messages,
                memo: memo.into(),
                timeout_height: 0,
            },
            auth_info: AuthInfo {
                signer_infos: Vec::new(),
                fee,
            },
        }
    }
}

/// Per-signer chain state bound into the sign doc.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerData {
    #[serde(with = "as_string")]
    pub account_number: u64,
    #[serde(with = "as_string")]
    pub sequence: u64,
}

/// The document whose SHA-256 digest is signed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignDoc {
    #[serde(with = "hex_bytes")]
    pub body_bytes: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub auth_info_bytes: Vec<u8>,
    pub chain_id: String,
    #[serde(with = "as_string")]
    pub account_number: u64,
}

/// One attached signature.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxSignature {
    /// Compressed SEC1 public key of the signer, hex.
    pub public_key: String,
    /// DER-encoded ECDSA signature, hex.
    pub signature: String,
    #[serde(with = "as_string")]
    pub account_number: u64,
}

/// A transaction with one signature per signer info, in the same order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    pub signatures: Vec<TxSignature>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_json_shape() -> std::result::Result<(), serde_json::Error> {
        let fee = Fee::new(Coin::new("sunc", 5000), 200_000);
        let json = serde_json::to_value(&fee)?;
        assert_eq!(json["gasLimit"], "200000");
        assert_eq!(json["payer"], "");
        assert_eq!(json["granter"], "");
        Ok(())
    }

    #[test]
    fn signer_info_defaults_to_direct() -> std::result::Result<(), serde_json::Error> {
        let json = serde_json::json!({
            "publicKey": {"typeUrl": SECP256K1_PUBKEY_TYPE_URL, "key": "02ab"},
            "sequence": "7"
        });
        let info: SignerInfo = serde_json::from_value(json)?;
        assert_eq!(info.sequence, 7);
        assert_eq!(info.sign_mode, SignMode::Direct);
        assert_eq!(serde_json::to_value(info.sign_mode)?, "SIGN_MODE_DIRECT");
        Ok(())
    }

    #[test]
    fn sign_doc_bytes_are_hex() -> std::result::Result<(), serde_json::Error> {
        let doc = SignDoc {
            body_bytes: vec![0xde, 0xad],
            auth_info_bytes: vec![0xbe, 0xef],
            chain_id: "rsuncitychain".into(),
            account_number: 3,
        };
        let json = serde_json::to_value(&doc)?;
        assert_eq!(json["bodyBytes"], "dead");
        assert_eq!(json["authInfoBytes"], "beef");
        assert_eq!(json["accountNumber"], "3");
        let back: SignDoc = serde_json::from_value(json)?;
        assert_eq!(back, doc);
        Ok(())
    }
}
