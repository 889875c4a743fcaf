//! Chain-prefixed account addresses.
//!
//! `address = bech32(prefix, RIPEMD160(SHA256(compressed_pubkey)))`.

use serde::{Deserialize, Serialize};
use suncity_types::config::{ChainConfig, MAX_BECH32_PREFIX_LEN};
use suncity_types::{Address, Bech32Error, Result, SuncityError};

use crate::bech32;
use crate::hash::hash160;
use crate::secp256k1::{PublicKey, Secp256k1};

/// Length of the account hash carried in an address.
pub const ADDRESS_HASH_LEN: usize = 20;

const MAX_PREFIX_LEN: usize = MAX_BECH32_PREFIX_LEN;

/// Outcome of [`AddressCodec::validate`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Bech32Error>,
}

/// Encodes and decodes addresses for one chain prefix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressCodec {
    prefix: String,
}

impl AddressCodec {
    /// # Errors
    ///
    /// Returns [`SuncityError::InvalidParameter`] if `prefix` is empty,
    /// too long, or not lowercase printable ASCII.
    pub fn new(prefix: &str) -> Result<Self> {
        if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN {
            return Err(SuncityError::InvalidParameter {
                reason: format!("address prefix must be 1..={MAX_PREFIX_LEN} characters"),
            });
        }
        if !prefix
            .bytes()
            .all(|b| (33..=126).contains(&b) && !b.is_ascii_uppercase())
        {
            return Err(SuncityError::InvalidParameter {
                reason: format!("address prefix '{prefix}' must be lowercase printable ASCII"),
            });
        }
        Ok(Self {
            prefix: prefix.to_string(),
        })
    }

    /// Codec for the chain's account prefix.
    pub fn from_chain(chain: &ChainConfig) -> Result<Self> {
        Self::new(&chain.bech32_prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Encodes an arbitrary payload under this prefix.
    pub fn encode(&self, payload: &[u8]) -> Result<String> {
        bech32::encode(&self.prefix, payload)
    }

    /// Decodes `address` and checks that it carries this codec's prefix.
    ///
    /// # Errors
    ///
    /// Any [`bech32::decode`] failure, or [`Bech32Error::InvalidPrefix`].
    pub fn decode(&self, address: &str) -> Result<Vec<u8>> {
        let (hrp, payload) = bech32::decode(address)?;
        if hrp != self.prefix {
            return Err(Bech32Error::InvalidPrefix {
                expected: self.prefix.clone(),
                found: hrp,
            }
            .into());
        }
        Ok(payload)
    }

    /// Decodes an account address, requiring a 20-byte payload, and
    /// returns it normalized to lowercase.
    pub fn parse(&self, address: &str) -> Result<Address> {
        let payload = self.decode(address)?;
        if payload.len() != ADDRESS_HASH_LEN {
            return Err(Bech32Error::InvalidLength {
                len: payload.len(),
                min: ADDRESS_HASH_LEN,
                max: ADDRESS_HASH_LEN,
            }
            .into());
        }
        Ok(Address::new_unchecked(address.to_ascii_lowercase()))
    }

    /// Address of `public_key` (hash of the compressed encoding).
    pub fn derive_address(&self, public_key: &PublicKey) -> Result<Address> {
        let encoded = self.encode(&hash160(&public_key.to_compressed()))?;
        Ok(Address::new_unchecked(encoded))
    }

    /// Address for raw SEC1 bytes, compressed or not.
    pub fn derive_address_from_bytes(&self, ec: &Secp256k1, public_key: &[u8]) -> Result<Address> {
        let parsed = ec.parse_public_key(public_key)?;
        self.derive_address(&parsed)
    }

    /// Reports whether `address` is a valid account address for this
    /// prefix without raising.
    pub fn validate(&self, address: &str) -> AddressValidation {
        match self.parse(address) {
            Ok(_) => AddressValidation {
                valid: true,
                error: None,
            },
            Err(SuncityError::InvalidAddress(kind)) => AddressValidation {
                valid: false,
                error: Some(kind),
            },
            Err(_) => AddressValidation {
                valid: false,
                error: None,
            },
        }
    }

    pub fn is_valid(&self, address: &str) -> bool {
        self.validate(address).valid
    }
}
