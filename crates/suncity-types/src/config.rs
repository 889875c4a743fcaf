//! Chain and wallet configuration with sensible defaults.
//!
//! Defaults describe the Republic of Suncity chain (`rsuncitychain`,
//! bech32 prefix `sunc`). Both structs deserialize from camelCase JSON
//! and fill missing fields from [`Default`].

use serde::{Deserialize, Serialize};

use crate::{Result, SuncityError};

/// Default BIP44 path for Cosmos-style chains (coin type 118).
pub const DEFAULT_HD_PATH: &str = "m/44'/118'/0'/0/0";

/// Gas limit used when the caller supplies none.
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Longest bech32 prefix that still fits a 20-byte account address in
/// the 83-character bech32 limit: `83 - 1 - 32 - 6`.
pub const MAX_BECH32_PREFIX_LEN: usize = 44;

/// Upper bound on any gas price tier, in minimal units per unit of gas.
pub const MAX_GAS_PRICE: f64 = 1_000_000.0;

// ---------------------------------------------------------------------------
// Gas prices
// ---------------------------------------------------------------------------

/// Named gas price tier.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasPriceTier {
    /// Cheapest tier.
    Low,
    /// Default tier.
    #[default]
    Average,
    /// Fastest tier.
    High,
}

/// Gas price per tier, in minimal denomination units per unit of gas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GasPriceStep {
    pub low: f64,
    pub average: f64,
    pub high: f64,
}

impl Default for GasPriceStep {
    fn default() -> Self {
        Self {
            low: 0.01,
            average: 0.025,
            high: 0.04,
        }
    }
}

impl GasPriceStep {
    /// Returns the price for `tier`.
    pub fn price(&self, tier: GasPriceTier) -> f64 {
        match tier {
            GasPriceTier::Low => self.low,
            GasPriceTier::Average => self.average,
            GasPriceTier::High => self.high,
        }
    }
}

// ---------------------------------------------------------------------------
// ChainConfig
// ---------------------------------------------------------------------------

/// Static description of the target chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainConfig {
    /// Chain id committed into every sign document.
    pub chain_id: String,
    /// Display name.
    pub chain_name: String,
    /// Human-readable part of account addresses.
    pub bech32_prefix: String,
    /// Human-readable part of bech32 public keys.
    pub bech32_pub_prefix: String,
    /// Display denomination (e.g. `SUNC`).
    pub coin_denom: String,
    /// On-chain minimal denomination (e.g. `sunc`).
    pub minimal_denom: String,
    /// Decimal places between display and minimal units.
    pub decimals: u8,
    /// Gas prices per tier.
    pub gas_price_step: GasPriceStep,
    /// Key derivation path for the account key.
    pub hd_path: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: "rsuncitychain".into(),
            chain_name: "Republic of Suncity".into(),
            bech32_prefix: "sunc".into(),
            bech32_pub_prefix: "suncpub".into(),
            coin_denom: "SUNC".into(),
            minimal_denom: "sunc".into(),
            decimals: 6,
            gas_price_step: GasPriceStep::default(),
            hd_path: DEFAULT_HD_PATH.into(),
        }
    }
}

impl ChainConfig {
    /// Validates all configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.chain_id.is_empty() {
            return Err(SuncityError::ConfigError {
                reason: "chainId must not be empty".into(),
            });
        }

        // Printable ASCII, lowercase, short enough to encode an account address.
        for (name, hrp) in [
            ("bech32Prefix", &self.bech32_prefix),
            ("bech32PubPrefix", &self.bech32_pub_prefix),
        ] {
            if hrp.is_empty()
                || hrp.len() > MAX_BECH32_PREFIX_LEN
                || !hrp.bytes().all(|b| (33..=126).contains(&b) && !b.is_ascii_uppercase())
            {
                return Err(SuncityError::ConfigError {
                    reason: format!("{name} '{hrp}' is not a valid lowercase bech32 prefix"),
                });
            }
        }

        if self.minimal_denom.is_empty() {
            return Err(SuncityError::ConfigError {
                reason: "minimalDenom must not be empty".into(),
            });
        }

        if self.decimals > 18 {
            return Err(SuncityError::ConfigError {
                reason: "decimals must be 0..=18".into(),
            });
        }

        let step = &self.gas_price_step;
        for price in [step.low, step.average, step.high] {
            if !price.is_finite() || !(0.0..=MAX_GAS_PRICE).contains(&price) {
                return Err(SuncityError::ConfigError {
                    reason: format!("gas price {price} must be a finite number in 0..={MAX_GAS_PRICE}"),
                });
            }
        }
        if !(step.low <= step.average && step.average <= step.high) {
            return Err(SuncityError::ConfigError {
                reason: "gas prices must satisfy low <= average <= high".into(),
            });
        }

        if !self.hd_path.starts_with("m/") {
            return Err(SuncityError::ConfigError {
                reason: format!("hdPath '{}' must start with 'm/'", self.hd_path),
            });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// WalletConfig
// ---------------------------------------------------------------------------

/// Tunables for wallet creation, encryption and sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletConfig {
    /// PBKDF2-HMAC-SHA256 iterations for the envelope key.
    ///
    /// Stored inside each envelope, so changing it only affects newly
    /// written envelopes.
    pub kdf_iterations: u32,

    /// Entropy strength in bits for newly generated mnemonics.
    pub mnemonic_strength: u32,

    /// Reject mnemonics that repeat a word. Off by default since BIP39
    /// permits repeats.
    pub reject_duplicate_words: bool,

    /// Idle lifetime of an unlocked session, in seconds.
    pub session_timeout_secs: u64,

    /// Produce low-s signatures.
    pub canonical_signatures: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: 100_000,
            mnemonic_strength: 128,
            reject_duplicate_words: false,
            session_timeout_secs: 30 * 60,
            canonical_signatures: true,
        }
    }
}

impl WalletConfig {
    /// Validates all configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.kdf_iterations == 0 {
            return Err(SuncityError::ConfigError {
                reason: "kdfIterations must be greater than 0".into(),
            });
        }

        if ![128, 160, 192, 224, 256].contains(&self.mnemonic_strength) {
            return Err(SuncityError::ConfigError {
                reason: format!(
                    "mnemonicStrength {} must be one of 128, 160, 192, 224, 256",
                    self.mnemonic_strength
                ),
            });
        }

        if self.session_timeout_secs == 0 {
            return Err(SuncityError::ConfigError {
                reason: "sessionTimeoutSecs must be greater than 0".into(),
            });
        }

        Ok(())
    }
}
