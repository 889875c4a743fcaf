//! Config file support.
//!
//! Example `suncity.json`:
//! ```json
//! {
//!   "chain": { "chainId": "rsuncitychain", "bech32Prefix": "sunc" },
//!   "wallet": { "kdfIterations": 100000, "sessionTimeoutSecs": 1800 }
//! }
//! ```
//!
//! Missing sections and fields fall back to the built-in defaults.

use std::path::Path;

use serde::Deserialize;
use suncity_types::config::{ChainConfig, WalletConfig};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub chain: ChainConfig,
    pub wallet: WalletConfig,
}

/// Reads and validates the config file, or returns defaults when no path
/// was given.
pub fn load(path: Option<&Path>) -> Result<CliConfig, String> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };

    let text = std::fs::read_to_string(path).map_err(|e| format!("failed to read config file: {e}"))?;
    let cfg: CliConfig = serde_json::from_str(&text).map_err(|e| format!("invalid config JSON: {e}"))?;

    cfg.chain.validate().map_err(|e| e.to_string())?;
    cfg.wallet.validate().map_err(|e| e.to_string())?;
    tracing::debug!(path = %path.display(), chain_id = %cfg.chain.chain_id, "config loaded");
    Ok(cfg)
}
