//! Stateless address commands. No wallet file is touched.

use suncity_wallet::{derive_address, validate_address};

use crate::output;
use crate::GlobalOpts;

pub fn derive(opts: &GlobalOpts, pubkey: &str) -> Result<(), String> {
    let bytes = hex::decode(pubkey.trim()).map_err(|e| format!("public key is not valid hex: {e}"))?;
    let address = derive_address(&bytes, &opts.chain).map_err(|e| e.to_string())?;

    if opts.json {
        println!("{}", serde_json::json!({ "address": address }));
    } else {
        output::print_kv("Address", address.as_str());
    }
    Ok(())
}

/// Exits non-zero for an invalid address.
pub fn validate(opts: &GlobalOpts, address: &str) -> Result<(), String> {
    let result = validate_address(address, &opts.chain);
    let error = result.error.map(|e| e.to_string());

    if opts.json {
        println!("{}", serde_json::json!({ "valid": result.valid, "error": error }));
    } else if result.valid {
        output::print_success(&format!("{address} is a valid {} address", opts.chain.chain_id), false);
    }

    if result.valid {
        return Ok(());
    }
    Err(error.unwrap_or_else(|| "invalid address".into()))
}
