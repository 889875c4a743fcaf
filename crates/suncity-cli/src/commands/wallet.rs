//! Wallet lifecycle commands.

use suncity_wallet::{FileWalletStore, WalletInfo, WalletManager};

use crate::output;
use crate::GlobalOpts;

/// Opens a locked manager over the wallet file.
pub fn open(opts: &GlobalOpts) -> Result<WalletManager<FileWalletStore>, String> {
    WalletManager::new(
        FileWalletStore::new(&opts.wallet_path),
        opts.chain.clone(),
        opts.wallet.clone(),
    )
    .map_err(|e| e.to_string())
}

fn print_info(info: &WalletInfo, json: bool) {
    if json {
        output::print_value(info, true);
        return;
    }
    output::print_kv("Address", info.address.as_str());
    output::print_kv("Public key", &info.public_key);
    output::print_kv("Created", &info.created_at.to_rfc3339());
    output::print_kv("Origin", if info.imported { "imported" } else { "generated" });
    output::print_kv("Status", if info.unlocked { "unlocked" } else { "locked" });
}

pub fn create(opts: &GlobalOpts) -> Result<(), String> {
    let password = opts.password()?;
    let mut manager = open(opts)?;
    let created = manager.create(password).map_err(|e| e.to_string())?;

    if opts.json {
        let obj = serde_json::json!({
            "address": created.info.address,
            "publicKey": created.info.public_key,
            "mnemonic": created.mnemonic.as_str(),
        });
        println!("{obj}");
    } else {
        output::print_success(&format!("wallet created at {}", opts.wallet_path.display()), false);
        output::print_kv("Address", created.info.address.as_str());
        output::print_warning("write down the recovery phrase below; it will not be shown again", false);
        output::print_kv("Mnemonic", created.mnemonic.as_str());
    }
    Ok(())
}

pub fn import(opts: &GlobalOpts, mnemonic: &str) -> Result<(), String> {
    let password = opts.password()?;
    let mut manager = open(opts)?;
    let info = manager.import(mnemonic, password).map_err(|e| e.to_string())?;

    if !opts.json {
        output::print_success("wallet imported", false);
    }
    print_info(&info, opts.json);
    Ok(())
}

pub fn info(opts: &GlobalOpts) -> Result<(), String> {
    let mut manager = open(opts)?;
    let info = manager.info().map_err(|e| e.to_string())?;
    print_info(&info, opts.json);
    Ok(())
}

pub fn unlock(opts: &GlobalOpts) -> Result<(), String> {
    let password = opts.password()?;
    let mut manager = open(opts)?;
    let info = manager.unlock(password).map_err(|e| e.to_string())?;
    print_info(&info, opts.json);
    Ok(())
}

pub fn change_password(opts: &GlobalOpts, new_password: &str) -> Result<(), String> {
    let password = opts.password()?;
    let mut manager = open(opts)?;
    manager
        .change_password(password, new_password)
        .map_err(|e| e.to_string())?;
    output::print_success("password changed", opts.json);
    Ok(())
}

pub fn export_mnemonic(opts: &GlobalOpts) -> Result<(), String> {
    let password = opts.password()?;
    let manager = open(opts)?;
    let mnemonic = manager.export_mnemonic(password).map_err(|e| e.to_string())?;

    if opts.json {
        println!("{}", serde_json::json!({ "mnemonic": mnemonic.as_str() }));
    } else {
        output::print_warning("anyone with this phrase controls the wallet", false);
        output::print_kv("Mnemonic", mnemonic.as_str());
    }
    Ok(())
}

pub fn remove(opts: &GlobalOpts) -> Result<(), String> {
    let password = opts.password()?;
    let mut manager = open(opts)?;
    manager.remove(password).map_err(|e| e.to_string())?;
    output::print_success("wallet removed", opts.json);
    Ok(())
}
