//! Transaction commands: signing, transfers and fee estimates.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use suncity_tx::fee::{calculate_fee, format_coin, parse_amount};
use suncity_tx::{tx_hash, Coin, SignedTx, SignerData, TxMessage, UnsignedTx};
use suncity_types::config::{GasPriceTier, DEFAULT_GAS_LIMIT};

use crate::commands::wallet::open;
use crate::output;
use crate::GlobalOpts;

#[derive(Clone, Copy, ValueEnum)]
pub enum Tier {
    Low,
    Average,
    High,
}

impl From<Tier> for GasPriceTier {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Low => GasPriceTier::Low,
            Tier::Average => GasPriceTier::Average,
            Tier::High => GasPriceTier::High,
        }
    }
}

/// Chain state of the signing account.
#[derive(Args)]
pub struct AccountArgs {
    #[arg(long, default_value_t = 0)]
    account_number: u64,
    #[arg(long, default_value_t = 0)]
    sequence: u64,
}

impl From<&AccountArgs> for SignerData {
    fn from(args: &AccountArgs) -> Self {
        SignerData {
            account_number: args.account_number,
            sequence: args.sequence,
        }
    }
}

#[derive(Args)]
pub struct SignArgs {
    /// Unsigned transaction JSON file, or `-` for stdin.
    #[arg(long)]
    tx: PathBuf,
    #[command(flatten)]
    account: AccountArgs,
}

#[derive(Args)]
pub struct TransferArgs {
    /// Recipient address.
    #[arg(long)]
    to: String,
    /// Amount in display units, e.g. `2.5`.
    #[arg(long)]
    amount: String,
    #[arg(long, default_value = "")]
    memo: String,
    #[arg(long, default_value_t = DEFAULT_GAS_LIMIT)]
    gas: u64,
    #[arg(long, value_enum, default_value_t = Tier::Average)]
    tier: Tier,
    #[command(flatten)]
    account: AccountArgs,
}

#[derive(Args)]
pub struct FeeArgs {
    #[arg(long, default_value_t = DEFAULT_GAS_LIMIT)]
    gas: u64,
    #[arg(long, value_enum, default_value_t = Tier::Average)]
    tier: Tier,
}

fn read_unsigned(path: &Path) -> Result<UnsignedTx, String> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?
    };
    serde_json::from_str(&text).map_err(|e| format!("invalid transaction JSON: {e}"))
}

fn sign_and_print(opts: &GlobalOpts, tx: UnsignedTx, data: SignerData) -> Result<(), String> {
    let password = opts.password()?;
    let mut manager = open(opts)?;
    manager.unlock(password).map_err(|e| e.to_string())?;
    let signed: SignedTx = manager.sign_transaction(tx, data).map_err(|e| e.to_string())?;
    manager.lock();

    let hash = tx_hash(&signed).map_err(|e| e.to_string())?;
    if opts.json {
        output::print_value(&serde_json::json!({ "txHash": hash, "tx": signed }), true);
    } else {
        output::print_success("transaction signed", false);
        output::print_kv("Tx hash", &hash);
        output::print_value(&signed, false);
    }
    Ok(())
}

pub fn sign(opts: &GlobalOpts, args: SignArgs) -> Result<(), String> {
    let tx = read_unsigned(&args.tx)?;
    sign_and_print(opts, tx, SignerData::from(&args.account))
}

pub fn transfer(opts: &GlobalOpts, args: TransferArgs) -> Result<(), String> {
    let chain = &opts.chain;
    let amount = parse_amount(&args.amount, chain.decimals).map_err(|e| e.to_string())?;
    let fee = calculate_fee(chain, args.gas, args.tier.into()).map_err(|e| e.to_string())?;

    let from = open(opts)?.info().map_err(|e| e.to_string())?.address;
    let msg = TxMessage::send(from.into_string(), args.to, Coin::new(chain.minimal_denom.as_str(), amount));
    let tx = UnsignedTx::new(vec![msg], fee, args.memo);

    sign_and_print(opts, tx, SignerData::from(&args.account))
}

pub fn fee(opts: &GlobalOpts, args: FeeArgs) -> Result<(), String> {
    let fee = calculate_fee(&opts.chain, args.gas, args.tier.into()).map_err(|e| e.to_string())?;

    if opts.json {
        output::print_value(&fee, true);
        return Ok(());
    }
    output::print_kv("Gas limit", &fee.gas_limit.to_string());
    for coin in &fee.amount {
        output::print_kv("Fee", &format_coin(coin, &opts.chain));
    }
    Ok(())
}
