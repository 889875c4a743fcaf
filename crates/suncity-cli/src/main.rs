//! Suncity wallet CLI.
//!
//! Operates on a local wallet file. Every invocation is one-shot: the
//! wallet is unlocked for the duration of a single command and locked
//! again on exit.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use suncity_types::config::{ChainConfig, WalletConfig};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Suncity wallet: keys, addresses and transaction signing for rsuncitychain.
#[derive(Parser)]
#[command(name = "suncity", version, about)]
struct Cli {
    /// Output in JSON format (no colors, machine-readable).
    #[arg(long, global = true)]
    json: bool,

    /// Path of the encrypted wallet file.
    #[arg(long, global = true, env = "SUNCITY_WALLET", default_value = "wallet.json")]
    wallet: PathBuf,

    /// JSON file with `chain` and `wallet` configuration overrides.
    #[arg(long, global = true, env = "SUNCITY_CONFIG")]
    config: Option<PathBuf>,

    /// Wallet password.
    #[arg(long, global = true, env = "SUNCITY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new wallet and print its recovery phrase.
    Create,
    /// Import a wallet from a recovery phrase.
    Import {
        /// BIP39 recovery phrase.
        #[arg(long, env = "SUNCITY_MNEMONIC", hide_env_values = true)]
        mnemonic: String,
    },
    /// Show the stored wallet.
    Info,
    /// Check the password and show the unlocked wallet.
    Unlock,
    /// Re-encrypt the wallet under a new password.
    ChangePassword {
        #[arg(long, env = "SUNCITY_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Print the recovery phrase after re-entering the password.
    ExportMnemonic,
    /// Delete the wallet file.
    Remove,
    /// Sign an unsigned transaction read from a JSON file.
    Sign(commands::tx::SignArgs),
    /// Build and sign a token transfer from this wallet.
    #[command(alias = "send")]
    Transfer(commands::tx::TransferArgs),
    /// Compute the fee for a gas limit and price tier.
    Fee(commands::tx::FeeArgs),
    /// Derive the account address of a public key.
    Address {
        /// SEC1 public key, hex (compressed or uncompressed).
        #[arg(long)]
        pubkey: String,
    },
    /// Check whether a string is a valid account address.
    ValidateAddress { address: String },
}

// ---------------------------------------------------------------------------
// Global options passed to every command handler
// ---------------------------------------------------------------------------

/// Shared options threaded into command handlers.
pub struct GlobalOpts {
    pub json: bool,
    pub wallet_path: PathBuf,
    pub chain: ChainConfig,
    pub wallet: WalletConfig,
    pub password: Option<String>,
}

impl GlobalOpts {
    pub fn password(&self) -> Result<&str, String> {
        self.password
            .as_deref()
            .ok_or_else(|| "password required: pass --password or set SUNCITY_PASSWORD".to_string())
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    // Logs go to stderr so JSON output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let result = config::load(cli.config.as_deref()).and_then(|cfg| {
        let opts = GlobalOpts {
            json: cli.json,
            wallet_path: cli.wallet,
            chain: cfg.chain,
            wallet: cfg.wallet,
            password: cli.password,
        };
        dispatch(&opts, cli.command)
    });

    if let Err(e) = result {
        output::print_error(&e, json);
        std::process::exit(1);
    }
}

fn dispatch(opts: &GlobalOpts, cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Create => commands::wallet::create(opts),
        Commands::Import { mnemonic } => commands::wallet::import(opts, &mnemonic),
        Commands::Info => commands::wallet::info(opts),
        Commands::Unlock => commands::wallet::unlock(opts),
        Commands::ChangePassword { new_password } => commands::wallet::change_password(opts, &new_password),
        Commands::ExportMnemonic => commands::wallet::export_mnemonic(opts),
        Commands::Remove => commands::wallet::remove(opts),
        Commands::Sign(args) => commands::tx::sign(opts, args),
        Commands::Transfer(args) => commands::tx::transfer(opts, args),
        Commands::Fee(args) => commands::tx::fee(opts, args),
        Commands::Address { pubkey } => commands::address::derive(opts, &pubkey),
        Commands::ValidateAddress { address } => commands::address::validate(opts, &address),
    }
}
