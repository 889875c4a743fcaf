//! Transactions for the Republic of Suncity chain.
//!
//! A transaction moves through two states: [`transaction::UnsignedTx`]
//! is validated and signed into a [`transaction::SignedTx`], which an
//! external broadcaster submits. Everything that is hashed or signed is
//! encoded as deterministic CBOR.
//!
//! # Modules
//!
//! - [`message`]: typed chain messages and coins
//! - [`transaction`]: body, auth info, sign doc and signed forms
//! - [`canonical`]: deterministic CBOR encoding
//! - [`signer`]: sign doc construction, signing, verification, tx hash
//! - [`fee`]: gas fees and display/minimal unit conversion
//! - [`validation`]: field checks run before signing

pub mod canonical;
pub mod fee;
pub mod message;
pub mod signer;
pub mod transaction;
pub mod validation;

pub use message::{Coin, TxMessage};
pub use signer::{tx_hash, TxSigner};
pub use transaction::{Fee, SignDoc, SignedTx, SignerData, UnsignedTx};
