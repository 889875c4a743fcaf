//! Wallet lifecycle management for the Suncity wallet core.
//!
//! Handles the full wallet lifecycle:
//!
//! - **Create** from a freshly generated BIP39 mnemonic
//! - **Import** an existing mnemonic
//! - **Seal** the mnemonic and private key in a password envelope
//!   (PBKDF2-HMAC-SHA256 + AES-256-GCM)
//! - **Unlock / Lock** with idle session expiry
//! - **Sign** validated transactions with the session key
//! - **Change password** and **export** the mnemonic after
//!   re-authentication
//! - **Observe** lifecycle events

pub mod envelope;
pub mod events;
pub mod session;
pub mod store;
pub mod wallet;

pub use envelope::EncryptedWallet;
pub use events::{LockReason, SubscriptionId, WalletEvent, WalletObserver};
pub use store::{FileWalletStore, MemoryWalletStore, WalletStore};
pub use wallet::{derive_address, validate_address, NewWallet, WalletInfo, WalletManager};
