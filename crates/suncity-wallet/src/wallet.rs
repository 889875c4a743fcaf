//! Wallet lifecycle: create, import, unlock, lock, sign.
//!
//! A [`WalletManager`] owns one [`WalletStore`] and at most one
//! [`UnlockedSession`]. At rest only the sealed envelope exists; the
//! key pair lives in memory between `unlock` and `lock` (or session
//! expiry), and is dropped (and zeroized) afterwards.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use suncity_crypto::address::{AddressCodec, AddressValidation};
use suncity_crypto::hd::derive_keypair_from_mnemonic;
use suncity_crypto::mnemonic::{generate_mnemonic, Mnemonic, MnemonicPolicy};
use suncity_crypto::secp256k1::{KeyPair, Secp256k1, SignOptions};
use suncity_tx::signer::tx_hash;
use suncity_tx::validation::validate_transaction;
use suncity_tx::{SignedTx, SignerData, TxSigner, UnsignedTx};
use suncity_types::config::{ChainConfig, WalletConfig};
use suncity_types::{Address, Result, SuncityError};
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::envelope::{open, seal, verify_password, EncryptedWallet, WalletSecret, ENVELOPE_VERSION};
use crate::events::{LockReason, ObserverList, SubscriptionId, WalletEvent, WalletObserver};
use crate::session::UnlockedSession;
use crate::store::WalletStore;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Longest accepted password, in characters.
pub const MAX_PASSWORD_CHARS: usize = 128;

/// Sessions never outlive a year, whatever the configuration says.
const MAX_SESSION_SECS: i64 = 365 * 24 * 60 * 60;

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

// ---------------------------------------------------------------------------
// Public views
// ---------------------------------------------------------------------------

/// Public description of the stored wallet.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub address: Address,
    /// Compressed public key, hex.
    pub public_key: String,
    pub created_at: DateTime<Utc>,
    pub imported: bool,
    pub unlocked: bool,
}

/// Result of [`WalletManager::create`]. The mnemonic is handed out this
/// once; afterwards it exists only inside the envelope.
pub struct NewWallet {
    pub info: WalletInfo,
    pub mnemonic: Mnemonic,
}

// ---------------------------------------------------------------------------
// WalletManager
// ---------------------------------------------------------------------------

pub struct WalletManager<S: WalletStore> {
    store: S,
    chain: ChainConfig,
    config: WalletConfig,
    ec: Secp256k1,
    codec: AddressCodec,
    signer: TxSigner,
    session: Option<UnlockedSession>,
    observers: ObserverList,
    clock: Clock,
}

impl<S: WalletStore> WalletManager<S> {
    /// Validates both configurations and builds a locked manager.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::ConfigError`] for invalid configuration.
    pub fn new(store: S, chain: ChainConfig, config: WalletConfig) -> Result<Self> {
        chain.validate()?;
        config.validate()?;
        let signer = TxSigner::new(&chain)?.with_options(SignOptions {
            canonical: config.canonical_signatures,
        });
        Ok(Self {
            store,
            codec: AddressCodec::from_chain(&chain)?,
            ec: Secp256k1::new(),
            signer,
            chain,
            config,
            session: None,
            observers: ObserverList::default(),
            clock: Arc::new(Utc::now),
        })
    }

    /// Replaces the time source (session expiry, validation dates).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn policy(&self) -> MnemonicPolicy {
        MnemonicPolicy {
            reject_duplicates: self.config.reject_duplicate_words,
        }
    }

    fn load_required(&self) -> Result<EncryptedWallet> {
        self.store.load()?.ok_or(SuncityError::WalletNotFound)
    }

    /// Whether an envelope has been persisted.
    pub fn has_wallet(&self) -> Result<bool> {
        Ok(self.store.load()?.is_some())
    }

    // -- Creation ---------------------------------------------------------

    /// Generates a new mnemonic, seals it under `password`, persists the
    /// envelope and unlocks.
    ///
    /// # Errors
    ///
    /// - [`SuncityError::WalletExists`] if an envelope is already stored.
    /// - [`SuncityError::InvalidParameter`] for an unacceptable password.
    pub fn create(&mut self, password: &str) -> Result<NewWallet> {
        let mnemonic = generate_mnemonic(self.config.mnemonic_strength)?;
        let info = self.setup(&mnemonic, password, false)?;
        self.observers.emit(&WalletEvent::Created {
            address: info.address.clone(),
        });
        Ok(NewWallet { info, mnemonic })
    }

    /// Validates `phrase`, seals it under `password`, persists the
    /// envelope and unlocks.
    ///
    /// # Errors
    ///
    /// - [`SuncityError::Mnemonic`] if the phrase does not decode.
    /// - [`SuncityError::WalletExists`] if an envelope is already stored.
    pub fn import(&mut self, phrase: &str, password: &str) -> Result<WalletInfo> {
        let mnemonic = Mnemonic::parse(phrase, self.policy())?;
        let info = self.setup(&mnemonic, password, true)?;
        self.observers.emit(&WalletEvent::Imported {
            address: info.address.clone(),
        });
        Ok(info)
    }

    fn setup(&mut self, mnemonic: &Mnemonic, password: &str, imported: bool) -> Result<WalletInfo> {
        check_password(password)?;
        if self.store.load()?.is_some() {
            return Err(SuncityError::WalletExists);
        }

        let keypair = derive_keypair_from_mnemonic(&self.ec, mnemonic.as_str(), &self.chain.hd_path)?;
        let address = self.codec.derive_address(keypair.public_key())?;
        let secret = WalletSecret::new(mnemonic.as_str(), keypair.private_key().as_bytes());

        let envelope = EncryptedWallet {
            version: ENVELOPE_VERSION,
            encrypted: seal(&secret, password, self.config.kdf_iterations)?,
            public_key: keypair.public_key().to_hex(),
            address: address.clone(),
            created_at: self.now(),
            imported,
        };
        self.store.persist(&envelope)?;

        info!(address = %address, imported, "wallet sealed");
        self.start_session(keypair);
        Ok(self.info_for(&envelope))
    }

    // -- Session ----------------------------------------------------------

    /// Opens the envelope with `password` and starts a session.
    ///
    /// # Errors
    ///
    /// - [`SuncityError::WalletNotFound`] if nothing is stored.
    /// - [`SuncityError::InvalidPassword`] for a wrong password or a
    ///   tampered envelope.
    pub fn unlock(&mut self, password: &str) -> Result<WalletInfo> {
        let envelope = self.load_required()?;
        let secret: WalletSecret = open(&envelope.encrypted, password)?;

        let mut raw = secret.private_key_bytes()?;
        let private = self.ec.private_key_from_bytes(&raw);
        raw.zeroize();
        let keypair = self.ec.keypair_from_private(private?)?;
        if !keypair.public_key().to_hex().eq_ignore_ascii_case(&envelope.public_key) {
            return Err(SuncityError::CryptoError {
                reason: "decrypted key does not match wallet public key".into(),
            });
        }

        info!(address = %envelope.address, "wallet unlocked");
        self.start_session(keypair);
        self.observers.emit(&WalletEvent::Unlocked {
            address: envelope.address.clone(),
        });
        Ok(self.info_for(&envelope))
    }

    fn start_session(&mut self, keypair: KeyPair) {
        let secs = i64::try_from(self.config.session_timeout_secs)
            .unwrap_or(MAX_SESSION_SECS)
            .min(MAX_SESSION_SECS);
        let timeout = Duration::seconds(secs);
        self.session = Some(UnlockedSession::new(keypair, self.now(), timeout));
    }

    /// Ends the session, dropping the key pair. No-op when locked.
    pub fn lock(&mut self) {
        self.end_session(LockReason::Requested);
    }

    fn end_session(&mut self, reason: LockReason) {
        if self.session.take().is_some() {
            info!(?reason, "wallet locked");
            self.observers.emit(&WalletEvent::Locked { reason });
        }
    }

    /// Drops the session if its idle timeout has elapsed.
    fn expire_stale_session(&mut self) -> bool {
        let now = self.now();
        let expired = self.session.as_ref().is_some_and(|s| s.is_expired_at(now));
        if expired {
            self.end_session(LockReason::Expired);
        }
        expired
    }

    /// Whether a live session exists. Expired sessions are dropped here.
    pub fn is_unlocked(&mut self) -> bool {
        self.expire_stale_session();
        self.session.is_some()
    }

    /// The live session, refreshed for activity.
    ///
    /// # Errors
    ///
    /// - [`SuncityError::SessionExpired`] if the timeout elapsed (the
    ///   session is dropped).
    /// - [`SuncityError::WalletLocked`] if there is no session.
    pub fn session(&mut self) -> Result<&UnlockedSession> {
        if self.expire_stale_session() {
            return Err(SuncityError::SessionExpired);
        }
        let now = self.now();
        let session = self.session.as_mut().ok_or(SuncityError::WalletLocked)?;
        session.touch(now);
        Ok(session)
    }

    // -- Signing ----------------------------------------------------------

    /// Validates and signs `tx` with the session key.
    ///
    /// # Errors
    ///
    /// - [`SuncityError::WalletLocked`] / [`SuncityError::SessionExpired`].
    /// - [`SuncityError::InvalidTransaction`] if validation fails or the
    ///   session key is not the transaction's signer.
    pub fn sign_transaction(&mut self, tx: UnsignedTx, signer_data: SignerData) -> Result<SignedTx> {
        let today = self.now().date_naive();
        validate_transaction(&tx, &self.codec, today)?;

        self.session()?;
        let session = self.session.as_ref().ok_or(SuncityError::WalletLocked)?;
        let signed = self.signer.sign_transaction(tx, session.keypair(), signer_data)?;

        let hash = tx_hash(&signed)?;
        debug!(tx_hash = %hash, "transaction signed");
        self.observers.emit(&WalletEvent::TransactionSigned { tx_hash: hash });
        Ok(signed)
    }

    /// Verifies every signature on `tx` for this chain.
    pub fn verify_transaction(&self, tx: &SignedTx) -> bool {
        self.signer.verify_signed(tx)
    }

    // -- Password-gated operations ----------------------------------------

    /// Re-seals the envelope under `new_password` with a fresh salt and
    /// IV. Requires the current password even while unlocked.
    pub fn change_password(&mut self, old_password: &str, new_password: &str) -> Result<()> {
        check_password(new_password)?;
        let mut envelope = self.load_required()?;
        let secret: WalletSecret = open(&envelope.encrypted, old_password)?;

        envelope.encrypted = seal(&secret, new_password, self.config.kdf_iterations)?;
        self.store.persist(&envelope)?;

        info!(address = %envelope.address, "wallet password changed");
        self.observers.emit(&WalletEvent::PasswordChanged);
        Ok(())
    }

    /// Re-authenticates and returns the stored mnemonic.
    pub fn export_mnemonic(&self, password: &str) -> Result<Mnemonic> {
        let envelope = self.load_required()?;
        let secret: WalletSecret = open(&envelope.encrypted, password)?;
        Mnemonic::parse(secret.mnemonic(), MnemonicPolicy::default())
    }

    /// Deletes the stored wallet after checking `password`, and locks.
    pub fn remove(&mut self, password: &str) -> Result<()> {
        let envelope = self.load_required()?;
        if !verify_password(&envelope.encrypted, password)? {
            return Err(SuncityError::InvalidPassword);
        }
        self.store.clear()?;
        info!(address = %envelope.address, "wallet removed");
        self.end_session(LockReason::Removed);
        Ok(())
    }

    // -- Queries ----------------------------------------------------------

    /// Public description of the stored wallet.
    pub fn info(&mut self) -> Result<WalletInfo> {
        let envelope = self.load_required()?;
        self.expire_stale_session();
        Ok(self.info_for(&envelope))
    }

    fn info_for(&self, envelope: &EncryptedWallet) -> WalletInfo {
        WalletInfo {
            address: envelope.address.clone(),
            public_key: envelope.public_key.clone(),
            created_at: envelope.created_at,
            imported: envelope.imported,
            unlocked: self.session.is_some(),
        }
    }

    // -- Observers --------------------------------------------------------

    pub fn subscribe(&mut self, observer: Arc<dyn WalletObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Returns whether `id` was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

// ---------------------------------------------------------------------------
// Stateless helpers
// ---------------------------------------------------------------------------

/// Address for SEC1 public key bytes (33 or 65) on `chain`.
pub fn derive_address(public_key: &[u8], chain: &ChainConfig) -> Result<Address> {
    AddressCodec::from_chain(chain)?.derive_address_from_bytes(&Secp256k1::new(), public_key)
}

/// Reports whether `address` is a valid account address on `chain`.
pub fn validate_address(address: &str, chain: &ChainConfig) -> AddressValidation {
    match AddressCodec::from_chain(chain) {
        Ok(codec) => codec.validate(address),
        Err(_) => AddressValidation {
            valid: false,
            error: None,
        },
    }
}

/// Passwords are 8 to 128 characters.
pub fn check_password(password: &str) -> Result<()> {
    let chars = password.chars().count();
    if !(MIN_PASSWORD_CHARS..=MAX_PASSWORD_CHARS).contains(&chars) {
        return Err(SuncityError::InvalidParameter {
            reason: format!("password must be {MIN_PASSWORD_CHARS} to {MAX_PASSWORD_CHARS} characters"),
        });
    }
    Ok(())
}
