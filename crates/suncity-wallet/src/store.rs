//! Persistence of the single wallet envelope.
//!
//! The surrounding application owns where the envelope lives; the
//! manager only talks to a [`WalletStore`]. Writes on one store are
//! serialized by an internal mutex, last writer wins.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use suncity_types::{Result, SuncityError};
use tracing::{debug, info};

use crate::envelope::EncryptedWallet;

/// Storage backend for the wallet envelope.
pub trait WalletStore: Send + Sync {
    /// Writes `wallet`, replacing any existing envelope.
    fn persist(&self, wallet: &EncryptedWallet) -> Result<()>;

    /// Reads the envelope, or `None` if nothing was persisted yet.
    fn load(&self) -> Result<Option<EncryptedWallet>>;

    /// Removes the envelope. Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;
}

fn lock_poisoned(e: impl std::fmt::Display) -> SuncityError {
    SuncityError::StorageError {
        reason: format!("wallet store lock poisoned: {e}"),
    }
}

// ---------------------------------------------------------------------------
// FileWalletStore
// ---------------------------------------------------------------------------

/// Stores the envelope as pretty-printed JSON at a fixed path.
///
/// Writes go to a sibling temp file first and are renamed into place,
/// so a crash never leaves a half-written envelope.
#[derive(Debug)]
pub struct FileWalletStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileWalletStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(lock_poisoned)
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl WalletStore for FileWalletStore {
    fn persist(&self, wallet: &EncryptedWallet) -> Result<()> {
        let _guard = self.guard()?;

        let json = serde_json::to_string_pretty(wallet).map_err(|e| SuncityError::SerializationError {
            reason: format!("failed to serialize wallet envelope: {e}"),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SuncityError::StorageError {
                reason: format!("failed to create {}: {e}", parent.display()),
            })?;
        }

        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, json.as_bytes()).map_err(|e| SuncityError::StorageError {
            reason: format!("failed to write wallet file: {e}"),
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            SuncityError::StorageError {
                reason: format!("failed to rename wallet file: {e}"),
            }
        })?;

        info!(path = %self.path.display(), "wallet envelope saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<EncryptedWallet>> {
        let _guard = self.guard()?;

        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no wallet envelope on disk");
                return Ok(None);
            }
            Err(e) => {
                return Err(SuncityError::StorageError {
                    reason: format!("failed to read wallet file: {e}"),
                })
            }
        };

        let wallet: EncryptedWallet = serde_json::from_str(&json).map_err(|e| SuncityError::StorageError {
            reason: format!("failed to parse wallet file: {e}"),
        })?;
        wallet.check_format()?;
        Ok(Some(wallet))
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.guard()?;
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "wallet envelope removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SuncityError::StorageError {
                reason: format!("failed to remove wallet file: {e}"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryWalletStore
// ---------------------------------------------------------------------------

/// In-process store, for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryWalletStore {
    slot: Mutex<Option<EncryptedWallet>>,
}

impl MemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletStore for MemoryWalletStore {
    fn persist(&self, wallet: &EncryptedWallet) -> Result<()> {
        *self.slot.lock().map_err(lock_poisoned)? = Some(wallet.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<EncryptedWallet>> {
        Ok(self.slot.lock().map_err(lock_poisoned)?.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().map_err(lock_poisoned)? = None;
        Ok(())
    }
}
