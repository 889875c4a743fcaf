//! Wallet lifecycle events and their observers.
//!
//! Observers are registered on a [`crate::wallet::WalletManager`] and
//! called synchronously, in registration order, on the thread that
//! performed the operation. There is no global registry.

use std::sync::Arc;

use suncity_types::Address;

// ---------------------------------------------------------------------------
// WalletEvent
// ---------------------------------------------------------------------------

/// Why a session ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LockReason {
    /// [`crate::wallet::WalletManager::lock`] was called.
    Requested,
    /// The idle timeout elapsed.
    Expired,
    /// The wallet was removed.
    Removed,
}

/// Events emitted by the wallet manager. None carries secret material.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WalletEvent {
    /// A new mnemonic was generated and sealed.
    Created { address: Address },

    /// An existing mnemonic was imported and sealed.
    Imported { address: Address },

    /// The envelope was opened and a session started.
    Unlocked { address: Address },

    /// The session ended and its keys were dropped.
    Locked { reason: LockReason },

    /// The envelope was re-sealed under a new password.
    PasswordChanged,

    /// A transaction was signed in the current session.
    TransactionSigned {
        /// Uppercase hex hash of the signed transaction.
        tx_hash: String,
    },
}

// ---------------------------------------------------------------------------
// Observers
// ---------------------------------------------------------------------------

/// Receives [`WalletEvent`]s.
pub trait WalletObserver: Send + Sync {
    fn on_event(&self, event: &WalletEvent);
}

impl<F> WalletObserver for F
where
    F: Fn(&WalletEvent) + Send + Sync,
{
    fn on_event(&self, event: &WalletEvent) {
        self(event)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered observer list.
#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    observers: Vec<(SubscriptionId, Arc<dyn WalletObserver>)>,
}

impl ObserverList {
    pub(crate) fn subscribe(&mut self, observer: Arc<dyn WalletObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub(crate) fn emit(&self, event: &WalletEvent) {
        for (_, observer) in &self.observers {
            observer.on_event(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn dispatch_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::default();

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            list.subscribe(Arc::new(move |_: &WalletEvent| {
                seen.lock().expect("lock").push(tag);
            }));
        }
        list.emit(&WalletEvent::PasswordChanged);

        assert_eq!(*seen.lock().expect("lock"), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribe_removes_only_that_observer() {
        let mut list = ObserverList::default();
        let a = list.subscribe(Arc::new(|_: &WalletEvent| {}));
        let _b = list.subscribe(Arc::new(|_: &WalletEvent| {}));

        assert!(list.unsubscribe(a));
        assert!(!list.unsubscribe(a));
        assert_eq!(list.len(), 1);
    }
}
