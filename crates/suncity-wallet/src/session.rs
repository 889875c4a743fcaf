//! Unlocked sessions with idle expiry.

use chrono::{DateTime, Duration, Utc};
use suncity_crypto::secp256k1::KeyPair;

/// Key material held while the wallet is unlocked.
///
/// Dropping the session drops the [`KeyPair`], whose private key is
/// zeroized on drop.
pub struct UnlockedSession {
    keypair: KeyPair,
    unlocked_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    timeout: Duration,
}

impl UnlockedSession {
    pub fn new(keypair: KeyPair, now: DateTime<Utc>, timeout: Duration) -> Self {
        Self {
            keypair,
            unlocked_at: now,
            last_activity: now,
            timeout,
        }
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    pub fn unlocked_at(&self) -> DateTime<Utc> {
        self.unlocked_at
    }

    /// Instant after which the session counts as locked.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.last_activity + self.timeout
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Records activity, pushing the expiry out by a full timeout.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }
}

impl std::fmt::Debug for UnlockedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockedSession")
            .field("unlocked_at", &self.unlocked_at)
            .field("expires_at", &self.expires_at())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use suncity_crypto::secp256k1::Secp256k1;

    use super::*;

    fn session(now: DateTime<Utc>) -> UnlockedSession {
        let ec = Secp256k1::new();
        let keypair = ec.generate_keypair().expect("keypair");
        UnlockedSession::new(keypair, now, Duration::seconds(60))
    }

    #[test]
    fn expires_after_timeout() {
        let start = Utc::now();
        let s = session(start);
        assert!(!s.is_expired_at(start + Duration::seconds(59)));
        assert!(s.is_expired_at(start + Duration::seconds(60)));
    }

    #[test]
    fn touch_extends_but_never_rewinds() {
        let start = Utc::now();
        let mut s = session(start);
        s.touch(start + Duration::seconds(50));
        assert!(!s.is_expired_at(start + Duration::seconds(100)));
        s.touch(start);
        assert_eq!(s.expires_at(), start + Duration::seconds(110));
        assert_eq!(s.unlocked_at(), start);
    }
}
