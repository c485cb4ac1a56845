//! Exchange Guard
//!
//! Keeps an authorization code from being exchanged twice. The guard holds
//! a processed marker per code plus a single in-flight flag; a callback
//! processor consults it before starting an exchange. Share one guard
//! (behind an `Arc`) between every processor serving the same user session.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Prefix of processed-marker keys.
pub const MARKER_PREFIX: &str = "oauth_processed_";

/// Why a callback was not processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No authorization code in the callback.
    NoCode,
    /// This code was already exchanged.
    AlreadyProcessed,
    /// Another exchange is running.
    InFlight,
}

/// Marker key for an authorization code. Derived from a digest so the
/// code itself is never retained.
pub fn marker_key(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    format!("{}{}", MARKER_PREFIX, URL_SAFE_NO_PAD.encode(digest))
}

#[derive(Default)]
struct GuardState {
    in_flight: bool,
    processed: HashSet<String>,
}

/// Idempotency state for code exchanges.
#[derive(Default)]
pub struct ExchangeGuard {
    state: Mutex<GuardState>,
}

impl ExchangeGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GuardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `code` for exchange. On success the code is marked processed
    /// and the in-flight flag is set; the returned key must be passed to
    /// [`complete`](Self::complete) or [`abandon`](Self::abandon).
    pub fn try_begin(&self, code: &str) -> Result<String, SkipReason> {
        let key = marker_key(code);
        let mut state = self.lock();

        if state.processed.contains(&key) {
            return Err(SkipReason::AlreadyProcessed);
        }
        if state.in_flight {
            return Err(SkipReason::InFlight);
        }

        state.in_flight = true;
        state.processed.insert(key.clone());
        Ok(key)
    }

    /// Finish a successful exchange; the marker stays.
    pub fn complete(&self, _key: &str) {
        self.lock().in_flight = false;
    }

    /// Finish a failed exchange; the marker is removed.
    pub fn abandon(&self, key: &str) {
        let mut state = self.lock();
        state.in_flight = false;
        state.processed.remove(key);
    }

    pub fn is_processed(&self, code: &str) -> bool {
        self.lock().processed.contains(&marker_key(code))
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().in_flight
    }
}
