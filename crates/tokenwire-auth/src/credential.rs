//! Credential model and in-memory store
//!
//! A credential is an access/refresh token pair with an absolute expiry.
//! The store is the single source of truth for token data: read by every
//! request at decision time, written only by the one refresh that is
//! allowed to run. A tokio Mutex serializes access; readers clone the
//! credential out so they never hold the lock across I/O.

use common::Secret;
use tokio::sync::Mutex;
use tracing::debug;

/// Access/refresh token pair with expiry.
///
/// `expires_at` is a unix timestamp in milliseconds (absolute, not a delta),
/// compared against the wall clock at the moment of use. Both tokens are
/// wrapped in [`Secret`] so Debug output never leaks them.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: Secret<String>,
    pub refresh_token: Secret<String>,
    /// Expiration as unix timestamp in milliseconds
    pub expires_at: u64,
}

impl Credential {
    pub fn new(access_token: String, refresh_token: String, expires_at: u64) -> Self {
        Self {
            access_token: Secret::new(access_token),
            refresh_token: Secret::new(refresh_token),
            expires_at,
        }
    }

    /// Whether the access token is expired at `now_millis`.
    ///
    /// A credential whose expiry equals the current instant counts as
    /// expired and must not be attached to a new outbound request.
    pub fn is_expired(&self, now_millis: u64) -> bool {
        self.expires_at <= now_millis
    }
}

/// Current wall-clock time as unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// In-memory credential holder shared between the gateway and the
/// refresh coordinator.
///
/// Holds at most one credential. Many concurrent requests read it; only
/// the active refresh writes it, so readers and the writer never contend
/// for more than the brief clone under the lock.
#[derive(Default)]
pub struct CredentialStore {
    state: Mutex<Option<Credential>>,
}

impl CredentialStore {
    /// Create an empty store (no credential yet, e.g. before login).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a credential.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            state: Mutex::new(Some(credential)),
        }
    }

    /// Clone out the current credential, if any.
    pub async fn get(&self) -> Option<Credential> {
        let state = self.state.lock().await;
        state.clone()
    }

    /// Replace the stored credential. Called after a successful refresh
    /// (or an initial login handled outside this crate).
    pub async fn set(&self, credential: Credential) {
        let mut state = self.state.lock().await;
        debug!(expires_at = credential.expires_at, "credential updated");
        *state = Some(credential);
    }

    /// Drop the stored credential (logout).
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        *state = None;
        debug!("credential cleared");
    }
}
