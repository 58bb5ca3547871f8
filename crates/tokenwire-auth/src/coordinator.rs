//! Single-flight refresh coordination
//!
//! At most one refresh runs at a time. The first caller to observe an
//! expired credential becomes the leader: it flips the `refreshing` flag,
//! runs the refresh, and fans the outcome out to every caller that queued
//! behind it in the meantime. Waiters are oneshot handles resumed in FIFO
//! enqueue order; a failed refresh rejects all of them with the same error
//! and never leaves the flag stuck.
//!
//! The leader settles through a guard, so the flag is released and queued
//! waiters are rejected even when the leader's future is dropped mid-flight
//! (a caller-side timeout or task abort). Cancellation can suspend a
//! request, but it can never wedge the coordinator for later ones.
//!
//! The coordinator is instance-owned state, injected wherever it is
//! needed, so independent instances can coexist (one per gateway, many in
//! tests). There is no process-global flag.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::credential::{Credential, CredentialStore};
use crate::error::{Error, Result};
use crate::refresher::TokenRefresher;

/// Refresh flag plus the FIFO queue of suspended callers.
///
/// Owned jointly by the flag and queue discipline: both are only ever
/// mutated while holding the coordinator's mutex.
#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<Result<Credential>>>,
}

/// Coordinates token refresh so concurrent expiry observers trigger
/// exactly one refresh exchange.
pub struct RefreshCoordinator<R> {
    store: Arc<CredentialStore>,
    refresher: R,
    state: Mutex<RefreshState>,
}

impl<R: TokenRefresher> RefreshCoordinator<R> {
    pub fn new(store: Arc<CredentialStore>, refresher: R) -> Self {
        Self {
            store,
            refresher,
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// Obtain a fresh credential, refreshing at most once across all
    /// concurrent callers.
    ///
    /// The caller that finds no refresh in flight becomes the leader and
    /// performs the exchange. Every other caller suspends on a oneshot
    /// until the shared outcome settles. On success all callers receive
    /// the same new credential; on failure they all receive the same
    /// error and the next call starts a fresh attempt.
    pub async fn ensure_fresh(&self) -> Result<Credential> {
        let waiter = {
            let mut state = self.lock_state();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.refreshing = true;
                None
            }
        };

        match waiter {
            Some(rx) => {
                debug!("refresh already in flight, suspending until it settles");
                // A dropped sender means the leader aborted before fan-out
                rx.await.map_err(|_| Error::Interrupted)?
            }
            None => {
                // The guard settles the shared state on every exit path,
                // including this future being dropped mid-refresh.
                let guard = LeaderGuard {
                    state: &self.state,
                    settled: false,
                };
                let outcome = self.run_refresh().await;
                guard.settle(outcome)
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        // Lock scopes never cross an await and never panic, so a poisoned
        // mutex still holds consistent state
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run the actual refresh exchange and persist the new credential.
    async fn run_refresh(&self) -> Result<Credential> {
        let current = self.store.get().await.ok_or(Error::MissingCredential)?;
        debug!("starting token refresh");

        let fresh = self.refresher.refresh(current.refresh_token.expose()).await?;
        self.store.set(fresh.clone()).await;
        Ok(fresh)
    }
}

/// Releases the `refreshing` flag and drains the waiter queue exactly once,
/// whether the leader settles normally or its future is dropped.
struct LeaderGuard<'a> {
    state: &'a Mutex<RefreshState>,
    settled: bool,
}

impl LeaderGuard<'_> {
    /// Normal completion: fan the shared outcome out to every waiter.
    fn settle(mut self, outcome: Result<Credential>) -> Result<Credential> {
        self.settled = true;
        let waiters = self.drain();

        match &outcome {
            Ok(_) => info!(waiters = waiters.len(), "refresh settled, resuming waiters"),
            Err(e) => {
                warn!(waiters = waiters.len(), error = %e, "refresh failed, rejecting waiters")
            }
        }

        for tx in waiters {
            // A waiter that gave up (dropped its receiver) is fine
            let _ = tx.send(outcome.clone());
        }
        outcome
    }

    /// Reset the flag and drain the queue atomically so no waiter
    /// enqueued during the refresh can be lost.
    fn drain(&self) -> Vec<oneshot::Sender<Result<Credential>>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.refreshing = false;
        std::mem::take(&mut state.waiters)
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        // Leader cancelled mid-refresh: release the flag and reject the
        // queue so later requests start a fresh attempt instead of
        // queueing behind a refresh that will never settle
        let waiters = self.drain();
        warn!(
            waiters = waiters.len(),
            "refresh leader cancelled, rejecting waiters"
        );
        for tx in waiters {
            let _ = tx.send(Err(Error::Interrupted));
        }
    }
}
