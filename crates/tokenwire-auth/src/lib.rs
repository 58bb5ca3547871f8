//! Credential management and single-flight token refresh
//!
//! Standalone library with no dependency on the wire or client crates.
//!
//! Credential flow:
//! 1. A credential lands in `CredentialStore` (login, handled by the caller)
//! 2. Requests read the store and check expiry against the wall clock
//! 3. The first request to see an expired token starts a refresh via
//!    `RefreshCoordinator::ensure_fresh`; concurrent observers suspend
//!    behind the same refresh instead of starting their own
//! 4. The refreshed credential is written back to the store and handed to
//!    every suspended caller in FIFO order
pub mod coordinator;
pub mod credential;
pub mod error;
pub mod refresher;

pub use coordinator::RefreshCoordinator;
pub use credential::{Credential, CredentialStore, now_millis};
pub use error::{Error, Result};
pub use refresher::{HttpRefresher, TokenRefresher, TokenResponse};
