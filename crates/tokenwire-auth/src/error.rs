//! Error types for credential and refresh operations

/// Errors from credential and refresh operations.
///
/// `Clone` because a single refresh outcome is fanned out to every
/// suspended caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("no credential available to refresh")]
    MissingCredential,

    #[error("refresh interrupted before completion")]
    Interrupted,
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
