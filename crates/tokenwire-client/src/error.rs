//! Error types for gateway requests

/// Errors surfaced to a gateway caller.
///
/// Decode failures are intentionally absent: the codec normalizes them
/// into the canonical failure value, so they arrive as an `Ok` body with
/// `success: false`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] tokenwire_wire::Error),

    #[error("refresh error: {0}")]
    Refresh(#[from] tokenwire_auth::Error),
}

/// Result alias for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;
