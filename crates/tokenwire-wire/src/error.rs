//! Error types for wire transport and response decoding

/// Errors from the transport channel.
///
/// All of these reject the caller's request outright; the channel never
/// retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("I/O error during exchange: {0}")]
    Io(String),

    #[error("exchange timed out after {0} ms")]
    Timeout(u64),
}

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Stage-tagged failures from the layered response decode.
///
/// These never escape the codec boundary: the decode pipeline normalizes
/// any of them into the canonical failure value. The variants exist so
/// each stage is independently testable and loggable.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("transport encoding invalid: {0}")]
    Base64(String),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(String),

    #[error("envelope parse failed: {0}")]
    Envelope(String),

    #[error("envelope data field absent or empty")]
    MissingData,

    #[error("inner payload parse failed: {0}")]
    Payload(String),
}
