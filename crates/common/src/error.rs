//! Workspace-wide error type
//!
//! Covers the failure modes shared by every crate in the workspace:
//! configuration validation, filesystem access, and TOML parsing.
//! Domain-specific errors live in their own crates.

use thiserror::Error;

/// Shared error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using the shared Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_carries_message() {
        let err = Error::Config("timeout_millis must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: timeout_millis must be greater than 0"
        );
    }

    #[test]
    fn io_error_converts_via_from() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(err.to_string().starts_with("I/O error:"), "got: {err}");
    }

    #[test]
    fn toml_error_converts_via_from() {
        let parse = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: Error = parse.into();
        assert!(err.to_string().starts_with("TOML parse error:"), "got: {err}");
    }
}
