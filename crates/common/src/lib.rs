//! Shared types for the tokenwire workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
