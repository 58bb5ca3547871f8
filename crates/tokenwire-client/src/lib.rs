//! Authenticated-request gateway over a one-shot TCP wire
//!
//! Public surface of the tokenwire workspace. A `Gateway` owns a
//! credential store, a single-flight refresh coordinator, and a TCP
//! channel to one fixed endpoint. Callers issue requests through
//! `request` or the verb shorthands; requests that hit an expired token
//! are suspended behind the one shared refresh and replayed with the new
//! token automatically.
//!
//! Request flow:
//! 1. Build the logical request (defaults + per-call headers + hooks)
//! 2. Decide: allow-listed / unauthenticated / valid token / refresh-then-send
//! 3. Encode to the request-line wire form
//! 4. One TCP exchange, timeout-bounded
//! 5. Two-stage decode back to the logical body

pub mod config;
pub mod error;
pub mod gateway;
pub mod request;

pub use config::{EndpointConfig, GatewayConfig, HeaderInjection};
pub use error::{Error, Result};
pub use gateway::{Gateway, Overrides, RequestHook, ResponseHook};
pub use request::{Headers, LogicalRequest, Method};
