//! Wire codec and one-shot TCP transport
//!
//! Sits beneath the request gateway. The codec turns a logical request
//! into a textual request-line message and unwraps the layered response
//! (base64 → JSON envelope → doubly JSON-encoded body). The channel moves
//! those bytes over exactly one TCP connection per exchange, with its own
//! base64 framing layer beneath the codec's encoding.

pub mod channel;
pub mod codec;
pub mod error;

pub use channel::TcpChannel;
pub use codec::{Envelope, decode_failure, decode_response, encode_request, unwrap_payload, unwrap_transport};
pub use error::{DecodeError, Error, Result};
