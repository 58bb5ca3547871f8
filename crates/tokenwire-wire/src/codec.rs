//! Request encoding and layered response decoding
//!
//! Outbound: a logical request becomes a textual request-line message —
//! `METHOD url HTTP/1.1`, caller-declared headers in insertion order, a
//! computed `Content-Length`, a blank line, and the serialized body.
//! `Content-Length` is the BYTE length of the body, so multi-byte payloads
//! stay correct.
//!
//! Inbound: the channel hands back one opaque payload that unwraps in two
//! stages. Stage one strips the base64 transport layer and parses the JSON
//! envelope `{success, message, data}`. Stage two parses the `data` field —
//! itself a JSON-encoded string — a second time to reach the logical body.
//! Any failure at either stage normalizes to the canonical failure value;
//! nothing from this path escapes as an error.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::DecodeError;

/// Encode a logical request into its wire form.
///
/// Headers are emitted in the order given; `Content-Length` is appended
/// after them, computed from the body's byte length.
pub fn encode_request<'a, H>(method: &str, url: &str, headers: H, body: &str) -> Vec<u8>
where
    H: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut message = format!("{method} {url} HTTP/1.1\r\n");
    for (name, value) in headers {
        message.push_str(name);
        message.push_str(": ");
        message.push_str(value);
        message.push_str("\r\n");
    }
    message.push_str(&format!("Content-Length: {}\r\n", body.len()));
    message.push_str("\r\n");
    message.push_str(body);
    debug!(method, url, bytes = message.len(), "encoded request");
    message.into_bytes()
}

/// Outer response envelope recovered after the base64 layer is removed.
///
/// `data` carries the logical body as a doubly JSON-encoded string.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<String>,
}

/// Stage one: strip the base64 transport layer and parse the envelope.
pub fn unwrap_transport(raw: &[u8]) -> Result<Envelope, DecodeError> {
    // Peers may append trailing newlines to the base64 text
    let trimmed: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if trimmed.is_empty() {
        return Err(DecodeError::MissingData);
    }

    let decoded = BASE64
        .decode(&trimmed)
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    let text = String::from_utf8(decoded).map_err(|e| DecodeError::Utf8(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| DecodeError::Envelope(e.to_string()))
}

/// Stage two: parse the envelope's `data` string twice to reach the
/// logical response body.
pub fn unwrap_payload(envelope: &Envelope) -> Result<serde_json::Value, DecodeError> {
    let data = match envelope.data.as_deref() {
        Some(d) if !d.is_empty() => d,
        _ => return Err(DecodeError::MissingData),
    };
    // First parse yields the inner JSON text, second parse yields the body
    let inner: String =
        serde_json::from_str(data).map_err(|e| DecodeError::Payload(e.to_string()))?;
    serde_json::from_str(&inner).map_err(|e| DecodeError::Payload(e.to_string()))
}

/// Canonical failure value returned whenever the decode pipeline fails.
pub fn decode_failure() -> serde_json::Value {
    serde_json::json!({"success": false, "message": "decode failed"})
}

/// Run the full two-stage decode, normalizing any failure into the
/// canonical failure value. This function never errors or panics.
pub fn decode_response(raw: &[u8]) -> serde_json::Value {
    match unwrap_transport(raw).and_then(|envelope| unwrap_payload(&envelope)) {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "response decode failed");
            decode_failure()
        }
    }
}
