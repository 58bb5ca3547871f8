//! One-shot TCP transport channel
//!
//! One connection per exchange to a fixed endpoint: connect, write the
//! base64-framed request, half-close the write side to mark the request
//! complete, accumulate the response until the peer closes, then drop the
//! connection. No reuse, no multiplexing.
//!
//! Accumulating until peer close (rather than taking the first inbound
//! segment) means responses split across TCP segments are reassembled in
//! full before decode. The whole exchange is bounded by the configured
//! timeout, which surfaces as a transport error.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{Error, Result};

/// Point-to-point channel to a fixed host/port.
#[derive(Debug, Clone)]
pub struct TcpChannel {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpChannel {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Perform one request/response exchange with the default timeout.
    pub async fn exchange(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.exchange_within(payload, self.timeout).await
    }

    /// Perform one exchange bounded by an explicit timeout (per-call
    /// override).
    pub async fn exchange_within(&self, payload: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        tokio::time::timeout(timeout, self.one_exchange(payload))
            .await
            .map_err(|_| Error::Timeout(timeout.as_millis() as u64))?
    }

    /// Connect, send, receive, close. The stream is owned by this call
    /// and dropped on every path, so no connection outlives its exchange.
    async fn one_exchange(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| Error::Connect(format!("{}:{}: {e}", self.host, self.port)))?;
        debug!(host = %self.host, port = self.port, "connected");

        let framed = BASE64.encode(payload);
        stream
            .write_all(framed.as_bytes())
            .await
            .map_err(|e| Error::Io(format!("writing request: {e}")))?;
        // Half-close: tells the peer the request is complete
        stream
            .shutdown()
            .await
            .map_err(|e| Error::Io(format!("closing write half: {e}")))?;

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .await
            .map_err(|e| Error::Io(format!("reading response: {e}")))?;
        debug!(bytes = response.len(), "exchange complete");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Spawn a one-shot server that reads the full request, then writes
    /// `chunks` with a pause between them and closes the connection.
    /// Returns the bound port and a handle resolving to the raw request.
    async fn one_shot_server(chunks: Vec<Vec<u8>>) -> (u16, tokio::task::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            socket.read_to_end(&mut request).await.unwrap();
            for chunk in chunks {
                socket.write_all(&chunk).await.unwrap();
                socket.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            request
        });
        (port, handle)
    }

    #[tokio::test]
    async fn request_arrives_base64_framed() {
        let (port, server) = one_shot_server(vec![b"ok".to_vec()]).await;
        let channel = TcpChannel::new("127.0.0.1", port, Duration::from_secs(2));

        channel.exchange(b"GET /ping HTTP/1.1\r\n\r\n").await.unwrap();

        let raw = server.await.unwrap();
        let unframed = BASE64.decode(&raw).unwrap();
        assert_eq!(unframed, b"GET /ping HTTP/1.1\r\n\r\n");
    }

    #[tokio::test]
    async fn fragmented_response_is_reassembled() {
        // Response split across two TCP segments must come back whole
        let (port, _server) =
            one_shot_server(vec![b"first-half;".to_vec(), b"second-half".to_vec()]).await;
        let channel = TcpChannel::new("127.0.0.1", port, Duration::from_secs(2));

        let response = channel.exchange(b"payload").await.unwrap();
        assert_eq!(response, b"first-half;second-half");
    }

    #[tokio::test]
    async fn abrupt_close_settles_with_partial_data() {
        // Server writes nothing and closes: empty response, not a hang
        let (port, _server) = one_shot_server(vec![]).await;
        let channel = TcpChannel::new("127.0.0.1", port, Duration::from_secs(2));

        let response = channel.exchange(b"payload").await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn connection_refused_is_connect_error() {
        // Bind then drop a listener so the port is known-closed
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let channel = TcpChannel::new("127.0.0.1", port, Duration::from_secs(2));
        let err = channel.exchange(b"payload").await.unwrap_err();
        assert!(matches!(err, Error::Connect(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn unresponsive_peer_times_out() {
        // Server accepts but never responds and never closes
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let channel = TcpChannel::new("127.0.0.1", port, Duration::from_secs(2));
        let err = channel
            .exchange_within(b"payload", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(100)), "got: {err:?}");
        server.abort();
    }
}
