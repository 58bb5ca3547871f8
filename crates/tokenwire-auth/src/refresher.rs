//! Token refresh operation
//!
//! The refresh exchange is externally supplied: the coordinator only knows
//! the [`TokenRefresher`] trait. [`HttpRefresher`] is the production
//! implementation, POSTing `grant_type=refresh_token` form data to a
//! configured token endpoint. 401/403 from the endpoint means the refresh
//! token itself is revoked or invalid, which is a distinct error from a
//! transient endpoint failure.

use std::time::Duration;

use serde::Deserialize;

use crate::credential::{Credential, now_millis};
use crate::error::{Error, Result};

/// Exchanges a refresh token for a new credential.
///
/// Implementations must be cheap to call concurrently; the coordinator
/// guarantees only one refresh is actually in flight at a time.
pub trait TokenRefresher: Send + Sync {
    fn refresh(&self, refresh_token: &str) -> impl Future<Output = Result<Credential>> + Send;
}

impl<T: TokenRefresher> TokenRefresher for std::sync::Arc<T> {
    fn refresh(&self, refresh_token: &str) -> impl Future<Output = Result<Credential>> + Send {
        T::refresh(self, refresh_token)
    }
}

/// Response from the token endpoint.
///
/// `expires_in` is a delta in seconds from the response time; it is
/// converted to an absolute unix millisecond timestamp when building
/// the credential.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
}

impl TokenResponse {
    /// Convert into a credential anchored at `now` (unix milliseconds).
    pub fn into_credential(self, now: u64) -> Credential {
        Credential::new(
            self.access_token,
            self.refresh_token,
            now + self.expires_in * 1000,
        )
    }
}

/// `TokenRefresher` backed by an HTTP token endpoint.
pub struct HttpRefresher {
    client: reqwest::Client,
    token_endpoint: String,
}

impl HttpRefresher {
    /// Build a refresher whose exchange is bounded by `timeout`.
    ///
    /// A token endpoint that accepts the connection but never responds
    /// must surface as an error so the coordinator can release the queue,
    /// not hang the leader and every waiter.
    pub fn new(token_endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            // Builder failure means the TLS backend failed to initialize,
            // the same condition under which Client::new panics
            .unwrap_or_default();
        Self::with_client(client, token_endpoint)
    }

    /// Use a caller-supplied client (shared connection pool, custom TLS).
    pub fn with_client(client: reqwest::Client, token_endpoint: impl Into<String>) -> Self {
        Self {
            client,
            token_endpoint: token_endpoint.into(),
        }
    }
}

impl TokenRefresher for HttpRefresher {
    fn refresh(&self, refresh_token: &str) -> impl Future<Output = Result<Credential>> + Send {
        async move {
            let response = self
                .client
                .post(&self.token_endpoint)
                .form(&[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                ])
                .send()
                .await
                .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| String::from("<no body>"));

                // 401/403 means the refresh token is revoked or invalid
                if status.as_u16() == 401 || status.as_u16() == 403 {
                    return Err(Error::InvalidCredentials(format!(
                        "refresh token rejected ({status}): {body}"
                    )));
                }

                return Err(Error::RefreshFailed(format!(
                    "token endpoint returned {status}: {body}"
                )));
            }

            let token = response
                .json::<TokenResponse>()
                .await
                .map_err(|e| Error::RefreshFailed(format!("invalid refresh response: {e}")))?;

            Ok(token.into_credential(now_millis()))
        }
    }
}
