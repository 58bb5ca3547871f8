//! Request gateway
//!
//! Public entry point for authenticated requests. Per request the gateway
//! runs one explicit decision:
//!
//! 1. allow-listed path → send immediately, no token check
//! 2. no stored credential → send unauthenticated
//! 3. credential valid → attach `Authorization: Bearer <token>` and send
//! 4. credential expired → suspend on the shared refresh, then send with
//!    the NEW token (never the stale one)
//!
//! Every path funnels into the same encode → transport → decode sequence:
//! exactly one network exchange per logical request, at most one refresh
//! exchange per concurrent expiry window. Transport and refresh errors
//! reject the call; decode failures come back as the canonical failure
//! value.

use std::sync::Arc;

use tokenwire_auth::{Credential, CredentialStore, RefreshCoordinator, TokenRefresher, now_millis};
use tokenwire_wire::TcpChannel;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::Result;
use crate::request::{LogicalRequest, Method};

/// Hook invoked synchronously on the assembled request before send.
pub type RequestHook = Arc<dyn Fn(&mut LogicalRequest) + Send + Sync>;
/// Hook invoked synchronously on the decoded response body.
pub type ResponseHook = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

/// Per-call adjustments layered over the gateway configuration.
#[derive(Default, Clone)]
pub struct Overrides {
    /// Extra headers; replace same-named defaults case-insensitively.
    pub headers: Vec<(String, String)>,
    /// Bound for this exchange instead of the configured timeout.
    pub timeout: Option<std::time::Duration>,
    pub before_request: Option<RequestHook>,
    pub before_response: Option<ResponseHook>,
}

/// Authenticated-request gateway over a one-shot TCP wire.
///
/// Owns its refresh coordinator, so independent gateways (and tests)
/// never share refresh state.
pub struct Gateway<R> {
    config: GatewayConfig,
    store: Arc<CredentialStore>,
    coordinator: RefreshCoordinator<R>,
    channel: TcpChannel,
    before_request: Option<RequestHook>,
    before_response: Option<ResponseHook>,
}

impl<R: TokenRefresher> Gateway<R> {
    pub fn new(config: GatewayConfig, store: Arc<CredentialStore>, refresher: R) -> Self {
        let channel = TcpChannel::new(
            config.endpoint.host.clone(),
            config.endpoint.port,
            config.timeout(),
        );
        Self {
            coordinator: RefreshCoordinator::new(store.clone(), refresher),
            store,
            channel,
            config,
            before_request: None,
            before_response: None,
        }
    }

    /// Install gateway-wide hooks. Per-call overrides take precedence.
    pub fn with_hooks(
        mut self,
        before_request: Option<RequestHook>,
        before_response: Option<ResponseHook>,
    ) -> Self {
        self.before_request = before_request;
        self.before_response = before_response;
        self
    }

    /// Issue one logical request and return the decoded response body.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
        overrides: Option<Overrides>,
    ) -> Result<serde_json::Value> {
        let overrides = overrides.unwrap_or_default();

        let mut request = LogicalRequest::new(method, url);
        for header in &self.config.default_headers {
            request = request.with_header(&header.name, &header.value);
        }
        for (name, value) in &overrides.headers {
            request = request.with_header(name, value);
        }
        if let Some(body) = body {
            request = request.with_body(body);
        }
        if let Some(hook) = overrides
            .before_request
            .as_ref()
            .or(self.before_request.as_ref())
        {
            hook(&mut request);
        }

        let request = self.authorize(request).await?;
        self.send(request, &overrides).await
    }

    pub async fn get(&self, url: &str, overrides: Option<Overrides>) -> Result<serde_json::Value> {
        self.request(Method::Get, url, None, overrides).await
    }

    pub async fn post(
        &self,
        url: &str,
        body: Option<serde_json::Value>,
        overrides: Option<Overrides>,
    ) -> Result<serde_json::Value> {
        self.request(Method::Post, url, body, overrides).await
    }

    pub async fn put(
        &self,
        url: &str,
        body: Option<serde_json::Value>,
        overrides: Option<Overrides>,
    ) -> Result<serde_json::Value> {
        self.request(Method::Put, url, body, overrides).await
    }

    pub async fn patch(
        &self,
        url: &str,
        body: Option<serde_json::Value>,
        overrides: Option<Overrides>,
    ) -> Result<serde_json::Value> {
        self.request(Method::Patch, url, body, overrides).await
    }

    pub async fn delete(
        &self,
        url: &str,
        overrides: Option<Overrides>,
    ) -> Result<serde_json::Value> {
        self.request(Method::Delete, url, None, overrides).await
    }

    /// Apply the credential decision to a request.
    async fn authorize(&self, request: LogicalRequest) -> Result<LogicalRequest> {
        if self.config.is_allow_listed(&request.url) {
            debug!(url = %request.url, "allow-listed path, skipping token check");
            return Ok(request);
        }

        match self.store.get().await {
            None => {
                debug!(url = %request.url, "no credential, sending unauthenticated");
                Ok(request)
            }
            Some(credential) if !credential.is_expired(now_millis()) => {
                Ok(with_bearer(request, &credential))
            }
            Some(_) => {
                debug!(url = %request.url, "credential expired, waiting on refresh");
                let fresh = self.coordinator.ensure_fresh().await?;
                Ok(with_bearer(request, &fresh))
            }
        }
    }

    /// Single encode → transport → decode funnel.
    async fn send(
        &self,
        request: LogicalRequest,
        overrides: &Overrides,
    ) -> Result<serde_json::Value> {
        let encoded = request.encode();
        let timeout = overrides.timeout.unwrap_or_else(|| self.config.timeout());
        let raw = self.channel.exchange_within(&encoded, timeout).await?;
        let decoded = tokenwire_wire::decode_response(&raw);
        if let Some(hook) = overrides
            .before_response
            .as_ref()
            .or(self.before_response.as_ref())
        {
            hook(&decoded);
        }
        Ok(decoded)
    }
}

fn with_bearer(request: LogicalRequest, credential: &Credential) -> LogicalRequest {
    request.with_header(
        "Authorization",
        format!("Bearer {}", credential.access_token.expose()),
    )
}
