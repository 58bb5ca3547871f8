//! Gateway configuration
//!
//! Loaded from a TOML file and validated after parse, or built
//! programmatically via `Default` for embedding. Everything has a
//! default so an empty file is a valid config.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Root gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Bound on one full request/response exchange, in milliseconds.
    #[serde(default = "default_timeout_millis")]
    pub timeout_millis: u64,
    /// Headers attached to every request before caller headers.
    #[serde(default = "default_headers")]
    pub default_headers: Vec<HeaderInjection>,
    /// Path suffixes exempt from token attachment and refresh gating.
    /// Keeps the refresh endpoint itself from deadlocking behind an
    /// expired token.
    #[serde(default = "default_allow_list")]
    pub allow_list: Vec<String>,
    #[serde(default)]
    pub endpoint: EndpointConfig,
}

/// Header to inject into outgoing requests.
#[derive(Debug, Clone, Deserialize)]
pub struct HeaderInjection {
    pub name: String,
    pub value: String,
}

/// Fixed transport endpoint. Not configurable per request.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_millis: default_timeout_millis(),
            default_headers: default_headers(),
            allow_list: default_allow_list(),
            endpoint: EndpointConfig::default(),
        }
    }
}

fn default_timeout_millis() -> u64 {
    10_000
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8081
}

fn default_allow_list() -> Vec<String> {
    vec!["/login".into(), "/refresh-token".into()]
}

fn default_headers() -> Vec<HeaderInjection> {
    [
        ("Accept", "application/json, text/plain, */*"),
        ("Content-Type", "application/json"),
        ("X-Requested-With", "XMLHttpRequest"),
    ]
    .into_iter()
    .map(|(name, value)| HeaderInjection {
        name: name.into(),
        value: value.into(),
    })
    .collect()
}

impl GatewayConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: GatewayConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        if self.timeout_millis == 0 {
            return Err(common::Error::Config(
                "timeout_millis must be greater than 0".into(),
            ));
        }
        if self.endpoint.host.is_empty() {
            return Err(common::Error::Config("endpoint.host must not be empty".into()));
        }
        if self.endpoint.port == 0 {
            return Err(common::Error::Config(
                "endpoint.port must be greater than 0".into(),
            ));
        }
        for entry in &self.allow_list {
            if !entry.starts_with('/') {
                return Err(common::Error::Config(format!(
                    "allow_list entry must start with '/', got: {entry}"
                )));
            }
        }
        Ok(())
    }

    /// Exchange timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }

    /// Whether a URL targets an allow-listed path.
    ///
    /// Suffix match on the path portion, ignoring any query string.
    pub fn is_allow_listed(&self, url: &str) -> bool {
        let path = url.split('?').next().unwrap_or(url);
        self.allow_list.iter().any(|entry| path.ends_with(entry))
    }
}
