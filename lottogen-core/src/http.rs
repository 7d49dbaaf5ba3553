//! `reqwest`-backed transport for hosts that reach the generation API directly.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::client::{GenerationTransport, TransportError, TransportResponse};
use crate::constants::DEFAULT_REQUEST_TIMEOUT_MS;

/// Where the API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub base_url: String,
    #[serde(default = "HttpConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl HttpConfig {
    const fn default_timeout_ms() -> u64 {
        DEFAULT_REQUEST_TIMEOUT_MS
    }

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Join the base URL and an absolute API path without doubling slashes.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// JSON-over-HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: HttpConfig,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the underlying client cannot be built.
    pub fn new(config: HttpConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| TransportError(err.to_string()))?;
        Ok(Self { config, http })
    }

    #[must_use]
    pub const fn config(&self) -> &HttpConfig {
        &self.config
    }
}

#[async_trait]
impl GenerationTransport for HttpTransport {
    async fn post_json(
        &self,
        path: &str,
        body: Value,
    ) -> Result<TransportResponse, TransportError> {
        let url = self.config.url_for(path);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| TransportError(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError(err.to_string()))?;
        log::debug!("POST {url} -> {status}");
        Ok(TransportResponse { status, body })
    }
}
