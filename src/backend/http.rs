//! HTTP implementation of the backend trait
//!
//! Speaks the contract served by `sampler-agent`:
//!
//! - `GET {base}/metrics` returns a JSON array of channel names
//! - `GET {base}/metrics/<name>` returns the latest value as a JSON number
//!
//! The client is built once and reused across requests.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::config::BackendConfig;

use super::error::{BackendError, BackendResult};
use super::MetricBackend;

/// Header carrying the shared secret, when the agent requires one
pub const SECRET_HEADER: &str = "X-SAMPLER-SECRET";

/// Backend that polls an HTTP metrics source
pub struct HttpBackend {
    /// HTTP client (reused across requests for efficiency)
    client: reqwest::Client,

    /// Base URL without a trailing slash
    base_url: String,

    /// Optional shared secret forwarded on every request
    token: Option<String>,
}

impl HttpBackend {
    /// Create a backend for the given source
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    async fn get(&self, path: &str) -> BackendResult<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path);

        trace!("requesting {url}");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header(SECRET_HEADER, token);
        }

        Ok(request.send().await?)
    }
}

#[async_trait]
impl MetricBackend for HttpBackend {
    async fn discover(&self) -> BackendResult<Vec<String>> {
        let response = self.get("metrics").await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let names: Vec<String> = serde_json::from_str(&body)?;

        trace!("discovered {} channels", names.len());

        Ok(names)
    }

    async fn query_value(&self, symbol: &str) -> BackendResult<f64> {
        let response = self.get(&format!("metrics/{symbol}")).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::UnknownChannel(symbol.to_string()));
        }

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let value: f64 = serde_json::from_str(body.trim())?;

        if !value.is_finite() {
            return Err(BackendError::Parse(format!(
                "non-finite value for '{symbol}': {value}"
            )));
        }

        Ok(value)
    }
}
