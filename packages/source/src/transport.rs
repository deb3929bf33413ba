//! HTTP transport seam.
//!
//! Fetchers never touch `reqwest` directly. They go through
//! [`JsonTransport`], so tests can substitute a recording fake and the
//! server can share one connection pool across reloads.

use async_trait::async_trait;
use serde_json::Value;

use crate::SourceError;

/// Query parameters as ordered `(name, value)` pairs.
pub type Query = Vec<(String, String)>;

/// Issues GET requests and decodes JSON bodies.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    /// Sends `GET url?query` and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Transport`] on connection failures and
    /// non-2xx statuses, and [`SourceError::Json`] if the body is not
    /// valid JSON.
    async fn get_json(&self, url: &str, query: &Query) -> Result<Value, SourceError>;
}

/// [`JsonTransport`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a fresh client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport reusing an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn get_json(&self, url: &str, query: &Query) -> Result<Value, SourceError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::transport(url, format!("HTTP {status}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SourceError::transport(url, e))?;

        Ok(serde_json::from_str(&text)?)
    }
}
