//! Remote document retrieval.
//!
//! One best-effort GET per call: no retries, no caching. Non-200 responses
//! and transport failures come back as [`FetchError`] values; deciding
//! whether a failure is fatal is the caller's job.

use crate::config::HttpConfig;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// Why a document could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, TLS, timeout or body decoding failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with something other than 200.
    #[error("HTTP status {0}")]
    Status(u16),
}

/// Retrieves text documents by absolute URL.
///
/// Implementations must be reentrant: one fetcher is shared by every
/// concurrent validation run.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`DocumentFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(%url, "fetching remote document");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            debug!(%url, status = status.as_u16(), "remote document not available");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        trace!(%url, bytes = body.len(), "remote document received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::Status(404).to_string(), "HTTP status 404");
        assert_eq!(
            FetchError::Transport("connection refused".to_string()).to_string(),
            "transport error: connection refused"
        );
    }

    #[tokio::test]
    async fn test_unroutable_url_is_transport_error() {
        let fetcher = HttpFetcher::new(&HttpConfig {
            timeout_secs: 2,
            ..HttpConfig::default()
        })
        .unwrap();
        let err = fetcher.fetch("http://127.0.0.1:1/package.json").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_invalid_url_is_transport_error() {
        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
