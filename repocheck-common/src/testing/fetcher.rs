use crate::fetch::{DocumentFetcher, FetchError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// [`DocumentFetcher`] serving canned responses.
///
/// Unknown URLs answer `404`. Every requested URL is recorded in order, so
/// tests can assert which documents a run did or did not touch.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Result<String, FetchError>>,
    delay: Option<Duration>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Ok(body.into()));
        self
    }

    pub fn with_failure(mut self, url: impl Into<String>, error: FetchError) -> Self {
        self.responses.insert(url.into(), Err(error));
        self
    }

    /// Remove a canned response so the URL answers `404`.
    pub fn without(mut self, url: &str) -> Self {
        self.responses.remove(url);
        self
    }

    /// Sleep before every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs requested so far, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn was_requested(&self, url: &str) -> bool {
        self.requested().iter().any(|u| u == url)
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_fetcher_serves_and_records() {
        let fetcher = StaticFetcher::new()
            .with_document("https://a/doc", "body")
            .with_failure("https://a/down", FetchError::Transport("reset".to_string()));

        assert_eq!(fetcher.fetch("https://a/doc").await.unwrap(), "body");
        assert_eq!(
            fetcher.fetch("https://a/missing").await.unwrap_err(),
            FetchError::Status(404)
        );
        assert!(matches!(
            fetcher.fetch("https://a/down").await,
            Err(FetchError::Transport(_))
        ));
        assert_eq!(
            fetcher.requested(),
            vec!["https://a/doc", "https://a/missing", "https://a/down"]
        );
    }
}
