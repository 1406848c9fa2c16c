//! HTTP fetcher implementation
//!
//! One GET per call, no retries. The connect timeout is a property of the
//! shared client; the request timeout is applied per request. Failures come
//! back as [`FetchError`] and the caller decides whether to skip or abort.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::{FetchCause, FetchError};
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `connect_timeout` - TCP/TLS connect timeout applied to every request
///
/// # Example
///
/// ```no_run
/// use folio_crawler::config::UserAgentConfig;
/// use folio_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "FolioCrawler".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://catalog.example/about".to_string(),
///     contact_email: "admin@catalog.example".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(60)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    connect_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .connect_timeout(connect_timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches catalog pages over a shared HTTP client
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    request_timeout: Duration,
}

impl Fetcher {
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, crawler.connect_timeout())?;
        Ok(Self::with_client(client, crawler.request_timeout()))
    }

    pub fn with_client(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    /// Fetches `url` and returns its body as text
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with readable body | `Ok(body)` |
    /// | Non-2xx status | `FetchCause::Status` |
    /// | Connect or request timeout | `FetchCause::Timeout` |
    /// | Connection refused / DNS / TLS | `FetchCause::Connect` |
    /// | Body read failure | `FetchCause::Body` |
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let failure = |cause| FetchError {
            url: url.to_string(),
            cause,
        };

        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| failure(classify(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(FetchCause::Status(status.as_u16())));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                failure(FetchCause::Timeout)
            } else {
                failure(FetchCause::Body(e.to_string()))
            }
        })?;

        tracing::info!(url, bytes = body.len(), "Fetched");
        Ok(body)
    }
}

fn classify(error: &reqwest::Error) -> FetchCause {
    if error.is_timeout() {
        FetchCause::Timeout
    } else if error.is_connect() {
        FetchCause::Connect(error.to_string())
    } else {
        FetchCause::Request(error.to_string())
    }
}
