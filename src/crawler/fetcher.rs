//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Classifying responses into bodies, HTTP errors and network errors

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// Canonical reason phrase for the status
        status_text: String,
    },

    /// Network error (connection refused, timeout, body read failure, ...)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns the body if the fetch succeeded
    pub fn body(&self) -> Option<&str> {
        match self {
            FetchResult::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Describes a failed fetch the way crawl errors are recorded
    ///
    /// Returns `None` for successful fetches.
    pub fn error_message(&self) -> Option<String> {
        match self {
            FetchResult::Success { .. } => None,
            FetchResult::HttpError {
                status_code,
                status_text,
            } => Some(format!("HTTP {} {}", status_code, status_text).trim_end().to_string()),
            FetchResult::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// The fetch collaborator the crawler depends on
///
/// Implementations must not panic on network failure; every outcome is
/// reported through [`FetchResult`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a single URL
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use reach::config::UserAgentConfig;
/// use reach::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher around an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a fetcher with a client built from the user agent config
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with readable body | `Success` |
/// | Any other status | `HttpError` |
/// | Timeout | `NetworkError("Request timeout")` |
/// | Connection failure | `NetworkError("Connection refused")` |
/// | Body read failure / other | `NetworkError(<reqwest message>)` |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or("").to_string(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            if e.is_timeout() {
                FetchResult::NetworkError {
                    error: "Request timeout".to_string(),
                }
            } else if e.is_connect() {
                FetchResult::NetworkError {
                    error: "Connection refused".to_string(),
                }
            } else {
                FetchResult::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }
}
