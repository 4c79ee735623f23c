//! Top Stories API client
//!
//! This module performs the single HTTP GET behind a section refresh and hands
//! back the status code and raw body without interpreting either.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Base URL for the Top Stories API
const TOP_STORIES_BASE_URL: &str = "https://api.nytimes.com/svc/topstories/v2";

/// Connect and response timeout for one fetch
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Status code and body returned by the remote API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Returns true for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors that prevent any response from being received
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response arrived within the timeout
    #[error("Request timed out")]
    Timeout,

    /// Connection or protocol failure
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The HTTP client could not be configured
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Failure in a non-HTTP fetcher
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL carries the api-key query parameter
        let e = e.without_url();
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(e)
        }
    }
}

/// Source of raw section listings
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Performs one GET for `section` authenticated with `api_key`
    async fn fetch(&self, section: &str, api_key: &str) -> Result<RawResponse, TransportError>;
}

/// Fetcher backed by the Top Stories HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    /// Create a new HttpFetcher with the default endpoint and timeout
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(TOP_STORIES_BASE_URL, FETCH_TIMEOUT)
    }

    /// Create a new HttpFetcher against a custom base URL and timeout
    ///
    /// Fails if the TLS backend cannot be initialized.
    pub fn with_config(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                warn!(error = %e, "Unable to build HTTP client");
                TransportError::Client(e)
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the endpoint URL for a section, without credentials
    pub fn section_url(&self, section: &str) -> String {
        format!("{}/{}.json", self.base_url, section)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, section: &str, api_key: &str) -> Result<RawResponse, TransportError> {
        let url = self.section_url(section);
        debug!(%url, "Requesting section");

        let response = self
            .client
            .get(&url)
            .query(&[("api-key", api_key)])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        debug!(%url, status, bytes = body.len(), "Received section response");
        Ok(RawResponse { status, body })
    }
}
