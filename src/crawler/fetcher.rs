//! HTTP fetcher implementation
//!
//! This module issues every request the crawler makes. A fetch is a single
//! GET with a per-request timeout and no retries; the response is classified
//! into one of three outcomes:
//! - a body (2xx, after following redirects)
//! - not found (HTTP 404), the catalog's end-of-pagination signal
//! - a transport error (DNS, connection, timeout, any other status)

use crate::config::CrawlerConfig;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Successfully fetched the page
    Body {
        /// Page body content
        text: String,
        /// Final URL after redirects
        final_url: Url,
    },

    /// The server answered 404
    NotFound,

    /// Anything else that kept us from getting a body
    TransportError {
        /// Error description
        detail: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// Timeouts are applied per request by [`fetch_page`], since listing and
/// detail pages use different limits.
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::CrawlerConfig;
/// use catalog_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(config.listing_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the response
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | HTTP 2xx | Body |
/// | HTTP 404 | NotFound |
/// | Any other status | TransportError |
/// | Timeout / connection refused / DNS | TransportError |
/// | Body could not be decoded | TransportError |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The absolute URL to fetch
/// * `timeout` - Limit for the whole request, body included
pub async fn fetch_page(client: &Client, url: &Url, timeout: Duration) -> FetchOutcome {
    let response = match client.get(url.clone()).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchOutcome::TransportError {
                detail: classify_error(&e),
            }
        }
    };

    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return FetchOutcome::NotFound;
    }

    if !status.is_success() {
        return FetchOutcome::TransportError {
            detail: format!("HTTP {}", status.as_u16()),
        };
    }

    let final_url = response.url().clone();

    match response.text().await {
        Ok(text) => FetchOutcome::Body { text, final_url },
        Err(e) => FetchOutcome::TransportError {
            detail: format!("Failed to read body: {}", classify_error(&e)),
        },
    }
}

fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}
