//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The `HttpFetcher` trait the crawl engine talks to
//! - Building reqwest clients with the configured user agent and timeout
//! - Per-request choice of TLS certificate verification
//! - Error classification (network, TLS, timeout, HTTP status)

use crate::config::CrawlConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, Client};
use std::error::Error as StdError;
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed for a single request
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched resource, as returned by an [`HttpFetcher`]
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// HTTP status code
    pub status_code: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body
    pub body: Vec<u8>,
    /// Final URL after redirects
    pub final_url: Url,
}

/// The HTTP transport used by the crawl engine
///
/// Implementations must honor `verify_tls` per call: a single fetcher serves requests
/// with and without certificate verification. Statuses outside 2xx are reported as
/// [`FetchError::HttpStatus`].
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, verify_tls: bool) -> Result<FetchedResponse, FetchError>;
}

/// [`HttpFetcher`] backed by reqwest
///
/// Holds one client that verifies certificates and one that does not, so verification
/// can be chosen per request while connection pools are still shared between requests.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    verifying: Client,
    insecure: Client,
}

impl ReqwestFetcher {
    /// Builds a fetcher from the crawl configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration (user agent and timeout are used)
    ///
    /// # Returns
    ///
    /// * `Ok(ReqwestFetcher)` - Successfully built HTTP clients
    /// * `Err(reqwest::Error)` - Failed to build a client
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sitecrawl::config::CrawlConfig;
    /// use sitecrawl::crawler::ReqwestFetcher;
    ///
    /// let fetcher = ReqwestFetcher::new(&CrawlConfig::default().timeout_secs(30)).unwrap();
    /// ```
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            verifying: build_http_client(config, true)?,
            insecure: build_http_client(config, false)?,
        })
    }

    fn client(&self, verify_tls: bool) -> &Client {
        if verify_tls {
            &self.verifying
        } else {
            &self.insecure
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (up to 10 hops); the final URL is reported back in
/// [`FetchedResponse::final_url`].
pub fn build_http_client(config: &CrawlConfig, verify_tls: bool) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(!verify_tls)
        .gzip(true)
        .brotli(true);

    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &Url, verify_tls: bool) -> Result<FetchedResponse, FetchError> {
        let response = self
            .client(verify_tls)
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let body = response
            .bytes()
            .await
            .map_err(|e| match classify_error(e) {
                FetchError::Network(msg) => FetchError::Body(msg),
                other => other,
            })?;

        Ok(FetchedResponse {
            status_code: status.as_u16(),
            headers,
            body: body.to_vec(),
            final_url,
        })
    }
}

/// Maps a reqwest error onto the crawl's fetch error kinds
///
/// | Condition | Kind |
/// |-----------|------|
/// | Client timeout | `Timeout` |
/// | Certificate rejected during the handshake | `Tls` |
/// | Anything else, including other protocol errors | `Network` |
pub fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        return FetchError::Timeout;
    }

    // The URL itself must not take part in classification
    let error = error.without_url();
    let chain = error_chain(&error);
    if is_tls_failure(&chain) {
        FetchError::Tls(chain)
    } else {
        FetchError::Network(chain)
    }
}

/// Joins an error and all of its sources into one message
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }

    message
}

/// Returns true if the message describes a rejected peer certificate
fn is_tls_failure(message: &str) -> bool {
    let message = message.to_lowercase();
    ["certificate", "unknownissuer", "verify failed"]
        .iter()
        .any(|needle| message.contains(needle))
}
