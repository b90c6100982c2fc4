//! Sitecrawl: a breadth-first website crawler
//!
//! This crate crawls a site starting from a seed URL. It fetches pages, extracts links
//! and asset references from HTML and CSS, and yields every fetched resource exactly once
//! as a lazy stream of responses.

pub mod config;
pub mod crawler;
pub mod url;

use thiserror::Error;

/// Main error type surfaced by a crawl
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(#[from] UrlError),

    #[error("Failed to fetch {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl CrawlError {
    /// Returns the URL this error is attached to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Fetch { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Returns true if the error is a rejected TLS certificate
    pub fn is_tls(&self) -> bool {
        matches!(
            self,
            Self::Fetch {
                source: FetchError::Tls(_),
                ..
            }
        )
    }
}

/// Errors produced by the HTTP fetcher for a single URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("TLS verification failed: {0}")]
    Tls(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::CrawlConfig;
pub use crate::crawler::{
    crawl, crawl_with, extract_urls_from_css, extract_urls_from_html, Crawl, CrawledResponse,
    FetchedResponse, HttpFetcher, ReqwestFetcher,
};
pub use crate::url::{normalize_url, resolve, Origin};
