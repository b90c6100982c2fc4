//! Crawler module for fetching and link discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through a pluggable `HttpFetcher`
//! - HTML and CSS link extraction
//! - Frontier management (visited set, FIFO queue, origin policy)
//! - Overall crawl coordination as a lazy stream of responses

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{crawl, crawl_with, Crawl, CrawledResponse};
pub use fetcher::{build_http_client, classify_error, FetchedResponse, HttpFetcher, ReqwestFetcher};
pub use frontier::Frontier;
pub use parser::{extract_urls_from_css, extract_urls_from_html};
