//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Seeding the frontier
//! - Dispatching fetches (sequentially by default, or a bounded number at once)
//! - Extracting and resolving links from HTML and CSS responses
//! - Handing each fetched response to the consumer as soon as it completes
//!
//! A crawl is an explicit state machine ([`Crawl`]) pulled one response at a time, so
//! consumers can stop whenever they like: dropping the crawl drops every in-flight fetch.

use crate::config::{validate, CrawlConfig};
use crate::crawler::fetcher::{FetchedResponse, HttpFetcher, ReqwestFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{extract_urls_from_css, extract_urls_from_html};
use crate::url::{normalize_url, resolve};
use crate::{CrawlError, FetchError};
use futures::future::BoxFuture;
use futures::stream::{self, FuturesUnordered, Stream};
use futures::{FutureExt, StreamExt};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// A fetch in flight, resolving to the requested URL and its outcome
type FetchFuture = BoxFuture<'static, (Url, Result<FetchedResponse, FetchError>)>;

/// A fetched resource, emitted once per unique normalized URL
#[derive(Debug, Clone)]
pub struct CrawledResponse {
    /// The normalized URL that was requested (the frontier key)
    pub url: String,

    /// The URL the response was finally served from, after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Response headers
    pub headers: HeaderMap,

    /// Raw response body
    pub body: Vec<u8>,

    /// Raw Content-Type header value (empty when absent)
    pub content_type: String,
}

impl CrawledResponse {
    fn new(url: &Url, fetched: FetchedResponse) -> Self {
        let content_type = fetched
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        Self {
            url: url.to_string(),
            final_url: fetched.final_url.to_string(),
            status_code: fetched.status_code,
            headers: fetched.headers,
            body: fetched.body,
            content_type,
        }
    }

    /// Returns the media type without parameters, lowercased (`text/html`)
    pub fn mime_type(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }

    /// Returns true if the response is an HTML document
    pub fn is_html(&self) -> bool {
        matches!(
            self.mime_type().as_str(),
            "text/html" | "application/xhtml+xml"
        )
    }

    /// Returns true if the response is a stylesheet
    pub fn is_css(&self) -> bool {
        self.mime_type() == "text/css"
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// State of one crawl invocation
///
/// Owns the frontier, the visited set and the in-flight fetches. Nothing is shared
/// between crawls, so independent crawls can run side by side.
pub struct Crawl {
    config: CrawlConfig,
    frontier: Frontier,
    fetcher: Arc<dyn HttpFetcher>,
    in_flight: FuturesUnordered<FetchFuture>,
    emitted: usize,
    failed: usize,
    started: Instant,
    finished: bool,
}

impl Crawl {
    fn new(seed: Url, config: CrawlConfig, fetcher: Arc<dyn HttpFetcher>) -> Self {
        let mut frontier = Frontier::new(&seed, config.follow_external_links);
        frontier.seed(seed);

        Self {
            config,
            frontier,
            fetcher,
            in_flight: FuturesUnordered::new(),
            emitted: 0,
            failed: 0,
            started: Instant::now(),
            finished: false,
        }
    }

    /// Pulls the next fetched response
    ///
    /// Each call:
    /// 1. Tops up in-flight fetches from the frontier (FIFO)
    /// 2. Waits for the next fetch to complete
    /// 3. On success, extracts and enqueues links from HTML and CSS on the seed origin
    /// 4. Returns the response, or the fetch error attached to its URL
    ///
    /// A failed fetch only ends its own branch of the traversal; later calls keep
    /// crawling the remaining frontier.
    ///
    /// # Returns
    ///
    /// * `Some(Ok(CrawledResponse))` - A resource was fetched
    /// * `Some(Err(CrawlError::Fetch { .. }))` - Fetching one URL failed
    /// * `None` - The frontier is exhausted and the crawl is over
    pub async fn next_response(&mut self) -> Option<Result<CrawledResponse, CrawlError>> {
        self.dispatch_pending();

        match self.in_flight.next().await {
            Some((url, result)) => Some(self.handle_result(url, result)),
            None => {
                self.finish();
                None
            }
        }
    }

    /// Converts the crawl into a lazy stream of responses
    ///
    /// # Example
    ///
    /// ```no_run
    /// use futures::StreamExt;
    /// use sitecrawl::{crawl, CrawlConfig};
    ///
    /// # async fn example() -> Result<(), sitecrawl::CrawlError> {
    /// let session = crawl("http://localhost:8000/", CrawlConfig::default())?;
    /// let mut responses = Box::pin(session.into_stream());
    /// while let Some(result) = responses.next().await {
    ///     match result {
    ///         Ok(rsp) => println!("{} {}", rsp.status_code, rsp.url),
    ///         Err(e) => eprintln!("{}", e),
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn into_stream(self) -> impl Stream<Item = Result<CrawledResponse, CrawlError>> + Send {
        stream::unfold(self, |mut crawl| async move {
            let item = crawl.next_response().await?;
            Some((item, crawl))
        })
    }

    /// Returns the number of responses emitted so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Returns the number of failed fetches so far
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Returns the number of URLs waiting to be fetched
    pub fn pending(&self) -> usize {
        self.frontier.pending_len()
    }

    fn dispatch_pending(&mut self) {
        let limit = self.config.max_concurrent_fetches.max(1);

        while self.in_flight.len() < limit {
            let Some(url) = self.frontier.next() else {
                break;
            };

            tracing::debug!("Fetching {}", url);

            let fetcher = Arc::clone(&self.fetcher);
            let verify_tls = self.config.verify_tls;
            self.in_flight.push(
                async move {
                    let result = fetcher.fetch(&url, verify_tls).await;
                    (url, result)
                }
                .boxed(),
            );
        }
    }

    fn handle_result(
        &mut self,
        url: Url,
        result: Result<FetchedResponse, FetchError>,
    ) -> Result<CrawledResponse, CrawlError> {
        match result {
            Ok(fetched) => {
                let base = fetched.final_url.clone();
                let response = CrawledResponse::new(&url, fetched);

                self.discover_links(&url, &base, &response);
                self.record_emitted();

                Ok(response)
            }
            Err(source) => {
                tracing::warn!("Failed to fetch {}: {}", url, source);
                self.failed += 1;

                Err(CrawlError::Fetch {
                    url: url.to_string(),
                    source,
                })
            }
        }
    }

    /// Extracts links from a response and offers them to the frontier
    ///
    /// Only documents on the seed origin are parsed: external pages are emitted but never
    /// followed further. Links resolve against `base`, the URL after redirects.
    fn discover_links(&mut self, url: &Url, base: &Url, response: &CrawledResponse) {
        if self.frontier.is_external(url) {
            tracing::debug!("Not parsing external resource {}", url);
            return;
        }

        let raw_links = if response.is_html() {
            extract_urls_from_html(&response.text())
        } else if response.is_css() {
            extract_urls_from_css(&response.text())
        } else {
            return;
        };

        // Sets have no order; sort so enqueue order is reproducible
        let mut raw_links: Vec<String> = raw_links.into_iter().collect();
        raw_links.sort();

        let mut added = 0;
        for raw in &raw_links {
            let Some(link) = resolve(raw, base, self.config.ignore_fragments) else {
                continue;
            };

            if self.frontier.offer(link) {
                added += 1;
            }
        }

        tracing::debug!("{}: {} links found, {} new", url, raw_links.len(), added);
    }

    fn record_emitted(&mut self) {
        self.emitted += 1;

        if self.emitted % 10 == 0 {
            let elapsed = self.started.elapsed();
            let rate = self.emitted as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
            tracing::info!(
                "Progress: {} fetched, {} pending, {:.2} fetches/sec",
                self.emitted,
                self.frontier.pending_len(),
                rate
            );
        }
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        tracing::info!(
            "Crawl completed: {} fetched, {} failed in {:?}",
            self.emitted,
            self.failed,
            self.started.elapsed()
        );
    }
}

/// Starts a crawl using the default reqwest-backed fetcher
///
/// Nothing is fetched until the returned [`Crawl`] is polled.
///
/// # Arguments
///
/// * `seed_url` - Absolute http(s) URL to start from; defines the crawl origin
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(Crawl)` - The crawl, ready to be pulled
/// * `Err(CrawlError)` - Invalid seed or configuration, or the HTTP client failed to build
pub fn crawl(seed_url: &str, config: CrawlConfig) -> Result<Crawl, CrawlError> {
    validate(&config)?;
    let fetcher = ReqwestFetcher::new(&config)?;
    crawl_with(seed_url, config, Arc::new(fetcher))
}

/// Starts a crawl that fetches through a custom [`HttpFetcher`]
pub fn crawl_with(
    seed_url: &str,
    config: CrawlConfig,
    fetcher: Arc<dyn HttpFetcher>,
) -> Result<Crawl, CrawlError> {
    validate(&config)?;
    let seed = normalize_url(seed_url, config.ignore_fragments)?;

    tracing::info!(
        "Starting crawl at {} (follow external: {}, ignore fragments: {}, verify TLS: {})",
        seed,
        config.follow_external_links,
        config.ignore_fragments,
        config.verify_tls
    );

    Ok(Crawl::new(seed, config, fetcher))
}
