use serde::Deserialize;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("sitecrawl/", env!("CARGO_PKG_VERSION"));

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub crawler: CrawlConfig,
}

/// Crawl behavior configuration
///
/// Fixed when a crawl starts and never mutated while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Fetch URLs whose origin differs from the seed's
    pub follow_external_links: bool,

    /// Treat `page` and `page#anchor` as the same frontier entry
    pub ignore_fragments: bool,

    /// Reject untrusted TLS certificates
    pub verify_tls: bool,

    /// Per-request timeout handed to the HTTP client (seconds)
    pub timeout_secs: Option<u64>,

    /// Maximum number of fetches in flight at once
    pub max_concurrent_fetches: usize,

    /// User agent string for outgoing requests
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            follow_external_links: true,
            ignore_fragments: true,
            verify_tls: true,
            timeout_secs: None,
            max_concurrent_fetches: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    pub fn follow_external_links(mut self, follow: bool) -> Self {
        self.follow_external_links = follow;
        self
    }

    pub fn ignore_fragments(mut self, ignore: bool) -> Self {
        self.ignore_fragments = ignore;
        self
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn max_concurrent_fetches(mut self, n: usize) -> Self {
        self.max_concurrent_fetches = n;
        self
    }
}
