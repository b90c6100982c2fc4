use crate::UrlError;
use url::Url;

/// Schemes the crawler is able to fetch
const FETCHABLE_SCHEMES: &[&str] = &["http", "https"];

/// Returns true if the URL uses a scheme the crawler can fetch
pub fn is_fetchable(url: &Url) -> bool {
    FETCHABLE_SCHEMES.contains(&url.scheme())
}

/// Parses an absolute URL and applies the crawl's normalization policy
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Reject schemes other than http/https
/// 3. Reject URLs without a host
/// 4. Strip the fragment when `ignore_fragments` is set
///
/// Host lowercasing, default port elision, percent-encoding and dot-segment removal are
/// performed by the WHATWG parser itself.
///
/// # Arguments
///
/// * `url_str` - The absolute URL string to normalize
/// * `ignore_fragments` - Whether to drop the `#fragment` component
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use sitecrawl::url::normalize_url;
///
/// let url = normalize_url("HTTP://Example.COM:80/a/../b#top", true).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/b");
/// ```
pub fn normalize_url(url_str: &str, ignore_fragments: bool) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim())?;

    if !is_fetchable(&url) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    if ignore_fragments {
        url.set_fragment(None);
    }

    Ok(url)
}

/// Resolves a discovered link against the URL of the document it was found in
///
/// Relative references are joined with standard URL resolution rules. Links that cannot
/// be parsed, or that point at non-fetchable schemes (`mailto:`, `javascript:`, `tel:`,
/// `data:`, ...), are dropped by returning `None`.
///
/// When `ignore_fragments` is false the fragment is kept, so `http://h/p` and
/// `http://h/p#anchor` resolve to two distinct frontier keys.
///
/// # Examples
///
/// ```
/// use sitecrawl::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/pages/page-1/").unwrap();
/// let url = resolve("../page-2/#anchor", &base, true).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/pages/page-2/");
///
/// assert!(resolve("mailto:someone@example.com", &base, true).is_none());
/// ```
pub fn resolve(raw: &str, base: &Url, ignore_fragments: bool) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut url = match base.join(raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Dropping unresolvable link {:?}: {}", raw, e);
            return None;
        }
    };

    if !is_fetchable(&url) || url.host_str().is_none() {
        tracing::trace!("Dropping non-fetchable link {}", url);
        return None;
    }

    if ignore_fragments {
        url.set_fragment(None);
    }

    Some(url)
}
