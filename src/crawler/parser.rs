//! Link extraction from fetched documents
//!
//! This module pulls raw link strings out of:
//! - HTML documents (anchor targets, stylesheets, scripts, images and other embedded
//!   resources)
//! - CSS stylesheets (`url(...)` references and `@import` strings)
//!
//! Extracted values are returned verbatim. Resolution against the document URL and
//! scheme filtering happen later, in [`crate::url::resolve`].

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Link-bearing attributes, as (selector, attribute) pairs
const LINK_ATTRIBUTES: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("area[href]", "href"),
    ("link[href]", "href"),
    ("script[src]", "src"),
    ("img[src]", "src"),
    ("iframe[src]", "src"),
    ("frame[src]", "src"),
    ("embed[src]", "src"),
    ("source[src]", "src"),
    ("audio[src]", "src"),
    ("video[src]", "src"),
    ("track[src]", "src"),
    ("input[src]", "src"),
    ("video[poster]", "poster"),
    ("object[data]", "data"),
];

/// Attributes holding comma-separated candidate lists (`url 2x, url 640w`)
const SRCSET_ATTRIBUTES: &[(&str, &str)] =
    &[("img[srcset]", "srcset"), ("source[srcset]", "srcset")];

static CSS_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*[\s\S]*?\*/").expect("Invalid CSS comment regex"));

static CSS_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^)"'\s]*))\s*\)"#)
        .expect("Invalid CSS url regex")
});

static CSS_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)@import\s+(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
        .expect("Invalid CSS import regex")
});

/// Extracts every link-bearing attribute value from an HTML document
///
/// The parser is html5ever-based and error tolerant: malformed markup never fails, it
/// just yields whatever elements could be recovered.
///
/// Values are trimmed; empty values are skipped. Non-HTTP schemes such as `mailto:` are
/// kept, since filtering is the resolver's job.
///
/// # Example
///
/// ```
/// use sitecrawl::crawler::extract_urls_from_html;
///
/// let html = r#"<a href="/about">About</a><img src="logo.png"><a href="mailto:a@b.c">Mail</a>"#;
/// let urls = extract_urls_from_html(html);
/// assert_eq!(urls.len(), 3);
/// assert!(urls.contains("/about"));
/// assert!(urls.contains("mailto:a@b.c"));
/// ```
pub fn extract_urls_from_html(content: &str) -> HashSet<String> {
    let document = Html::parse_document(content);
    let mut urls = HashSet::new();

    for (selector, attr) in LINK_ATTRIBUTES {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };

        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attr) {
                push_link(&mut urls, value);
            }
        }
    }

    for (selector, attr) in SRCSET_ATTRIBUTES {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };

        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attr) {
                for candidate in value.split(',') {
                    if let Some(link) = candidate.split_whitespace().next() {
                        push_link(&mut urls, link);
                    }
                }
            }
        }
    }

    urls
}

/// Extracts every `url(...)` reference and `@import` string from a stylesheet
///
/// Double-quoted, single-quoted and unquoted forms are all accepted; the returned path
/// has its quotes and surrounding whitespace removed. Comments are skipped. Anything
/// that does not look like a URL reference is ignored.
///
/// # Example
///
/// ```
/// use sitecrawl::crawler::extract_urls_from_css;
///
/// let css = r#"body { background: url("/img/bg.png") } @import 'theme.css';"#;
/// let urls = extract_urls_from_css(css);
/// assert!(urls.contains("/img/bg.png"));
/// assert!(urls.contains("theme.css"));
/// ```
pub fn extract_urls_from_css(content: &str) -> HashSet<String> {
    let stripped = CSS_COMMENT_RE.replace_all(content, "");
    let mut urls = HashSet::new();

    for re in [&*CSS_URL_RE, &*CSS_IMPORT_RE] {
        for caps in re.captures_iter(&stripped) {
            let value = caps
                .name("dq")
                .or_else(|| caps.name("sq"))
                .or_else(|| caps.name("bare"));

            if let Some(value) = value {
                push_link(&mut urls, value.as_str());
            }
        }
    }

    urls
}

fn push_link(urls: &mut HashSet<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        urls.insert(value.to_string());
    }
}
