//! Integration tests for the crawler
//!
//! These tests use wiremock to serve the fixture site (and a second, external site)
//! and run full crawls end-to-end through the reqwest-backed fetcher.

use futures::StreamExt;
use sitecrawl::{crawl, CrawlConfig, CrawlError, CrawledResponse, FetchError};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::rustls::{Certificate, PrivateKey, ServerConfig};
use tokio_rustls::TlsAcceptor;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Placeholder origins used by the fixture documents
const SITE_PLACEHOLDER: &str = "http://localhost:8000";
const EXTERNAL_PLACEHOLDER: &str = "http://localhost:8001";

/// A running pair of mock servers
struct Sites {
    site: MockServer,
    external: MockServer,
}

impl Sites {
    fn site_url(&self, path: &str) -> String {
        format!("{}{}", self.site.uri(), path)
    }

    fn external_url(&self, path: &str) -> String {
        format!("{}{}", self.external.uri(), path)
    }

    /// Rewrites the fixture's placeholder origins to the mock servers
    fn rewrite(&self, body: &str) -> String {
        body.replace(SITE_PLACEHOLDER, &self.site.uri())
            .replace(EXTERNAL_PLACEHOLDER, &self.external.uri())
    }
}

async fn serve(server: &MockServer, route: &str, body: Vec<u8>, mime: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, mime))
        .mount(server)
        .await;
}

/// Starts both servers and mounts every fixture file
async fn start_sites() -> Sites {
    let sites = Sites {
        site: MockServer::start().await,
        external: MockServer::start().await,
    };

    let html_pages = [
        ("/", include_str!("../fixtures/site/index.html")),
        (
            "/pages/page-1/",
            include_str!("../fixtures/site/pages/page-1/index.html"),
        ),
        (
            "/pages/page-2/",
            include_str!("../fixtures/site/pages/page-2/index.html"),
        ),
        (
            "/pages/page-3/",
            include_str!("../fixtures/site/pages/page-3/index.html"),
        ),
    ];
    for (route, body) in html_pages {
        let body = sites.rewrite(body).into_bytes();
        serve(&sites.site, route, body, "text/html").await;
    }

    let stylesheets = [
        (
            "/assets/styles.css",
            include_str!("../fixtures/site/assets/styles.css"),
        ),
        (
            "/assets/styles-2.css",
            include_str!("../fixtures/site/assets/styles-2.css"),
        ),
    ];
    for (route, body) in stylesheets {
        serve(&sites.site, route, body.as_bytes().to_vec(), "text/css").await;
    }

    let assets = [
        ("/assets/image.jpg", "image/jpeg"),
        ("/assets/tile-1.jpg", "image/jpeg"),
        ("/assets/tile-2.jpg", "image/jpeg"),
        ("/assets/script.js", "application/javascript"),
        ("/assets/somefont.eot", "application/vnd.ms-fontobject"),
        ("/assets/somefont.ttf", "font/ttf"),
    ];
    for (route, mime) in assets {
        serve(&sites.site, route, vec![0xff, 0xd8, 0x00, 0x01], mime).await;
    }

    serve(
        &sites.external,
        "/pages/page-1/",
        include_str!("../fixtures/external-site/pages/page-1/index.html")
            .as_bytes()
            .to_vec(),
        "text/html",
    )
    .await;

    sites
}

/// Starts an HTTPS server with a self-signed certificate
///
/// Every request gets a fixed `text/plain` body. Returns the server's base URL.
async fn start_self_signed_server() -> String {
    let cert = rcgen::generate_simple_self_signed(vec![
        "localhost".to_string(),
        "127.0.0.1".to_string(),
    ])
    .expect("Failed to generate certificate");
    let cert_der = cert.serialize_der().expect("Failed to serialize certificate");
    let key_der = cert.serialize_private_key_der();

    let tls_config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(vec![Certificate(cert_der)], PrivateKey(key_der))
        .expect("Failed to build TLS config");
    let acceptor = TlsAcceptor::from(Arc::new(tls_config));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let port = listener.local_addr().expect("No local address").port();

    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // Clients that reject the certificate abort the handshake here
                let Ok(mut tls) = acceptor.accept(tcp).await else {
                    return;
                };

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match tls.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let response = "HTTP/1.1 200 OK\r\n\
                    Content-Type: text/plain\r\n\
                    Content-Length: 6\r\n\
                    Connection: close\r\n\r\n\
                    secure";
                let _ = tls.write_all(response.as_bytes()).await;
                let _ = tls.shutdown().await;
            });
        }
    });

    format!("https://127.0.0.1:{}/", port)
}

async fn collect(
    seed: &str,
    config: CrawlConfig,
) -> Vec<Result<CrawledResponse, CrawlError>> {
    crawl(seed, config)
        .expect("Failed to start crawl")
        .into_stream()
        .collect()
        .await
}

fn response_urls(results: &[Result<CrawledResponse, CrawlError>]) -> Vec<String> {
    results
        .iter()
        .map(|r| match r {
            Ok(rsp) => rsp.url.clone(),
            Err(e) => panic!("Unexpected crawl error: {}", e),
        })
        .collect()
}

fn site_urls(sites: &Sites) -> HashSet<String> {
    [
        "/",
        "/pages/page-1/",
        "/pages/page-2/",
        "/pages/page-3/",
        "/assets/styles.css",
        "/assets/styles-2.css",
        "/assets/image.jpg",
        "/assets/script.js",
        "/assets/tile-1.jpg",
        "/assets/tile-2.jpg",
        "/assets/somefont.eot",
        "/assets/somefont.ttf",
    ]
    .iter()
    .map(|p| sites.site_url(p))
    .collect()
}

#[tokio::test]
async fn test_crawl() {
    let sites = start_sites().await;

    let results = collect(&sites.site_url("/"), CrawlConfig::default()).await;
    let urls = response_urls(&results);

    assert_eq!(urls.len(), 13);

    let unique: HashSet<String> = urls.iter().cloned().collect();
    assert_eq!(unique.len(), urls.len());

    let mut expected = site_urls(&sites);
    expected.insert(sites.external_url("/pages/page-1/"));
    assert_eq!(unique, expected);
}

#[tokio::test]
async fn test_crawl_follow_external_links_false() {
    let sites = start_sites().await;

    let config = CrawlConfig::default().follow_external_links(false);
    let results = collect(&sites.site_url("/"), config).await;
    let urls = response_urls(&results);

    assert_eq!(urls.len(), 12);

    let unique: HashSet<String> = urls.iter().cloned().collect();
    assert_eq!(unique.len(), urls.len());
    assert_eq!(unique, site_urls(&sites));

    // The external server never saw a request
    let received = sites.external.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_crawl_ignore_fragments_false() {
    let sites = start_sites().await;

    let config = CrawlConfig::default().ignore_fragments(false);
    let results = collect(&sites.site_url("/"), config).await;
    let urls = response_urls(&results);

    let unique: HashSet<String> = urls.iter().cloned().collect();
    assert_eq!(unique.len(), urls.len());

    let mut expected = site_urls(&sites);
    expected.insert(sites.site_url("/pages/page-1/#anchor"));
    expected.insert(sites.site_url("/pages/page-2/#anchor"));
    expected.insert(sites.site_url("/pages/page-3/#anchor"));
    expected.insert(sites.external_url("/pages/page-1/"));
    expected.insert(sites.external_url("/pages/page-1/#anchor"));

    assert_eq!(urls.len(), 17);
    assert_eq!(unique, expected);
}

#[tokio::test]
async fn test_external_pages_are_not_followed() {
    let sites = start_sites().await;

    let _ = collect(&sites.site_url("/"), CrawlConfig::default()).await;

    // External page-1 links to /pages/page-2/ and a stylesheet on its own origin
    let received = sites.external.received_requests().await.unwrap_or_default();
    let paths: Vec<String> = received.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(paths, vec!["/pages/page-1/"]);
}

#[tokio::test]
async fn test_concurrent_crawl_matches_sequential() {
    let sites = start_sites().await;

    let config = CrawlConfig::default().max_concurrent_fetches(4);
    let results = collect(&sites.site_url("/"), config).await;
    let urls = response_urls(&results);

    let unique: HashSet<String> = urls.iter().cloned().collect();
    assert_eq!(urls.len(), 13);
    assert_eq!(unique.len(), 13);
}

#[tokio::test]
async fn test_responses_carry_content() {
    let sites = start_sites().await;

    let results = collect(&sites.site_url("/"), CrawlConfig::default()).await;
    let stylesheet = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .find(|r| r.url.ends_with("/assets/styles.css"))
        .expect("stylesheet was not crawled");

    assert_eq!(stylesheet.status_code, 200);
    assert!(stylesheet.is_css());
    assert!(stylesheet.text().contains("@font-face"));
    assert_eq!(stylesheet.final_url, stylesheet.url);
}

#[tokio::test]
async fn test_broken_link_is_reported_and_crawl_continues() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/",
        br#"<a href="/missing">Missing</a><a href="/present">Present</a>"#.to_vec(),
        "text/html",
    )
    .await;
    serve(&server, "/present", b"<p>here</p>".to_vec(), "text/html").await;
    // Anything unmatched gets wiremock's default 404

    let results = collect(&format!("{}/", server.uri()), CrawlConfig::default()).await;

    assert_eq!(results.len(), 3);

    let errors: Vec<&CrawlError> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(errors.len(), 1);
    let missing = format!("{}/missing", server.uri());
    assert_eq!(errors[0].url(), Some(missing.as_str()));
    assert!(matches!(
        errors[0],
        CrawlError::Fetch {
            source: FetchError::HttpStatus { status: 404 },
            ..
        }
    ));

    let ok: Vec<String> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|r| r.url.clone())
        .collect();
    assert_eq!(ok, vec![format!("{}/", server.uri()), format!("{}/present", server.uri())]);
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/docs/"))
        .mount(&server)
        .await;
    serve(
        &server,
        "/docs/",
        br#"<a href="child/">Child</a>"#.to_vec(),
        "text/html",
    )
    .await;
    serve(&server, "/docs/child/", b"leaf".to_vec(), "text/plain").await;

    let results = collect(&format!("{}/start", server.uri()), CrawlConfig::default()).await;
    let urls = response_urls(&results);

    assert_eq!(
        urls,
        vec![
            format!("{}/start", server.uri()),
            format!("{}/docs/child/", server.uri()),
        ]
    );

    let first = results[0].as_ref().unwrap();
    assert_eq!(first.final_url, format!("{}/docs/", server.uri()));
}

#[tokio::test]
async fn test_seed_failure_is_only_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let results = collect(&server.uri(), CrawlConfig::default()).await;

    assert_eq!(results.len(), 1);
    let err = results.into_iter().next().unwrap().unwrap_err();
    assert!(!err.is_tls());
    assert!(matches!(
        err,
        CrawlError::Fetch {
            source: FetchError::HttpStatus { status: 503 },
            ..
        }
    ));
}

#[tokio::test]
async fn test_https_seed_against_plain_http_server_fails() {
    let server = MockServer::start().await;
    let address = server.address();

    // Speaking TLS to a plain-HTTP port never completes a handshake
    let seed = format!("https://127.0.0.1:{}/", address.port());
    let config = CrawlConfig::default().timeout_secs(10);
    let results = collect(&seed, config).await;

    assert_eq!(results.len(), 1);
    let err = results[0].as_ref().unwrap_err();
    assert!(!err.is_tls(), "protocol mismatch reported as TLS: {}", err);
}

#[tokio::test]
async fn test_untrusted_certificate_rejected_by_default() {
    let seed = start_self_signed_server().await;

    let config = CrawlConfig::default().timeout_secs(10);
    let results = collect(&seed, config).await;

    assert_eq!(results.len(), 1);
    let err = results[0].as_ref().unwrap_err();
    assert!(err.is_tls(), "expected a TLS error, got: {}", err);
    assert_eq!(err.url(), Some(seed.as_str()));
}

#[tokio::test]
async fn test_untrusted_certificate_accepted_without_verification() {
    let seed = start_self_signed_server().await;

    let config = CrawlConfig::default().verify_tls(false).timeout_secs(10);
    let results = collect(&seed, config).await;

    assert_eq!(results.len(), 1);
    let rsp = results[0].as_ref().expect("fetch should succeed");
    assert_eq!(rsp.url, seed);
    assert_eq!(rsp.status_code, 200);
    assert_eq!(rsp.text(), "secure");
}

#[tokio::test]
async fn test_stop_after_first_response() {
    let sites = start_sites().await;

    let mut stream = Box::pin(
        crawl(&sites.site_url("/"), CrawlConfig::default())
            .expect("Failed to start crawl")
            .into_stream(),
    );

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.url, sites.site_url("/"));
    drop(stream);

    let received = sites.site.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 1);
}

#[test]
fn test_invalid_seed_rejected() {
    let result = crawl("not a url", CrawlConfig::default());
    assert!(matches!(result, Err(CrawlError::InvalidSeed(_))));
}
