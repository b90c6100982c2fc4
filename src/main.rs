//! Sitecrawl main entry point
//!
//! This is the command-line interface for the Sitecrawl website crawler.

use clap::Parser;
use sitecrawl::config::{load_config, CrawlConfig};
use sitecrawl::crawler::crawl;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Sitecrawl: a breadth-first website crawler
///
/// Sitecrawl fetches a seed page, follows every link and asset reference it finds in
/// HTML and CSS, and prints one line per fetched resource.
#[derive(Parser, Debug)]
#[command(name = "sitecrawl")]
#[command(version)]
#[command(about = "A breadth-first website crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not fetch URLs outside the seed's origin
    #[arg(long)]
    no_external: bool,

    /// Treat URLs differing only by #fragment as distinct
    #[arg(long)]
    keep_fragments: bool,

    /// Accept untrusted TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Maximum number of concurrent fetches
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    handle_crawl(&cli.seed, config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitecrawl=info,warn"),
            1 => EnvFilter::new("sitecrawl=debug,info"),
            2 => EnvFilter::new("sitecrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> Result<CrawlConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path).map_err(|e| {
                tracing::error!("Failed to load configuration: {}", e);
                e
            })?
        }
        None => CrawlConfig::default(),
    };

    if cli.no_external {
        config.follow_external_links = false;
    }
    if cli.keep_fragments {
        config.ignore_fragments = false;
    }
    if cli.insecure {
        config.verify_tls = false;
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = Some(secs);
    }
    if let Some(n) = cli.concurrency {
        config.max_concurrent_fetches = n;
    }

    Ok(config)
}

/// Runs the crawl, printing one line per response
///
/// Exits with a failure code when the seed itself could not be fetched.
async fn handle_crawl(
    seed: &str,
    config: CrawlConfig,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut session = crawl(seed, config)?;

    while let Some(result) = session.next_response().await {
        match result {
            Ok(rsp) => println!("{} {} {}", rsp.status_code, rsp.url, rsp.mime_type()),
            Err(e) => println!("ERR {} {}", e.url().unwrap_or(seed), e),
        }
    }

    tracing::info!("{} fetched, {} failed", session.emitted(), session.failed());

    if session.emitted() == 0 && session.failed() > 0 {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
