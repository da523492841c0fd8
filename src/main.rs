//! cache-warmer main entry point
//!
//! This is the command-line interface for the cache-warming crawler.

use anyhow::Context;
use cache_warmer::config::{load_config, Config};
use cache_warmer::crawler::run_crawl;
use cache_warmer::output::print_statistics;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// cache-warmer: a polite cache-warming crawler
///
/// Crawls a website's same-site links and requests every page it finds, so
/// that the cache in front of the site is filled. Requests can be sent to a
/// different address than the public host while keeping the public `host`
/// header.
#[derive(Parser, Debug)]
#[command(name = "cache-warmer")]
#[command(version)]
#[command(about = "A polite cache-warming crawler", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start URL of the public site
    #[arg(short, long)]
    url: Option<String>,

    /// Address to send requests to (host, host:port or full URL)
    #[arg(short, long)]
    address: Option<String>,

    /// Cookies to send, as key:value (comma separated or repeated)
    #[arg(long, value_delimiter = ',')]
    cookies: Vec<String>,

    /// Extra headers to send, as key:value (comma separated or repeated)
    #[arg(long, value_delimiter = ',')]
    headers: Vec<String>,

    /// Skip discovered links and redirects carrying query parameters
    /// (the start URL itself is always fetched as given)
    #[arg(long)]
    filter_query_strings: bool,

    /// Maximum number of requests over the whole crawl
    #[arg(long)]
    max_requests: Option<u32>,

    /// Maximum link depth from the start URL
    #[arg(long)]
    max_depth: Option<u32>,

    /// Delay between requests to the same domain, in milliseconds
    #[arg(long)]
    delay: Option<u64>,

    /// Upper bound of the random extra delay, in milliseconds (defaults to --delay)
    #[arg(long)]
    random_delay: Option<u64>,

    /// Maximum concurrent requests
    #[arg(long)]
    parallelism: Option<u32>,

    /// Per-request timeout, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Accept invalid TLS certificates (useful when warming by IP address)
    #[arg(long)]
    insecure: bool,

    /// Bytes of each response body to read at most (0 for no limit)
    #[arg(long)]
    max_body_size: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line flags on top of a base configuration
    fn apply(self, mut config: Config) -> Config {
        if let Some(url) = self.url {
            config.url = url;
        }
        if self.address.is_some() {
            config.address = self.address;
        }
        if !self.cookies.is_empty() {
            config.cookies = self.cookies;
        }
        if !self.headers.is_empty() {
            config.headers = self.headers;
        }
        config.filter_query_strings |= self.filter_query_strings;

        let crawler = &mut config.crawler;
        if let Some(max_requests) = self.max_requests {
            crawler.max_requests = max_requests;
        }
        if let Some(max_depth) = self.max_depth {
            crawler.max_depth = max_depth;
        }
        if let Some(delay) = self.delay {
            crawler.delay = delay;
        }
        if self.random_delay.is_some() {
            crawler.random_delay = self.random_delay;
        }
        if let Some(parallelism) = self.parallelism {
            crawler.parallelism = parallelism;
        }
        if let Some(timeout) = self.timeout {
            crawler.request_timeout = timeout;
        }
        if let Some(user_agent) = self.user_agent {
            crawler.user_agent = user_agent;
        }
        crawler.accept_invalid_certs |= self.insecure;
        if let Some(max_body_size) = self.max_body_size {
            crawler.max_body_size = max_body_size;
        }

        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let base = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };
    let config = cli.apply(base);

    let stats = run_crawl(config).await.map_err(|e| {
        tracing::error!("Crawl failed: {}", e);
        e
    })?;

    print_statistics(&stats);
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("cache_warmer=info,warn"),
            1 => EnvFilter::new("cache_warmer=debug,info"),
            2 => EnvFilter::new("cache_warmer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
