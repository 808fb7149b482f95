use anyhow::Result;
use clap::{Parser, Subcommand};
use pinscrape::{Credentials, ResultCache, ScrapeRequest, Scraper, ScraperConfig};
use pinscrape_server::{rest, AppState};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "pinscrape",
    about = "Pinscrape — scroll-crawling image harvester",
    version,
    after_help = "Credentials for authenticated crawls are taken from \
                  PINSCRAPE_EMAIL and PINSCRAPE_PASSWORD."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Run the browser with a visible window
    #[arg(long, global = true)]
    no_headless: bool,

    /// Base URL of the target site
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3000")]
        port: u16,
    },
    /// Run one scrape and print the image URLs
    Scrape {
        /// Search term (omit to crawl the landing feed)
        category: Option<String>,
        /// Number of images to collect
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Also write the URLs to this cache file
        #[arg(long)]
        output: Option<String>,
    },
}

/// Build the scraper configuration from CLI flags and credential env vars.
fn build_config(cli: &Cli) -> ScraperConfig {
    let mut config = ScraperConfig {
        headless: !cli.no_headless,
        ..ScraperConfig::default()
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let (Ok(email), Ok(password)) = (
        std::env::var("PINSCRAPE_EMAIL"),
        std::env::var("PINSCRAPE_PASSWORD"),
    ) {
        config.credentials = Some(Credentials { email, password });
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("pinscrape={default_level}").parse().unwrap())
                .add_directive(format!("pinscrape_server={default_level}").parse().unwrap()),
        )
        .init();

    let config = build_config(&cli);
    let scraper = Arc::new(Scraper::new(config));

    let result = match cli.command {
        Commands::Serve { port } => serve(port, Arc::clone(&scraper)).await,
        Commands::Scrape {
            category,
            limit,
            output,
        } => scrape_once(&scraper, category, limit, output).await,
    };

    // The session owns a browser process; release it on every exit path.
    scraper.shutdown().await;

    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }
    result
}

/// Run the API server until ctrl-c.
async fn serve(port: u16, scraper: Arc<Scraper>) -> Result<()> {
    let state = Arc::new(AppState {
        scraper: Arc::clone(&scraper),
    });

    tokio::select! {
        r = rest::serve(port, state) => r,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}

/// One-shot scrape: print the URLs, optionally persist them to the cache.
async fn scrape_once(
    scraper: &Scraper,
    category: Option<String>,
    limit: usize,
    output: Option<String>,
) -> Result<()> {
    let request = ScrapeRequest { category, limit };
    let result = scraper.scrape(&request).await?;

    println!(
        "Found {} images in {:.1}s",
        result.total_images, result.elapsed_seconds
    );
    for url in &result.images {
        println!("{url}");
    }

    if let Some(name) = output {
        let cache = ResultCache::new(ResultCache::default_dir());
        let path = cache.write(&name, &result.images)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
