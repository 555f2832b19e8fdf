use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use tracing::info;

use sitepulse::cache::site_cache::SiteCache;
use sitepulse::config::{split_terms, Config};
use sitepulse::crawl::crawler::{CrawlSettings, Crawler};
use sitepulse::crawl::fetcher::{HttpFetcher, PageFetcher};
use sitepulse::pipeline::snapshot::{self, SnapshotRequest};
use sitepulse::site::{Site, SiteRole};

/// SitePulse: see which words set your website apart from competitors.
///
/// Crawls a business site and its competitors, weighs each side's vocabulary
/// with TF-IDF and reports the terms one side emphasizes and the other doesn't.
#[derive(Parser)]
#[command(name = "sitepulse", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl (or reuse cached) sites and build a competitive snapshot
    Analyze {
        /// The business website (e.g. getorchestrated.com)
        #[arg(long)]
        business: String,

        /// The business's name, if it differs from the domain (e.g. "Orchestrated Logistics")
        #[arg(long)]
        name: Option<String>,

        /// Competitor websites (repeat the flag or separate with commas)
        #[arg(long = "competitor", required = true, value_delimiter = ',')]
        competitors: Vec<String>,

        /// Extra terms to leave out of every vocabulary
        #[arg(long = "exclude", value_delimiter = ',')]
        exclude: Vec<String>,
    },

    /// Crawl sites into the cache without analyzing them
    Crawl {
        /// Sites to crawl
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Show cached sites and current limits
    Status,

    /// Remove a site from the cache so the next run crawls it again
    Forget {
        /// The site to forget
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sitepulse=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            business,
            name,
            competitors,
            exclude,
        } => {
            let config = Config::load()?;
            let fetcher = create_fetcher(&config)?;

            println!(
                "Building snapshot for {} against {} competitor(s)...",
                business.bold(),
                competitors.len()
            );

            let request = SnapshotRequest {
                business_url: business,
                business_name: name,
                competitor_urls: competitors,
                exclude_terms: split_terms(&exclude.join(",")),
            };

            let snapshot = snapshot::run(&config, &request, fetcher, None).await?;
            sitepulse::output::terminal::display_snapshot(&snapshot);

            println!("\n{}", "Snapshot complete.".bold());
        }

        Commands::Crawl { urls } => {
            let config = Config::load()?;
            let fetcher = create_fetcher(&config)?;
            let cache = SiteCache::open(&config.data_dir)?;
            let crawler = Crawler::new(fetcher, CrawlSettings::from(&config));

            let sites = urls
                .iter()
                .map(|url| Site::parse(url, SiteRole::Business))
                .collect::<Result<Vec<_>, _>>()
                .context("Cannot crawl an invalid URL")?;
            let sites = snapshot::dedupe_sites(sites);

            info!(sites = sites.len(), "Crawling into cache");
            let reports =
                snapshot::crawl_sites(&crawler, &cache, &sites, config.site_concurrency).await?;
            sitepulse::output::terminal::display_site_reports(&reports);
        }

        Commands::Status => {
            let config = Config::load()?;
            sitepulse::status::show(&config)?;
        }

        Commands::Forget { url } => {
            let config = Config::load()?;
            let cache = SiteCache::open(&config.data_dir)?;
            let site = Site::parse(&url, SiteRole::Business)?;

            if cache.remove(&site)? {
                println!("Forgot {}; it will be crawled again on the next run.", site);
            } else {
                println!("{} was not cached.", site);
            }
        }
    }

    Ok(())
}

fn create_fetcher(config: &Config) -> Result<Arc<dyn PageFetcher>> {
    let fetcher = HttpFetcher::new(config)?;
    Ok(Arc::new(fetcher))
}
