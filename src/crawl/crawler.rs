// Bounded-depth site crawler.
//
// Each crawl owns its frontier, visited set and warning state, so sites can
// run side by side without sharing anything mutable. Pages in one depth level
// are fetched concurrently through an order-preserving stream: results come
// back in frontier order, which makes link discovery (and therefore depth
// assignment) independent of which fetch finishes first.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use super::extract::parse_page;
use super::fetcher::PageFetcher;
use super::frontier::Frontier;
use super::retry::{fetch_with_retry, WarningLimiter};
use crate::cache::site_cache::SiteCache;
use crate::config::Config;
use crate::error::{FetchError, PulseError, PulseResult};
use crate::site::{canonicalize, same_site, Site};

/// Hard upper bound on crawl depth. The seed is depth 0.
pub const MAX_DEPTH: u8 = 2;

/// Crawl limits, usually derived from `Config`.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub max_depth: u8,
    /// Fetch attempts allowed per site (successes and failures both count).
    pub max_pages: usize,
    /// In-flight fetches per site.
    pub concurrency: usize,
    pub retry_backoff: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_pages: 25,
            concurrency: 4,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl From<&Config> for CrawlSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_depth: config.max_depth.min(MAX_DEPTH),
            max_pages: config.max_pages,
            concurrency: config.concurrency,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

/// One fetched page. Never modified after the crawl records it.
#[derive(Debug, Clone)]
pub struct Page {
    /// Canonical URL the page was queued under.
    pub url: String,
    pub depth: u8,
    pub fetched_at: DateTime<Utc>,
    pub extracted_text: String,
}

/// A non-seed page that was skipped after its retry.
#[derive(Debug, Clone)]
pub struct PageFailure {
    pub url: String,
    pub depth: u8,
    pub error: FetchError,
}

/// Result of crawling one site.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub site: String,
    /// Pages in fetch order: seed first, then discovery order per level.
    pub pages: Vec<Page>,
    pub failures: Vec<PageFailure>,
}

impl CrawlReport {
    /// Concatenated page text, one page per line, empty pages skipped.
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.extracted_text.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What `crawl_into_cache` did for a site.
#[derive(Debug)]
pub enum CacheOutcome {
    /// A cached corpus already existed; nothing was fetched.
    Cached,
    /// The site was crawled and its text stored.
    Crawled(CrawlReport),
}

pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    settings: CrawlSettings,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: CrawlSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Crawl `site` unless the cache already holds it.
    ///
    /// The cache is written only after the whole crawl has finished and
    /// produced text. An unreachable seed or an empty corpus leaves the cache
    /// untouched so a later run tries again.
    pub async fn crawl_into_cache(&self, site: &Site, cache: &SiteCache) -> PulseResult<CacheOutcome> {
        if cache.has(site) {
            info!(site = %site, "Cached text found, skipping crawl");
            return Ok(CacheOutcome::Cached);
        }

        let report = self.crawl(site).await?;
        let text = report.text();
        if text.trim().is_empty() {
            return Err(PulseError::EmptyCorpus {
                site: site.identifier().to_string(),
            });
        }

        cache.store(site, &text)?;
        Ok(CacheOutcome::Crawled(report))
    }

    /// Breadth-first crawl from the site's root, bounded by depth and budget.
    pub async fn crawl(&self, site: &Site) -> PulseResult<CrawlReport> {
        let seed = site.root().clone();
        let max_depth = self.settings.max_depth.min(MAX_DEPTH);
        let concurrency = self.settings.concurrency.max(1);
        let backoff = self.settings.retry_backoff;

        let mut allowed_hosts = vec![site.domain().to_string()];
        let mut frontier = Frontier::new(seed, max_depth);
        let mut warnings = WarningLimiter::default();
        let mut pages: Vec<Page> = Vec::new();
        let mut failures: Vec<PageFailure> = Vec::new();

        info!(site = %site, max_depth, max_pages = self.settings.max_pages, "Starting crawl");

        loop {
            let mut level = frontier.next_level();
            if level.is_empty() {
                break;
            }

            let attempted = pages.len() + failures.len();
            let remaining = self.settings.max_pages.saturating_sub(attempted);
            if remaining == 0 {
                debug!(site = %site, dropped = level.len(), "Fetch budget exhausted");
                break;
            }
            level.truncate(remaining);

            let fetcher = self.fetcher.as_ref();
            let results: Vec<_> = stream::iter(level.into_iter().map(|entry| async move {
                let result = fetch_with_retry(fetcher, &entry.url, backoff).await;
                (entry, result)
            }))
            .buffered(concurrency)
            .collect()
            .await;

            for (entry, result) in results {
                let fetched = match result {
                    Ok(fetched) => fetched,
                    Err(err) if entry.depth == 0 => {
                        return Err(PulseError::SiteUnreachable {
                            site: site.identifier().to_string(),
                            reason: err.to_string(),
                        });
                    }
                    Err(err) => {
                        let (key, message) = match &err {
                            FetchError::Transient(reason) => (
                                reason,
                                PulseError::TransientFetch {
                                    url: entry.url.to_string(),
                                    reason: reason.clone(),
                                }
                                .to_string(),
                            ),
                            FetchError::Permanent(reason) => {
                                (reason, format!("skipping {}: {reason}", entry.url))
                            }
                        };
                        warnings.warn(key, &message);
                        failures.push(PageFailure {
                            url: entry.url.to_string(),
                            depth: entry.depth,
                            error: err,
                        });
                        continue;
                    }
                };

                // Redirects may land on another spelling of the same page
                let landed = canonicalize(&fetched.final_url);
                frontier.mark_seen(&landed);
                if entry.depth == 0 {
                    if let Some(host) = landed.host_str() {
                        if !allowed_hosts.iter().any(|h| h == host) {
                            allowed_hosts.push(host.to_string());
                        }
                    }
                }

                let parsed = parse_page(&fetched.html, &fetched.final_url);

                if entry.depth < max_depth {
                    for link in parsed.links {
                        let on_site = link
                            .url
                            .host_str()
                            .is_some_and(|host| allowed_hosts.iter().any(|h| same_site(h, host)));
                        if on_site {
                            frontier.offer(link.url, entry.depth + 1, link.about_like);
                        }
                    }
                }

                debug!(
                    url = %entry.url,
                    depth = entry.depth,
                    chars = parsed.text.len(),
                    "Fetched page"
                );

                pages.push(Page {
                    url: entry.url.to_string(),
                    depth: entry.depth,
                    fetched_at: Utc::now(),
                    extracted_text: parsed.text,
                });
            }
        }

        info!(
            site = %site,
            pages = pages.len(),
            failures = failures.len(),
            "Crawl finished"
        );

        Ok(CrawlReport {
            site: site.identifier().to_string(),
            pages,
            failures,
        })
    }
}
