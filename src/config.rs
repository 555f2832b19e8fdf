use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{PulseError, PulseResult};

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded by the binary at startup via dotenvy. Every value
/// has a default, so an empty environment is a valid configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Site text cache and weighted vocabulary JSON.
    pub data_dir: PathBuf,
    /// Difference sets and rendered images.
    pub output_dir: PathBuf,
    /// Crawl depth bound (0..=2).
    pub max_depth: u8,
    /// Fetch attempts allowed per site.
    pub max_pages: usize,
    /// In-flight fetches within one site.
    pub concurrency: usize,
    /// Sites crawled at the same time.
    pub site_concurrency: usize,
    pub page_timeout_secs: u64,
    pub retry_backoff_ms: u64,
    pub max_redirects: usize,
    /// Extra terms removed from every vocabulary.
    pub exclude_terms: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> PulseResult<Self> {
        let base = default_base_dir();

        let config = Self {
            data_dir: env::var("SITEPULSE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| base.join("data")),
            output_dir: env::var("SITEPULSE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| base.join("output")),
            max_depth: parse_var("SITEPULSE_MAX_DEPTH", 2)?,
            max_pages: parse_var("SITEPULSE_MAX_PAGES", 25)?,
            concurrency: parse_var("SITEPULSE_CONCURRENCY", 4)?,
            site_concurrency: parse_var("SITEPULSE_SITE_CONCURRENCY", 2)?,
            page_timeout_secs: parse_var("SITEPULSE_PAGE_TIMEOUT_SECS", 5)?,
            retry_backoff_ms: parse_var("SITEPULSE_RETRY_BACKOFF_MS", 500)?,
            max_redirects: parse_var("SITEPULSE_MAX_REDIRECTS", 2)?,
            exclude_terms: env::var("SITEPULSE_EXCLUDE_TERMS")
                .map(|raw| split_terms(&raw))
                .unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Defaults with both directories under `dir`. Used by tests and by
    /// callers that manage their own paths.
    pub fn for_data_dir(dir: &Path) -> Self {
        Self {
            data_dir: dir.join("data"),
            output_dir: dir.join("output"),
            max_depth: 2,
            max_pages: 25,
            concurrency: 4,
            site_concurrency: 2,
            page_timeout_secs: 5,
            retry_backoff_ms: 500,
            max_redirects: 2,
            exclude_terms: Vec::new(),
        }
    }

    /// Reject values the crawler cannot honor.
    pub fn validate(&self) -> PulseResult<()> {
        if self.max_depth > crate::crawl::crawler::MAX_DEPTH {
            return Err(PulseError::Config(format!(
                "SITEPULSE_MAX_DEPTH must be at most {}, got {}",
                crate::crawl::crawler::MAX_DEPTH,
                self.max_depth
            )));
        }
        if self.max_pages == 0 {
            return Err(PulseError::Config(
                "SITEPULSE_MAX_PAGES must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 || self.site_concurrency == 0 {
            return Err(PulseError::Config(
                "SITEPULSE_CONCURRENCY and SITEPULSE_SITE_CONCURRENCY must be at least 1"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Platform data directory: ~/.local/share/sitepulse on Linux.
pub fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sitepulse")
}

fn parse_var<T: FromStr>(name: &str, default: T) -> PulseResult<T> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| PulseError::Config(format!("{name} has an invalid value: {raw:?}"))),
        _ => Ok(default),
    }
}

/// Split a comma-separated term list, lowercasing and dropping blanks.
pub fn split_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
