// Cache status display — shows cached sites, their sizes and output paths.

use anyhow::Result;
use colored::Colorize;

use crate::cache::site_cache::SiteCache;
use crate::config::Config;

/// Display cache status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    if !config.data_dir.is_dir() {
        println!("Cache: not initialized ({})", config.data_dir.display());
        println!("\nRun `sitepulse analyze` or `sitepulse crawl <URL>` to fill it.");
        return Ok(());
    }

    let cache = SiteCache::open(&config.data_dir)?;
    let entries = cache.entries()?;
    let total: u64 = entries.iter().map(|e| e.bytes).sum();

    println!(
        "Cache: {} ({} sites, {})",
        config.data_dir.display(),
        entries.len(),
        format_bytes(total)
    );
    for entry in &entries {
        println!(
            "  {:<40} {:>10}",
            entry.prefix,
            format_bytes(entry.bytes).dimmed()
        );
    }
    if entries.is_empty() {
        println!("  Run `sitepulse crawl <URL>` to cache a site");
    }

    println!("Output: {}", config.output_dir.display());
    println!(
        "Crawl limits: depth {}, {} pages per site, {} in flight",
        config.max_depth, config.max_pages, config.concurrency
    );
    if !config.exclude_terms.is_empty() {
        println!("Excluded terms: {}", config.exclude_terms.join(", "));
    }

    Ok(())
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
